//! Propagation of guard controls onto emitted gates.

use syrec_ir::{Control, LineId};

#[derive(Debug, Clone, Default)]
struct Scope {
    isolated: bool,
    lines: Vec<LineId>,
}

/// Stack of control scopes.
///
/// Every emitted gate receives the positive controls registered in the
/// scopes opened since the innermost isolated scope (inclusive).
#[derive(Debug, Clone, Default)]
pub struct ControlStack {
    scopes: Vec<Scope>,
}

impl ControlStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope that inherits the enclosing controls.
    pub fn open_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Open a scope that hides every enclosing control.
    pub fn open_isolated_scope(&mut self) {
        self.scopes.push(Scope {
            isolated: true,
            lines: Vec::new(),
        });
    }

    /// Close the innermost scope.
    pub fn close_scope(&mut self) {
        self.scopes.pop();
    }

    /// Register a control line in the innermost scope.
    ///
    /// Without an open scope the call has no effect.
    pub fn register(&mut self, line: LineId) {
        if let Some(scope) = self.scopes.last_mut() {
            if !scope.lines.contains(&line) {
                scope.lines.push(line);
            }
        }
    }

    /// Remove a control line from the innermost scope.
    ///
    /// Returns whether the line was registered there.
    pub fn deregister(&mut self, line: LineId) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        match scope.lines.iter().position(|l| *l == line) {
            Some(pos) => {
                scope.lines.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Controls currently propagated onto gates.
    pub fn active(&self) -> Vec<Control> {
        let start = self
            .scopes
            .iter()
            .rposition(|scope| scope.isolated)
            .unwrap_or(0);
        let mut controls: Vec<Control> = Vec::new();
        for line in self.scopes[start..].iter().flat_map(|s| &s.lines) {
            if !controls.iter().any(|c| c.line == *line) {
                controls.push(Control::positive(*line));
            }
        }
        controls
    }

    /// Number of open scopes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(stack: &ControlStack) -> Vec<u32> {
        stack.active().iter().map(|c| c.line.0).collect()
    }

    #[test]
    fn test_nested_scopes_accumulate() {
        let mut stack = ControlStack::new();
        stack.open_scope();
        stack.register(LineId(1));
        stack.open_scope();
        stack.register(LineId(2));
        assert_eq!(lines(&stack), vec![1, 2]);
        stack.close_scope();
        assert_eq!(lines(&stack), vec![1]);
        stack.close_scope();
        assert!(stack.active().is_empty());
    }

    #[test]
    fn test_isolated_scope_hides_outer_controls() {
        let mut stack = ControlStack::new();
        stack.open_scope();
        stack.register(LineId(1));
        stack.open_isolated_scope();
        assert!(stack.active().is_empty());
        stack.open_scope();
        stack.register(LineId(3));
        assert_eq!(lines(&stack), vec![3]);
        stack.close_scope();
        stack.close_scope();
        assert_eq!(lines(&stack), vec![1]);
    }

    #[test]
    fn test_deregister() {
        let mut stack = ControlStack::new();
        stack.register(LineId(7));
        assert!(stack.active().is_empty());

        stack.open_scope();
        stack.register(LineId(4));
        stack.register(LineId(4));
        assert!(stack.deregister(LineId(4)));
        assert!(!stack.deregister(LineId(4)));
        assert!(stack.active().is_empty());
        assert_eq!(stack.depth(), 1);
    }
}
