//! Circuit lines and their metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a line within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(pub u32);

impl LineId {
    /// Position of the line in a state vector.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

impl From<u32> for LineId {
    fn from(id: u32) -> Self {
        LineId(id)
    }
}

impl TryFrom<usize> for LineId {
    type Error = std::num::TryFromIntError;

    fn try_from(id: usize) -> Result<Self, Self::Error> {
        u32::try_from(id).map(LineId)
    }
}

/// One entry of an inlined call stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSite {
    /// Name of the called module.
    pub module: String,
    /// Source line of the call or uncall statement.
    pub source_line: Option<u32>,
    /// Whether the module was invoked in reverse.
    pub uncall: bool,
}

/// Provenance of a line created for a callee-local signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InlineInfo {
    /// Label the signal has inside the callee, e.g. `t.3`.
    pub user_label: String,
    /// Calls leading from the main module to the callee, outermost first.
    pub call_stack: Vec<CallSite>,
}

/// A circuit line with its labels and boundary conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    /// The line's index in its circuit.
    pub id: LineId,
    /// Human-readable label, unique within a synthesized circuit.
    pub label: String,
    /// Name of the signal this line belongs to, if any.
    pub register: Option<String>,
    /// Flat bit index within the register.
    pub index: Option<u32>,
    /// Input label, set when the line carries a primary input.
    pub input: Option<String>,
    /// Output label, set when the line carries a primary output.
    pub output: Option<String>,
    /// Constant initial value, for lines that are not primary inputs.
    pub constant: Option<bool>,
    /// Whether the final value of the line is garbage.
    pub garbage: bool,
    /// Inlining provenance for lines of callee-local signals.
    pub inline: Option<InlineInfo>,
}

impl Line {
    /// Create an unlabeled, non-constant, non-garbage line.
    ///
    /// The id is assigned when the line is added to a circuit.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: LineId(0),
            label: label.into(),
            register: None,
            index: None,
            input: None,
            output: None,
            constant: None,
            garbage: false,
            inline: None,
        }
    }

    /// Create a line initialized to a constant value.
    pub fn constant(label: impl Into<String>, value: bool) -> Self {
        Self {
            constant: Some(value),
            ..Self::new(label)
        }
    }

    /// Attach register membership.
    #[must_use]
    pub fn with_register(mut self, register: impl Into<String>, index: u32) -> Self {
        self.register = Some(register.into());
        self.index = Some(index);
        self
    }

    /// Mark the line as a primary input carrying `label`.
    #[must_use]
    pub fn with_input(mut self, label: impl Into<String>) -> Self {
        self.input = Some(label.into());
        self
    }

    /// Mark the line as a primary output carrying `label`.
    #[must_use]
    pub fn with_output(mut self, label: impl Into<String>) -> Self {
        self.output = Some(label.into());
        self
    }

    /// Set the garbage flag.
    #[must_use]
    pub fn with_garbage(mut self, garbage: bool) -> Self {
        self.garbage = garbage;
        self
    }

    /// Attach inlining provenance.
    #[must_use]
    pub fn with_inline(mut self, inline: InlineInfo) -> Self {
        self.inline = Some(inline);
        self
    }

    /// Initial value of the line when no input is supplied.
    #[inline]
    pub fn initial_value(&self) -> bool {
        self.constant.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_builders() {
        let line = Line::new("a.0")
            .with_register("a", 0)
            .with_input("a.0")
            .with_output("a.0");
        assert_eq!(line.register.as_deref(), Some("a"));
        assert_eq!(line.index, Some(0));
        assert!(!line.garbage);
        assert!(!line.initial_value());
    }

    #[test]
    fn test_constant_line() {
        let line = Line::constant("const_1", true).with_garbage(true);
        assert_eq!(line.constant, Some(true));
        assert!(line.initial_value());
        assert!(line.garbage);
    }

    #[test]
    fn test_line_id_display() {
        assert_eq!(LineId(7).to_string(), "l7");
        assert_eq!(LineId::try_from(3usize).unwrap(), LineId(3));
    }
}
