//! Circuit line allocation.
//!
//! The allocator hands out ancilla lines during synthesis and keeps an
//! explicit LIFO free list of lines that were restored to zero. In
//! line-aware mode a request pops the most recently restored line before
//! growing the circuit; in cost-aware mode every request appends a new
//! line at the end of the line array.

use rustc_hash::FxHashMap;
use syrec_ir::{Circuit, Line, LineId};
use tracing::debug;

use crate::error::{SynthesisError, SynthesisResult};
use crate::settings::SynthesisMode;

/// Ownership state of a line known to the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    /// Bound to a declared signal of the main module.
    Variable,
    /// Held by a temporary or a callee-local signal.
    Live,
    /// Returned to its initial constant and released.
    Restored,
}

/// A line acquired for a constant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantLine {
    /// The acquired line.
    pub line: LineId,
    /// Whether the caller must emit a NOT to set the value.
    pub needs_not: bool,
}

/// Allocator for variable and ancilla lines.
#[derive(Debug, Clone)]
pub struct LineAllocator {
    mode: SynthesisMode,
    states: FxHashMap<LineId, LineState>,
    free: Vec<LineId>,
    log: Vec<LineId>,
}

impl LineAllocator {
    /// Create an allocator for the given mode.
    pub fn new(mode: SynthesisMode) -> Self {
        Self {
            mode,
            states: FxHashMap::default(),
            free: Vec::new(),
            log: Vec::new(),
        }
    }

    /// The allocation mode.
    #[inline]
    pub fn mode(&self) -> SynthesisMode {
        self.mode
    }

    /// Append a line bound to a main-module signal.
    pub fn add_variable_line(&mut self, circuit: &mut Circuit, line: Line) -> LineId {
        let id = circuit.add_line(line);
        self.states.insert(id, LineState::Variable);
        id
    }

    /// Append a line for a callee-local signal.
    ///
    /// Local lines are held until the end of synthesis.
    pub fn add_local_line(&mut self, circuit: &mut Circuit, line: Line) -> LineId {
        let id = circuit.add_line(line);
        self.states.insert(id, LineState::Live);
        id
    }

    /// Acquire a line holding zero.
    pub fn acquire(&mut self, circuit: &mut Circuit) -> LineId {
        let id = match self.pop_free() {
            Some(id) => id,
            None => {
                let label = format!("anc{}", circuit.num_lines());
                circuit.add_line(Line::constant(label, false))
            }
        };
        self.states.insert(id, LineState::Live);
        self.log.push(id);
        id
    }

    /// Acquire a line holding `value`.
    ///
    /// Cost-aware mode creates a new line with the value as its initial
    /// constant. Line-aware mode acquires a zeroed line and asks the caller
    /// to invert it for a `1`.
    pub fn acquire_constant(&mut self, circuit: &mut Circuit, value: bool) -> ConstantLine {
        if !value || self.mode.reuses_lines() {
            let line = self.acquire(circuit);
            return ConstantLine {
                line,
                needs_not: value,
            };
        }

        let label = format!("anc{}_1", circuit.num_lines());
        let id = circuit.add_line(Line::constant(label, true));
        self.states.insert(id, LineState::Live);
        self.log.push(id);
        ConstantLine {
            line: id,
            needs_not: false,
        }
    }

    /// Release a line whose value has been restored.
    ///
    /// Line-aware mode makes the line available to the next [`acquire`].
    ///
    /// [`acquire`]: LineAllocator::acquire
    pub fn release(&mut self, line: LineId) -> SynthesisResult<()> {
        match self.states.get(&line) {
            Some(LineState::Live) => {}
            Some(LineState::Variable) => {
                return Err(SynthesisError::Allocation {
                    line,
                    reason: "variable lines cannot be released".into(),
                });
            }
            Some(LineState::Restored) => {
                return Err(SynthesisError::Allocation {
                    line,
                    reason: "line released twice".into(),
                });
            }
            None => {
                return Err(SynthesisError::Allocation {
                    line,
                    reason: "line was never acquired".into(),
                });
            }
        }
        self.states.insert(line, LineState::Restored);
        if self.mode.reuses_lines() {
            self.free.push(line);
        }
        Ok(())
    }

    /// Position in the acquisition log, for [`take_since`].
    ///
    /// [`take_since`]: LineAllocator::take_since
    #[inline]
    pub fn mark(&self) -> usize {
        self.log.len()
    }

    /// Remove and return the lines acquired after `mark`, in acquisition order.
    pub fn take_since(&mut self, mark: usize) -> Vec<LineId> {
        if mark >= self.log.len() {
            return Vec::new();
        }
        self.log.split_off(mark)
    }

    /// State of a line, if the allocator knows it.
    pub fn state(&self, line: LineId) -> Option<LineState> {
        self.states.get(&line).copied()
    }

    /// Number of lines on the free list.
    #[inline]
    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    /// Annotate garbage flags: held ancillas are garbage, restored ones are not.
    pub fn finish(&self, circuit: &mut Circuit) -> SynthesisResult<()> {
        let mut garbage = 0usize;
        for (&line, &state) in &self.states {
            match state {
                LineState::Variable => {}
                LineState::Live => {
                    circuit.line_mut(line)?.garbage = true;
                    garbage += 1;
                }
                LineState::Restored => circuit.line_mut(line)?.garbage = false,
            }
        }
        debug!("{} ancilla lines left as garbage", garbage);
        Ok(())
    }

    fn pop_free(&mut self) -> Option<LineId> {
        if self.mode.reuses_lines() {
            self.free.pop()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_aware_reuses_last_released() {
        let mut circuit = Circuit::new("t");
        let mut allocator = LineAllocator::new(SynthesisMode::LineAware);

        let a = allocator.acquire(&mut circuit);
        let b = allocator.acquire(&mut circuit);
        assert_eq!(circuit.num_lines(), 2);

        allocator.release(a).unwrap();
        allocator.release(b).unwrap();
        assert_eq!(allocator.num_free(), 2);

        assert_eq!(allocator.acquire(&mut circuit), b);
        assert_eq!(allocator.acquire(&mut circuit), a);
        assert_eq!(circuit.num_lines(), 2);
    }

    #[test]
    fn test_cost_aware_always_appends() {
        let mut circuit = Circuit::new("t");
        let mut allocator = LineAllocator::new(SynthesisMode::CostAware);

        let a = allocator.acquire(&mut circuit);
        allocator.release(a).unwrap();
        let b = allocator.acquire(&mut circuit);
        assert_ne!(a, b);
        assert_eq!(circuit.num_lines(), 2);
        assert_eq!(allocator.num_free(), 0);
    }

    #[test]
    fn test_constant_lines() {
        let mut circuit = Circuit::new("t");
        let mut allocator = LineAllocator::new(SynthesisMode::CostAware);
        let one = allocator.acquire_constant(&mut circuit, true);
        assert!(!one.needs_not);
        assert_eq!(circuit.line(one.line).unwrap().constant, Some(true));

        let mut circuit = Circuit::new("t");
        let mut allocator = LineAllocator::new(SynthesisMode::LineAware);
        let one = allocator.acquire_constant(&mut circuit, true);
        assert!(one.needs_not);
        assert_eq!(circuit.line(one.line).unwrap().constant, Some(false));
    }

    #[test]
    fn test_release_errors() {
        let mut circuit = Circuit::new("t");
        let mut allocator = LineAllocator::new(SynthesisMode::LineAware);
        let var = allocator.add_variable_line(&mut circuit, Line::new("a.0"));
        assert!(allocator.release(var).is_err());

        let line = allocator.acquire(&mut circuit);
        allocator.release(line).unwrap();
        assert!(matches!(
            allocator.release(line),
            Err(SynthesisError::Allocation { .. })
        ));
        assert!(allocator.release(LineId(99)).is_err());
    }

    #[test]
    fn test_marks_and_finish() {
        let mut circuit = Circuit::new("t");
        let mut allocator = LineAllocator::new(SynthesisMode::LineAware);
        let held = allocator.acquire(&mut circuit);
        let mark = allocator.mark();
        let t1 = allocator.acquire(&mut circuit);
        let t2 = allocator.acquire(&mut circuit);
        assert_eq!(allocator.take_since(mark), vec![t1, t2]);
        assert!(allocator.take_since(mark).is_empty());

        allocator.release(t1).unwrap();
        allocator.finish(&mut circuit).unwrap();
        assert!(circuit.line(held).unwrap().garbage);
        assert!(!circuit.line(t1).unwrap().garbage);
        assert!(circuit.line(t2).unwrap().garbage);
        assert_eq!(allocator.state(t1), Some(LineState::Restored));
    }
}
