//! Multiple-controlled Toffoli gates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};
use crate::line::LineId;

/// Polarity of a control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Polarity {
    /// Gate fires when the control is 1.
    #[default]
    Positive,
    /// Gate fires when the control is 0.
    Negative,
}

/// A control line of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    /// The controlling line.
    pub line: LineId,
    /// Value the line must carry for the gate to fire.
    pub polarity: Polarity,
}

impl Control {
    /// A positive control.
    #[inline]
    pub fn positive(line: LineId) -> Self {
        Self {
            line,
            polarity: Polarity::Positive,
        }
    }

    /// A negative control.
    #[inline]
    pub fn negative(line: LineId) -> Self {
        Self {
            line,
            polarity: Polarity::Negative,
        }
    }

    /// Whether the control is satisfied by `value`.
    #[inline]
    pub fn is_satisfied_by(&self, value: bool) -> bool {
        match self.polarity {
            Polarity::Positive => value,
            Polarity::Negative => !value,
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.polarity {
            Polarity::Positive => write!(f, "{}", self.line),
            Polarity::Negative => write!(f, "!{}", self.line),
        }
    }
}

/// A multiple-controlled Toffoli gate.
///
/// The target line is inverted when every control is satisfied. With no
/// controls this is a NOT gate, with one a CNOT, with two a Toffoli gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gate {
    controls: Vec<Control>,
    target: LineId,
}

impl Gate {
    /// Create a gate, rejecting a target that is also a control.
    ///
    /// Duplicate controls with equal polarity are merged.
    pub fn new(controls: impl IntoIterator<Item = Control>, target: LineId) -> IrResult<Self> {
        let mut merged: Vec<Control> = Vec::new();
        for control in controls {
            if control.line == target {
                return Err(IrError::TargetIsControl { line: target });
            }
            match merged.iter().find(|c| c.line == control.line) {
                Some(existing) if existing.polarity != control.polarity => {
                    return Err(IrError::ConflictingControl { line: control.line });
                }
                Some(_) => {}
                None => merged.push(control),
            }
        }
        Ok(Self {
            controls: merged,
            target,
        })
    }

    /// NOT gate on `target`.
    pub fn not(target: LineId) -> Self {
        Self {
            controls: vec![],
            target,
        }
    }

    /// CNOT gate.
    pub fn cnot(control: LineId, target: LineId) -> IrResult<Self> {
        Self::new([Control::positive(control)], target)
    }

    /// Toffoli gate with two positive controls.
    pub fn toffoli(control1: LineId, control2: LineId, target: LineId) -> IrResult<Self> {
        Self::new(
            [Control::positive(control1), Control::positive(control2)],
            target,
        )
    }

    /// Toffoli gate with any number of positive controls.
    pub fn mct(controls: impl IntoIterator<Item = LineId>, target: LineId) -> IrResult<Self> {
        Self::new(controls.into_iter().map(Control::positive), target)
    }

    /// The same gate with `extra` controls added.
    pub fn with_additional_controls(&self, extra: &[Control]) -> IrResult<Self> {
        Self::new(
            self.controls.iter().chain(extra.iter()).copied(),
            self.target,
        )
    }

    /// Control lines of the gate.
    #[inline]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Target line of the gate.
    #[inline]
    pub fn target(&self) -> LineId {
        self.target
    }

    /// Number of controls.
    #[inline]
    pub fn num_controls(&self) -> usize {
        self.controls.len()
    }

    /// Number of negative controls.
    pub fn num_negative_controls(&self) -> usize {
        self.controls
            .iter()
            .filter(|c| c.polarity == Polarity::Negative)
            .count()
    }

    /// All lines touched by the gate, controls first.
    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.controls
            .iter()
            .map(|c| c.line)
            .chain(std::iter::once(self.target))
    }

    /// Conventional name of the gate.
    pub fn name(&self) -> &'static str {
        match self.controls.len() {
            0 => "not",
            1 => "cnot",
            2 => "toffoli",
            _ => "mct",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if !self.controls.is_empty() {
            write!(f, " [")?;
            for (i, control) in self.controls.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{control}")?;
            }
            write!(f, "]")?;
        }
        write!(f, " -> {}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_cannot_be_control() {
        let err = Gate::cnot(LineId(1), LineId(1)).unwrap_err();
        assert!(matches!(err, IrError::TargetIsControl { .. }));
    }

    #[test]
    fn test_duplicate_controls_are_merged() {
        let gate = Gate::mct([LineId(0), LineId(0), LineId(1)], LineId(2)).unwrap();
        assert_eq!(gate.num_controls(), 2);
        assert_eq!(gate.name(), "toffoli");
    }

    #[test]
    fn test_conflicting_polarity_rejected() {
        let err = Gate::new(
            [Control::positive(LineId(0)), Control::negative(LineId(0))],
            LineId(1),
        )
        .unwrap_err();
        assert!(matches!(err, IrError::ConflictingControl { .. }));
    }

    #[test]
    fn test_additional_controls() {
        let gate = Gate::cnot(LineId(0), LineId(1)).unwrap();
        let controlled = gate
            .with_additional_controls(&[Control::positive(LineId(2))])
            .unwrap();
        assert_eq!(controlled.num_controls(), 2);
        assert_eq!(controlled.target(), LineId(1));

        let err = gate
            .with_additional_controls(&[Control::positive(LineId(1))])
            .unwrap_err();
        assert!(matches!(err, IrError::TargetIsControl { .. }));
    }

    #[test]
    fn test_display() {
        let gate = Gate::new(
            [Control::positive(LineId(0)), Control::negative(LineId(2))],
            LineId(1),
        )
        .unwrap();
        assert_eq!(gate.to_string(), "toffoli [l0, !l2] -> l1");
        assert_eq!(Gate::not(LineId(3)).to_string(), "not -> l3");
    }
}
