//! Error types for the IR crate.

use crate::line::LineId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Line not found in circuit.
    #[error("Line {line} not found in circuit (circuit has {num_lines} lines)")]
    LineNotFound {
        /// The line that was not found.
        line: LineId,
        /// Number of lines in the circuit.
        num_lines: usize,
    },

    /// The target line also appears as a control.
    #[error("Target line {line} is also a control of the gate")]
    TargetIsControl {
        /// The offending line.
        line: LineId,
    },

    /// A control line appears twice with conflicting polarity.
    #[error("Control line {line} appears with conflicting polarities")]
    ConflictingControl {
        /// The duplicated control line.
        line: LineId,
    },

    /// Gate has too many controls to expand into elementary operations.
    #[error("Gate with {controls} controls exceeds the decomposition limit of {limit}")]
    DecompositionTooLarge {
        /// Number of controls on the gate.
        controls: usize,
        /// Maximum supported number of controls.
        limit: usize,
    },

    /// Serialization failure during export.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
