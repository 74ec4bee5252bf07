//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced while simulating a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The state vector does not have one bit per circuit line.
    #[error("State has {found} bits but the circuit has {expected} lines")]
    SizeMismatch {
        /// Number of circuit lines.
        expected: usize,
        /// Length of the supplied state.
        found: usize,
    },

    /// No register of that name exists in the circuit.
    #[error("Unknown register '{0}'")]
    UnknownRegister(String),

    /// A value does not fit into the lines of a register.
    #[error("Value {value} does not fit into register '{register}' of width {width}")]
    ValueTooWide {
        /// The register being written.
        register: String,
        /// The rejected value.
        value: u64,
        /// Number of lines in the register.
        width: usize,
    },

    /// A register wider than 64 lines cannot be read as an integer.
    #[error("Register '{register}' has {width} lines, at most 64 can be read as an integer")]
    RegisterTooWide {
        /// The register being read.
        register: String,
        /// Number of lines in the register.
        width: usize,
    },

    /// Circuit model error, e.g. a gate touching a missing line.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] syrec_ir::IrError),
}

/// Result type for simulation.
pub type SimResult<T> = Result<T, SimError>;
