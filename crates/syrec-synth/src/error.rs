//! Error types for synthesis.

use syrec_ir::{IrError, LineId};
use thiserror::Error;

/// Errors that can occur while synthesizing a program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthesisError {
    /// The program carries parser diagnostics.
    #[error("Program has diagnostics and cannot be synthesized")]
    InvalidProgram,

    /// The program declares no modules.
    #[error("Program contains no modules")]
    NoModules,

    /// The requested entry module does not exist.
    #[error("Main module '{0}' not found")]
    MainModuleNotFound(String),

    /// A call refers to an unknown module.
    #[error("Unknown module '{0}'")]
    UnknownModule(String),

    /// An access refers to an unknown signal.
    #[error("Unknown signal '{0}'")]
    UnknownSignal(String),

    /// A module calls itself, directly or indirectly.
    #[error("Recursive call of module '{0}'")]
    RecursiveCall(String),

    /// A call passes the wrong number of arguments.
    #[error("Module '{module}' expects {expected} arguments, got {found}")]
    ArgumentCount {
        /// The called module.
        module: String,
        /// Number of parameters.
        expected: usize,
        /// Number of arguments.
        found: usize,
    },

    /// A dimension index could not be evaluated at synthesis time.
    #[error("Index into '{signal}' is not a compile-time constant")]
    NonConstantIndex {
        /// The accessed signal.
        signal: String,
    },

    /// The number of dimension indices does not match the declaration.
    #[error("Signal '{signal}' has {expected} dimensions, accessed with {found} indices")]
    DimensionMismatch {
        /// The accessed signal.
        signal: String,
        /// Declared dimensions.
        expected: usize,
        /// Indices in the access.
        found: usize,
    },

    /// A dimension index is out of range.
    #[error("Index {index} out of range for dimension of size {size} in '{signal}'")]
    IndexOutOfRange {
        /// The accessed signal.
        signal: String,
        /// The evaluated index.
        index: u64,
        /// The declared dimension size.
        size: u32,
    },

    /// A bit index is out of range.
    #[error("Bit {bit} out of range for '{signal}' of width {width}")]
    BitOutOfRange {
        /// The accessed signal.
        signal: String,
        /// The evaluated bit.
        bit: u64,
        /// The declared width.
        width: u32,
    },

    /// Operand widths do not fit together.
    #[error("Width mismatch in {context}: expected {expected}, found {found}")]
    WidthMismatch {
        /// What was being synthesized.
        context: String,
        /// Required width.
        expected: usize,
        /// Actual width.
        found: usize,
    },

    /// A construct would produce a value of width zero.
    #[error("Zero-width value in {0}")]
    ZeroWidth(String),

    /// Two operands that must be disjoint share lines.
    #[error("Overlapping operands in {0}")]
    OverlappingOperands(String),

    /// A loop step evaluated to zero.
    #[error("Loop step must not be zero")]
    InvalidLoopStep,

    /// Unrolling exceeded the configured iteration bound.
    #[error("Loop unrolling exceeded the limit of {limit} iterations")]
    LoopLimitExceeded {
        /// The configured bound.
        limit: u64,
    },

    /// A constant division or modulo by zero.
    #[error("Division by zero in constant expression")]
    DivisionByZero,

    /// A compile-time number could not be evaluated.
    #[error("Cannot evaluate number: {0}")]
    Number(String),

    /// Misuse of the line allocator.
    #[error("Allocation error on line {line}: {reason}")]
    Allocation {
        /// The affected line.
        line: LineId,
        /// What went wrong.
        reason: String,
    },

    /// Construct recognized but not reducible to gates.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// Circuit-level failure.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for synthesis operations.
pub type SynthesisResult<T> = Result<T, SynthesisError>;
