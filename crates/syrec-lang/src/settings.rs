//! Settings for reading SyReC programs.

use serde::{Deserialize, Serialize};

/// Width of signals declared without an explicit `(width)`.
pub const DEFAULT_BITWIDTH: u32 = 16;

/// How an integer constant is fitted into a narrower context width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantTruncation {
    /// Keep the low bits: `value & (2^w - 1)`.
    #[default]
    BitwiseAnd,
    /// Reduce by the largest representable value: `value % (2^w - 1)`.
    Modulo,
}

impl ConstantTruncation {
    /// Fit `value` into `width` bits.
    pub fn apply(self, value: u64, width: usize) -> u64 {
        if width >= 64 {
            return value;
        }
        let max = (1u64 << width) - 1;
        if value <= max {
            return value;
        }
        match self {
            ConstantTruncation::BitwiseAnd => value & max,
            ConstantTruncation::Modulo if max == 0 => 0,
            ConstantTruncation::Modulo => value % max,
        }
    }
}

/// Options for reading a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadSettings {
    /// Width of signals declared without a width.
    #[serde(default = "default_bitwidth")]
    pub default_bitwidth: u32,

    /// Name of the entry module; must exist when set.
    #[serde(default)]
    pub main_module: Option<String>,

    /// Truncation of integer constants.
    #[serde(default)]
    pub truncation: ConstantTruncation,
}

fn default_bitwidth() -> u32 {
    DEFAULT_BITWIDTH
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            default_bitwidth: DEFAULT_BITWIDTH,
            main_module: None,
            truncation: ConstantTruncation::default(),
        }
    }
}
