//! Synthesis configuration and statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Line/gate trade-off used by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SynthesisMode {
    /// Reuse restored lines and compute in place; keeps the line count low.
    #[default]
    LineAware,
    /// Always allocate fresh ancillas and leave temporaries as garbage.
    CostAware,
}

impl SynthesisMode {
    /// Whether restored lines go back on the free list.
    #[inline]
    pub fn reuses_lines(self) -> bool {
        matches!(self, SynthesisMode::LineAware)
    }
}

impl fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SynthesisMode::LineAware => write!(f, "line-aware"),
            SynthesisMode::CostAware => write!(f, "cost-aware"),
        }
    }
}

impl FromStr for SynthesisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" | "line-aware" | "line_aware" => Ok(SynthesisMode::LineAware),
            "cost" | "cost-aware" | "cost_aware" => Ok(SynthesisMode::CostAware),
            other => Err(format!("unknown synthesis mode '{other}'")),
        }
    }
}

/// Options controlling a synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SynthesisSettings {
    /// Module to synthesize; falls back to `main`, then the last module.
    #[serde(default)]
    pub main_module: Option<String>,

    /// Attach call-stack provenance to lines of callee-local signals.
    #[serde(default)]
    pub generate_inline_debug_information: bool,

    /// Upper bound on the total number of unrolled loop iterations.
    #[serde(default)]
    pub max_loop_iterations: Option<u64>,
}

impl SynthesisSettings {
    /// Settings with the given entry module.
    #[must_use]
    pub fn with_main_module(mut self, name: impl Into<String>) -> Self {
        self.main_module = Some(name.into());
        self
    }

    /// Enable or disable inline debug information.
    #[must_use]
    pub fn with_inline_debug_information(mut self, enabled: bool) -> Self {
        self.generate_inline_debug_information = enabled;
        self
    }

    /// Bound the number of unrolled loop iterations.
    #[must_use]
    pub fn with_max_loop_iterations(mut self, limit: u64) -> Self {
        self.max_loop_iterations = Some(limit);
        self
    }
}

/// Figures reported after a successful synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisStatistics {
    /// Mode the circuit was synthesized in.
    pub mode: SynthesisMode,
    /// Number of circuit lines.
    pub num_lines: usize,
    /// Number of gates.
    pub num_gates: usize,
    /// Lines whose final value is garbage.
    pub num_garbage: usize,
    /// Total quantum cost.
    pub quantum_cost: u64,
    /// Total transistor cost.
    pub transistor_cost: u64,
    /// Wall-clock synthesis time.
    pub runtime: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("line".parse::<SynthesisMode>(), Ok(SynthesisMode::LineAware));
        assert_eq!("Cost-Aware".parse::<SynthesisMode>(), Ok(SynthesisMode::CostAware));
        assert!("fast".parse::<SynthesisMode>().is_err());
        assert_eq!(SynthesisMode::CostAware.to_string(), "cost-aware");
    }

    #[test]
    fn test_settings_defaults_from_json() {
        let settings: SynthesisSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SynthesisSettings::default());

        let settings: SynthesisSettings =
            serde_json::from_str(r#"{"main_module": "adder", "max_loop_iterations": 8}"#).unwrap();
        assert_eq!(settings.main_module.as_deref(), Some("adder"));
        assert_eq!(settings.max_loop_iterations, Some(8));
        assert!(!settings.generate_inline_debug_information);
    }
}
