//! CLI configuration.
//!
//! Settings come from an optional YAML file, then `SYREC_*` environment
//! variables, then command-line flags, each layer overriding the previous.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use syrec_lang::{ConstantTruncation, ReadSettings};
use syrec_synth::{SynthesisMode, SynthesisSettings};

/// Settings shared by all commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Synthesis mode used by `synth` and `simulate`.
    pub mode: SynthesisMode,
    /// Options for reading source files.
    pub read: ReadSettings,
    /// Options for synthesis.
    pub synthesis: SynthesisSettings,
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml_ng::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the file at `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply `SYREC_*` overrides looked up through `var`.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(mode) = var("SYREC_MODE") {
            self.mode = mode.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(name) = var("SYREC_MAIN_MODULE") {
            self.set_main_module(name);
        }
        if let Some(width) = var("SYREC_DEFAULT_BITWIDTH") {
            self.read.default_bitwidth = width
                .parse()
                .with_context(|| format!("Invalid SYREC_DEFAULT_BITWIDTH: '{width}'"))?;
        }
        if let Some(truncation) = var("SYREC_TRUNCATION") {
            self.read.truncation = parse_truncation(&truncation)?;
        }
        if let Some(limit) = var("SYREC_MAX_LOOP_ITERATIONS") {
            let limit = limit
                .parse()
                .with_context(|| format!("Invalid SYREC_MAX_LOOP_ITERATIONS: '{limit}'"))?;
            self.synthesis.max_loop_iterations = Some(limit);
        }
        if let Some(flag) = var("SYREC_INLINE_DEBUG") {
            self.synthesis.generate_inline_debug_information =
                matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        Ok(self)
    }

    /// Select the entry module for both reading and synthesis.
    pub fn set_main_module(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.read.main_module = Some(name.clone());
        self.synthesis.main_module = Some(name);
    }
}

fn parse_truncation(value: &str) -> Result<ConstantTruncation> {
    match value.to_lowercase().as_str() {
        "and" | "bitwise_and" | "bitwise-and" => Ok(ConstantTruncation::BitwiseAnd),
        "mod" | "modulo" => Ok(ConstantTruncation::Modulo),
        other => anyhow::bail!("Unknown truncation '{other}'. Available: bitwise_and, modulo"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mode, SynthesisMode::LineAware);
        assert_eq!(config.read.default_bitwidth, 16);
        assert!(config.synthesis.max_loop_iterations.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "mode: cost-aware\nread:\n  default_bitwidth: 8\n  truncation: modulo\nsynthesis:\n  max_loop_iterations: 1000"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.mode, SynthesisMode::CostAware);
        assert_eq!(config.read.default_bitwidth, 8);
        assert_eq!(config.read.truncation, ConstantTruncation::Modulo);
        assert_eq!(config.synthesis.max_loop_iterations, Some(1000));
        assert!(!config.synthesis.generate_inline_debug_information);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/syrec.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env(env(&[
                ("SYREC_MODE", "cost"),
                ("SYREC_MAIN_MODULE", "top"),
                ("SYREC_DEFAULT_BITWIDTH", "32"),
                ("SYREC_TRUNCATION", "mod"),
                ("SYREC_MAX_LOOP_ITERATIONS", "50"),
                ("SYREC_INLINE_DEBUG", "true"),
            ]))
            .unwrap();
        assert_eq!(config.mode, SynthesisMode::CostAware);
        assert_eq!(config.read.main_module.as_deref(), Some("top"));
        assert_eq!(config.synthesis.main_module.as_deref(), Some("top"));
        assert_eq!(config.read.default_bitwidth, 32);
        assert_eq!(config.read.truncation, ConstantTruncation::Modulo);
        assert_eq!(config.synthesis.max_loop_iterations, Some(50));
        assert!(config.synthesis.generate_inline_debug_information);
    }

    #[test]
    fn test_invalid_env_value() {
        assert!(
            Config::default()
                .with_env(env(&[("SYREC_MODE", "fast")]))
                .is_err()
        );
        assert!(
            Config::default()
                .with_env(env(&[("SYREC_DEFAULT_BITWIDTH", "wide")]))
                .is_err()
        );
    }
}
