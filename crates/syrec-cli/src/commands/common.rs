//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use syrec_ir::Circuit;
use syrec_lang::{Diagnostic, Program, ReadSettings, parse_file};
use syrec_synth::{SynthesisStatistics, synthesize};

use crate::config::Config;

/// Print diagnostics to stderr.
pub fn print_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!(
            "{} {}",
            style(path.display()).dim(),
            style(diagnostic).red()
        );
    }
}

/// Read and check a program, failing on any diagnostic.
pub fn load_program(path: &Path, settings: &ReadSettings) -> Result<Program> {
    let (program, diagnostics) = parse_file(path, settings);
    if !diagnostics.is_empty() {
        print_diagnostics(path, &diagnostics);
        anyhow::bail!(
            "{} has {} diagnostic(s)",
            path.display(),
            diagnostics.len()
        );
    }
    Ok(program)
}

/// Read `path` and synthesize it with the configured mode and settings.
pub fn load_circuit(path: &Path, config: &Config) -> Result<(Circuit, SynthesisStatistics)> {
    let program = load_program(path, &config.read)?;
    let mut circuit = Circuit::default();
    let statistics = synthesize(&mut circuit, &program, config.mode, &config.synthesis)
        .with_context(|| format!("Failed to synthesize {}", path.display()))?;
    Ok((circuit, statistics))
}

/// Parse `name=value`; the value may be decimal, `0b` binary or `0x` hex.
pub fn parse_assignment(text: &str) -> Result<(String, u64)> {
    let (name, value) = text
        .split_once('=')
        .with_context(|| format!("Expected name=value, got '{text}'"))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Missing register name in '{text}'");
    }
    let value = value.trim();
    let parsed = if let Some(bits) = value.strip_prefix("0b") {
        u64::from_str_radix(bits, 2)
    } else if let Some(hex) = value.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        value.parse()
    };
    let parsed = parsed.with_context(|| format!("Invalid value for '{name}': '{value}'"))?;
    Ok((name.to_string(), parsed))
}

/// Bits of `lines` in `state`, most significant first.
pub fn bit_string(circuit: &Circuit, state: &[bool], name: &str) -> Option<String> {
    let lines = circuit.register(name)?;
    Some(
        lines
            .iter()
            .rev()
            .map(|line| if state[line.index()] { '1' } else { '0' })
            .collect(),
    )
}

/// Print line, gate and cost figures.
pub fn print_statistics(statistics: &SynthesisStatistics) {
    println!("  Mode:            {}", style(statistics.mode).yellow());
    println!("  Lines:           {}", statistics.num_lines);
    println!("  Garbage lines:   {}", statistics.num_garbage);
    println!("  Gates:           {}", statistics.num_gates);
    println!("  Quantum cost:    {}", statistics.quantum_cost);
    println!("  Transistor cost: {}", statistics.transistor_cost);
    println!("  Runtime:         {:?}", statistics.runtime);
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrec_ir::Line;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("a=5").unwrap(), ("a".into(), 5));
        assert_eq!(parse_assignment(" b = 0b101 ").unwrap(), ("b".into(), 5));
        assert_eq!(parse_assignment("c=0xff").unwrap(), ("c".into(), 255));
        assert!(parse_assignment("a").is_err());
        assert!(parse_assignment("=3").is_err());
        assert!(parse_assignment("a=x").is_err());
    }

    #[test]
    fn test_bit_string() {
        let mut circuit = Circuit::new("bits");
        for i in 0..3 {
            circuit.add_line(Line::new(format!("a.{i}")).with_register("a", i));
        }
        let state = [true, false, false];
        assert_eq!(bit_string(&circuit, &state, "a").as_deref(), Some("001"));
        assert!(bit_string(&circuit, &state, "b").is_none());
    }

    #[test]
    fn test_load_program_reports_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.src");
        std::fs::write(&path, "module main(inout a(1)) b ^= a").unwrap();
        let err = load_program(&path, &ReadSettings::default()).unwrap_err();
        assert!(err.to_string().contains("1 diagnostic"));
    }

    #[test]
    fn test_load_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("add.src");
        std::fs::write(&path, "module main(in a(2), in b(2), out c(2)) c ^= (a + b)").unwrap();
        let (circuit, statistics) = load_circuit(&path, &Config::default()).unwrap();
        assert_eq!(statistics.num_lines, circuit.num_lines());
        assert!(circuit.register("c").is_some());
    }
}
