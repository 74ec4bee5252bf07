//! Synth command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use super::common::{load_circuit, print_statistics};
use crate::config::Config;

/// Execute the synth command.
pub fn execute(path: &Path, config: &Config, export: Option<&Path>) -> Result<()> {
    println!(
        "{} Synthesizing {} ({})",
        style("→").cyan().bold(),
        style(path.display()).green(),
        style(config.mode).yellow()
    );

    let (circuit, statistics) = load_circuit(path, config)?;
    println!(
        "{} Synthesized circuit '{}'",
        style("✓").green().bold(),
        circuit.name()
    );
    print_statistics(&statistics);

    if let Some(export) = export {
        let json = circuit.gate_list().to_json()?;
        fs::write(export, json)
            .with_context(|| format!("Failed to write file: {}", export.display()))?;
        println!("  Gate list:       {}", style(export.display()).green());
    }
    Ok(())
}
