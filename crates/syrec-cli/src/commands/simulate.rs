//! Simulate command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use syrec_sim::{Direction, initial_state, read_register, simulate_with_statistics, write_register};

use super::common::{bit_string, load_circuit, parse_assignment};
use crate::config::Config;

/// Execute the simulate command.
pub fn execute(path: &Path, config: &Config, inputs: &[String], reverse: bool) -> Result<()> {
    let (circuit, _) = load_circuit(path, config)?;

    let mut state = initial_state(&circuit);
    for input in inputs {
        let (name, value) = parse_assignment(input)?;
        write_register(&circuit, &mut state, &name, value)
            .with_context(|| format!("Failed to set input '{name}'"))?;
    }

    let direction = Direction::from_reverse(reverse);
    let (output, statistics) = simulate_with_statistics(&circuit, &state, direction)?;
    println!(
        "{} Simulated {} gates {} in {:?}",
        style("✓").green().bold(),
        statistics.num_gates,
        direction,
        statistics.runtime
    );

    for name in circuit.register_names() {
        let bits = bit_string(&circuit, &output, name).unwrap_or_default();
        match read_register(&circuit, &output, name) {
            Ok(value) => println!("  {:<12} {:>20} {}", style(name).cyan(), value, style(bits).dim()),
            Err(_) => println!("  {:<12} {}", style(name).cyan(), bits),
        }
    }
    Ok(())
}
