//! Check command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;
use syrec_lang::parse_file;

use super::common::print_diagnostics;
use crate::config::Config;

/// Execute the check command.
pub fn execute(path: &Path, config: &Config) -> Result<()> {
    let (program, diagnostics) = parse_file(path, &config.read);
    if !diagnostics.is_empty() {
        print_diagnostics(path, &diagnostics);
        anyhow::bail!(
            "{} has {} diagnostic(s)",
            path.display(),
            diagnostics.len()
        );
    }

    println!(
        "{} {} is valid",
        style("✓").green().bold(),
        style(path.display()).green()
    );
    for module in &program.modules {
        println!(
            "  module {} ({} parameters, {} locals, {} statements)",
            style(&module.name).cyan(),
            module.parameters.len(),
            module.locals.len(),
            module.statements.len()
        );
    }
    Ok(())
}
