//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - reversible circuit synthesis for SyReC",
        style("SyReC").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  syrec-ir     Reversible circuit model and costs");
    println!("  syrec-lang   Parser and semantic checks");
    println!("  syrec-synth  Line-aware and cost-aware synthesis");
    println!("  syrec-sim    Forward and reverse simulation");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
