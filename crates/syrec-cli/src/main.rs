//! SyReC Command-Line Interface
//!
//! The main entry point for the `syrec` tool.
//!
//! ```text
//! syrec check adder.src
//! syrec synth adder.src --mode cost --export gates.json
//! syrec simulate adder.src -i a=1 -i b=1
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use syrec_synth::SynthesisMode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{check, simulate, synth, version};
use config::Config;

/// SyReC - synthesis and simulation of reversible circuits
#[derive(Parser)]
#[command(name = "syrec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML settings file
    #[arg(short, long, global = true, env = "SYREC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that synthesize.
#[derive(clap::Args, Debug)]
struct SynthesisArgs {
    /// Synthesis mode (line, cost)
    #[arg(short, long)]
    mode: Option<SynthesisMode>,

    /// Module to synthesize
    #[arg(long = "main")]
    main_module: Option<String>,

    /// Stop after this many unrolled loop iterations
    #[arg(long)]
    max_loop_iterations: Option<u64>,

    /// Record call stacks on lines of inlined locals
    #[arg(long)]
    inline_debug: bool,
}

impl SynthesisArgs {
    fn apply(self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(name) = self.main_module {
            config.set_main_module(name);
        }
        if let Some(limit) = self.max_loop_iterations {
            config.synthesis.max_loop_iterations = Some(limit);
        }
        if self.inline_debug {
            config.synthesis.generate_inline_debug_information = true;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a program and report diagnostics
    Check {
        /// Input file
        file: PathBuf,
    },

    /// Synthesize a program and print its costs
    Synth {
        /// Input file
        file: PathBuf,

        #[command(flatten)]
        synthesis: SynthesisArgs,

        /// Write the gate list as JSON
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Synthesize a program and simulate it
    Simulate {
        /// Input file
        file: PathBuf,

        #[command(flatten)]
        synthesis: SynthesisArgs,

        /// Register value, e.g. a=5 or b=0b101 (repeatable)
        #[arg(short, long = "input")]
        inputs: Vec<String>,

        /// Apply the gates in reverse order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = Config::load(cli.config.as_deref()).and_then(|mut config| match cli.command {
        Commands::Check { file } => check::execute(&file, &config),

        Commands::Synth {
            file,
            synthesis,
            export,
        } => {
            synthesis.apply(&mut config);
            synth::execute(&file, &config, export.as_deref())
        }

        Commands::Simulate {
            file,
            synthesis,
            inputs,
            reverse,
        } => {
            synthesis.apply(&mut config);
            simulate::execute(&file, &config, &inputs, reverse)
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    });

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_synth() {
        let cli = Cli::try_parse_from([
            "syrec", "synth", "adder.src", "--mode", "cost", "--export", "gates.json", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Synth {
                file,
                synthesis,
                export,
            } => {
                assert_eq!(file, PathBuf::from("adder.src"));
                assert_eq!(synthesis.mode, Some(SynthesisMode::CostAware));
                assert_eq!(export, Some(PathBuf::from("gates.json")));
            }
            _ => panic!("expected synth"),
        }
    }

    #[test]
    fn test_parse_simulate() {
        let cli = Cli::try_parse_from([
            "syrec", "simulate", "adder.src", "-i", "a=1", "--input", "b=0b11", "--reverse",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                inputs, reverse, ..
            } => {
                assert_eq!(inputs, vec!["a=1", "b=0b11"]);
                assert!(reverse);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Cli::try_parse_from(["syrec", "synth", "a.src", "--mode", "fast"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let args = SynthesisArgs {
            mode: Some(SynthesisMode::CostAware),
            main_module: Some("top".into()),
            max_loop_iterations: Some(10),
            inline_debug: true,
        };
        args.apply(&mut config);
        assert_eq!(config.mode, SynthesisMode::CostAware);
        assert_eq!(config.read.main_module.as_deref(), Some("top"));
        assert_eq!(config.synthesis.max_loop_iterations, Some(10));
        assert!(config.synthesis.generate_inline_debug_information);
    }
}
