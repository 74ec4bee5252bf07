//! SyReC Synthesis
//!
//! This crate lowers a parsed SyReC [`Program`] into a reversible
//! [`Circuit`] of multiple-controlled Toffoli gates. Two policies trade
//! circuit lines against gates:
//!
//! | Mode | Temporaries | Lines | Gates |
//! |------|-------------|-------|-------|
//! | [`SynthesisMode::LineAware`] | computed in place where possible, uncomputed and reused | fewer | more |
//! | [`SynthesisMode::CostAware`] | fresh ancillas, left as garbage | more | fewer |
//!
//! # Example
//!
//! ```rust
//! use syrec_ir::Circuit;
//! use syrec_lang::parse;
//! use syrec_synth::{SynthesisSettings, cost_aware_synthesis, line_aware_synthesis};
//!
//! let (program, diagnostics) = parse("module main(in a(2), in b(2), out c(2)) c ^= (a + b)");
//! assert!(diagnostics.is_empty());
//!
//! let settings = SynthesisSettings::default();
//! let mut lean = Circuit::default();
//! let mut cheap = Circuit::default();
//! line_aware_synthesis(&mut lean, &program, &settings).unwrap();
//! cost_aware_synthesis(&mut cheap, &program, &settings).unwrap();
//! assert!(cheap.num_lines() >= lean.num_lines());
//! ```
//!
//! # Lowering
//!
//! - Assignments compute their right-hand side into lines, apply it to the
//!   target (`+=` adder, `-=` subtractor, `^=` CNOTs) and uncompute.
//! - `if` copies the condition onto a guard line that controls the
//!   branches and is cleared again by the `fi` condition.
//! - `for` loops are unrolled.
//! - `call` inlines the callee; `uncall` inlines it in reverse gate order.

pub mod allocator;
pub mod controls;
pub mod error;
pub mod primitives;
pub mod settings;

mod synthesizer;

use std::time::Instant;

use syrec_ir::Circuit;
use syrec_lang::Program;
use tracing::{info, instrument};

pub use allocator::{ConstantLine, LineAllocator, LineState};
pub use controls::ControlStack;
pub use error::{SynthesisError, SynthesisResult};
pub use primitives::{CircuitSink, GateSink};
pub use settings::{SynthesisMode, SynthesisSettings, SynthesisStatistics};

use synthesizer::Synthesizer;

/// Synthesize `program` into `circuit`.
///
/// Any previous content of `circuit` is discarded. On failure `circuit`
/// is left empty; a partial circuit is never returned.
#[instrument(skip(circuit, program, settings))]
pub fn synthesize(
    circuit: &mut Circuit,
    program: &Program,
    mode: SynthesisMode,
    settings: &SynthesisSettings,
) -> SynthesisResult<SynthesisStatistics> {
    let start = Instant::now();
    *circuit = Circuit::default();

    if !program.is_valid() {
        return Err(SynthesisError::InvalidProgram);
    }
    if program.modules.is_empty() {
        return Err(SynthesisError::NoModules);
    }
    let main = program
        .entry_module(settings.main_module.as_deref())
        .ok_or_else(|| {
            SynthesisError::MainModuleNotFound(
                settings
                    .main_module
                    .clone()
                    .or_else(|| program.main_module.clone())
                    .unwrap_or_else(|| "main".into()),
            )
        })?;

    info!("Synthesizing module '{}' ({})", main.name, mode);
    *circuit = Synthesizer::new(program, mode, settings, main).run()?;

    let statistics = SynthesisStatistics {
        mode,
        num_lines: circuit.num_lines(),
        num_gates: circuit.num_gates(),
        num_garbage: circuit.num_garbage(),
        quantum_cost: circuit.quantum_cost(),
        transistor_cost: circuit.transistor_cost(),
        runtime: start.elapsed(),
    };
    info!(
        "Synthesized '{}': {} lines, {} gates, quantum cost {}, transistor cost {}",
        main.name,
        statistics.num_lines,
        statistics.num_gates,
        statistics.quantum_cost,
        statistics.transistor_cost
    );
    Ok(statistics)
}

/// Synthesize with [`SynthesisMode::LineAware`].
pub fn line_aware_synthesis(
    circuit: &mut Circuit,
    program: &Program,
    settings: &SynthesisSettings,
) -> SynthesisResult<SynthesisStatistics> {
    synthesize(circuit, program, SynthesisMode::LineAware, settings)
}

/// Synthesize with [`SynthesisMode::CostAware`].
pub fn cost_aware_synthesis(
    circuit: &mut Circuit,
    program: &Program,
    settings: &SynthesisSettings,
) -> SynthesisResult<SynthesisStatistics> {
    synthesize(circuit, program, SynthesisMode::CostAware, settings)
}
