//! SyReC Reversible Circuit Representation
//!
//! This crate provides the circuit model that SyReC synthesis produces and
//! the simulator consumes: lines with boundary metadata and an append-only
//! sequence of multiple-controlled Toffoli gates.
//!
//! # Core Components
//!
//! - **Lines**: [`LineId`] and [`Line`] carrying labels, register membership,
//!   input/output labels, constant initial values and garbage flags
//! - **Gates**: [`Gate`] with positive or negative [`Control`]s and a single target
//! - **Circuit**: [`Circuit`] owning lines and gates, with per-gate [`GateAnnotation`]s
//! - **Costs**: [`gate_quantum_cost`], [`gate_transistor_cost`] and the
//!   elementary expansion [`decompose`]
//! - **Export**: [`GateList`], a serializable listing with per-gate costs
//!
//! # Example: A Half Adder
//!
//! ```rust
//! use syrec_ir::{Circuit, Gate, Line, LineId};
//!
//! let mut circuit = Circuit::new("half_adder");
//! let a = circuit.add_line(Line::new("a").with_input("a"));
//! let b = circuit.add_line(Line::new("b").with_input("b").with_output("sum"));
//! let carry = circuit.add_line(Line::constant("carry", false).with_output("carry"));
//!
//! circuit.append(Gate::toffoli(a, b, carry).unwrap()).unwrap();
//! circuit.append(Gate::cnot(a, b).unwrap()).unwrap();
//!
//! assert_eq!(circuit.num_lines(), 3);
//! assert_eq!(circuit.quantum_cost(), 6);
//! assert_eq!(circuit.transistor_cost(), 24);
//! # let _ = LineId(0);
//! ```
//!
//! # Cost Model
//!
//! | Controls | Quantum cost | Transistor cost |
//! |----------|--------------|-----------------|
//! | 0 | 1 | 0 |
//! | 1 | 1 | 8 |
//! | 2 | 5 | 16 |
//! | 3 | 13 | 24 |
//! | c | 2^(c+1) - 3 | 8c |
//!
//! Each negative control adds 2 to the quantum cost.

pub mod circuit;
pub mod cost;
pub mod error;
pub mod export;
pub mod gate;
pub mod line;

pub use circuit::{Circuit, GateAnnotation};
pub use cost::{
    ElementaryOp, MAX_DECOMPOSITION_CONTROLS, decompose, gate_quantum_cost, gate_transistor_cost,
    quantum_cost, transistor_cost,
};
pub use error::{IrError, IrResult};
pub use export::{ControlRecord, GateList, GateRecord, LineRecord};
pub use gate::{Control, Gate, Polarity};
pub use line::{CallSite, InlineInfo, Line, LineId};
