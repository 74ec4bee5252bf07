//! SyReC Circuit Simulation
//!
//! Bit-exact simulation of reversible circuits. A state holds one `bool`
//! per circuit line; every gate toggles its target when all of its
//! controls carry their required values. Since each gate is its own
//! inverse, running the gates in reverse order computes the inverse
//! function:
//!
//! ```text
//! simulate(c, simulate(c, s, Forward), Reverse) == s
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use syrec_ir::{Circuit, Gate, Line};
//! use syrec_sim::{Direction, initial_state, read_register, simulate, write_register};
//!
//! let mut circuit = Circuit::new("copy");
//! let a = circuit.add_line(Line::new("a.0").with_register("a", 0).with_input("a"));
//! let b = circuit.add_line(Line::constant("b.0", false).with_register("b", 0).with_output("b"));
//! circuit.append(Gate::cnot(a, b).unwrap()).unwrap();
//!
//! let mut state = initial_state(&circuit);
//! write_register(&circuit, &mut state, "a", 1).unwrap();
//! let output = simulate(&circuit, &state, Direction::Forward).unwrap();
//! assert_eq!(read_register(&circuit, &output, "b").unwrap(), 1);
//!
//! let back = simulate(&circuit, &output, Direction::Reverse).unwrap();
//! assert_eq!(back, state);
//! ```

pub mod error;
pub mod simulator;
pub mod state;

pub use error::{SimError, SimResult};
pub use simulator::{
    Direction, SimulationStatistics, apply_gate, simple_simulation, simulate, simulate_in_place,
    simulate_with_statistics,
};
pub use state::{initial_state, read_register, write_register};
