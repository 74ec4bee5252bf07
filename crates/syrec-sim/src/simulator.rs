//! Gate-by-gate simulation of reversible circuits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use syrec_ir::{Circuit, Gate, IrError};
use tracing::{debug, instrument};

use crate::error::{SimError, SimResult};

/// Order in which the gates of a circuit are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stored gate order.
    #[default]
    Forward,
    /// Reversed gate order, computing the inverse function.
    Reverse,
}

impl Direction {
    /// `Reverse` when `reverse` is set.
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse { Self::Reverse } else { Self::Forward }
    }

    /// The opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// Figures reported by [`simulate_with_statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    /// Number of gates applied.
    pub num_gates: usize,
    /// Direction of the run.
    pub direction: Direction,
    /// Wall-clock time spent applying gates.
    pub runtime: Duration,
}

/// Apply one gate to `state`.
///
/// The target is toggled iff every control carries its required value.
#[inline]
pub fn apply_gate(gate: &Gate, state: &mut [bool]) -> SimResult<()> {
    let num_lines = state.len();
    let value = |line: syrec_ir::LineId| {
        state
            .get(line.index())
            .copied()
            .ok_or(IrError::LineNotFound { line, num_lines })
    };

    let mut fires = true;
    for control in gate.controls() {
        if !control.is_satisfied_by(value(control.line)?) {
            fires = false;
            break;
        }
    }

    let target = gate.target();
    let bit = state
        .get_mut(target.index())
        .ok_or(IrError::LineNotFound {
            line: target,
            num_lines,
        })?;
    if fires {
        *bit = !*bit;
    }
    Ok(())
}

/// Apply every gate of `circuit` to `state` in the given direction.
pub fn simulate_in_place(
    circuit: &Circuit,
    state: &mut [bool],
    direction: Direction,
) -> SimResult<()> {
    check_size(circuit, state)?;
    match direction {
        Direction::Forward => {
            for gate in circuit.gates() {
                apply_gate(gate, state)?;
            }
        }
        Direction::Reverse => {
            for gate in circuit.gates().iter().rev() {
                apply_gate(gate, state)?;
            }
        }
    }
    Ok(())
}

/// Simulate `circuit` on `input` and return the output state.
///
/// `input` must hold one bit per circuit line. The circuit is not modified.
#[instrument(skip(circuit, input), fields(circuit = circuit.name(), gates = circuit.num_gates()))]
pub fn simulate(circuit: &Circuit, input: &[bool], direction: Direction) -> SimResult<Vec<bool>> {
    let mut state = input.to_vec();
    simulate_in_place(circuit, &mut state, direction)?;
    Ok(state)
}

/// [`simulate`] with a boolean reverse flag.
pub fn simple_simulation(circuit: &Circuit, input: &[bool], reverse: bool) -> SimResult<Vec<bool>> {
    simulate(circuit, input, Direction::from_reverse(reverse))
}

/// [`simulate`], also reporting how long the gates took to apply.
#[instrument(skip(circuit, input), fields(circuit = circuit.name()))]
pub fn simulate_with_statistics(
    circuit: &Circuit,
    input: &[bool],
    direction: Direction,
) -> SimResult<(Vec<bool>, SimulationStatistics)> {
    let mut state = input.to_vec();
    let start = Instant::now();
    simulate_in_place(circuit, &mut state, direction)?;
    let statistics = SimulationStatistics {
        num_gates: circuit.num_gates(),
        direction,
        runtime: start.elapsed(),
    };
    debug!(
        "Applied {} gates {} in {:?}",
        statistics.num_gates, direction, statistics.runtime
    );
    Ok((state, statistics))
}

fn check_size(circuit: &Circuit, state: &[bool]) -> SimResult<()> {
    if state.len() != circuit.num_lines() {
        return Err(SimError::SizeMismatch {
            expected: circuit.num_lines(),
            found: state.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrec_ir::{Control, LineId};

    fn toffoli_circuit() -> Circuit {
        let mut circuit = Circuit::with_lines("toffoli", 3);
        circuit
            .append(Gate::toffoli(LineId(0), LineId(1), LineId(2)).unwrap())
            .unwrap();
        circuit
    }

    #[test]
    fn test_toffoli_truth_table() {
        let circuit = toffoli_circuit();
        for bits in 0..8u8 {
            let input: Vec<bool> = (0..3).map(|i| (bits >> i) & 1 == 1).collect();
            let output = simulate(&circuit, &input, Direction::Forward).unwrap();
            assert_eq!(output[0], input[0]);
            assert_eq!(output[1], input[1]);
            assert_eq!(output[2], input[2] ^ (input[0] && input[1]));
        }
    }

    #[test]
    fn test_negative_control() {
        let mut circuit = Circuit::with_lines("neg", 2);
        circuit
            .append(Gate::new([Control::negative(LineId(0))], LineId(1)).unwrap())
            .unwrap();
        assert_eq!(
            simulate(&circuit, &[false, false], Direction::Forward).unwrap(),
            vec![false, true]
        );
        assert_eq!(
            simulate(&circuit, &[true, false], Direction::Forward).unwrap(),
            vec![true, false]
        );
    }

    #[test]
    fn test_reverse_undoes_forward() {
        let mut circuit = Circuit::with_lines("chain", 3);
        circuit.append(Gate::cnot(LineId(0), LineId(1)).unwrap()).unwrap();
        circuit.append(Gate::cnot(LineId(1), LineId(2)).unwrap()).unwrap();
        circuit.append(Gate::not(LineId(0))).unwrap();

        let input = vec![true, false, false];
        let forward = simulate(&circuit, &input, Direction::Forward).unwrap();
        assert_eq!(forward, vec![false, true, true]);
        let back = simulate(&circuit, &forward, Direction::Reverse).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn test_gate_order_matters() {
        let mut circuit = Circuit::with_lines("order", 2);
        circuit.append(Gate::not(LineId(0))).unwrap();
        circuit.append(Gate::cnot(LineId(0), LineId(1)).unwrap()).unwrap();

        let forward = simple_simulation(&circuit, &[false, false], false).unwrap();
        assert_eq!(forward, vec![true, true]);
        let reverse = simple_simulation(&circuit, &[false, false], true).unwrap();
        assert_eq!(reverse, vec![true, false]);
    }

    #[test]
    fn test_size_mismatch() {
        let circuit = toffoli_circuit();
        let err = simulate(&circuit, &[false; 2], Direction::Forward).unwrap_err();
        assert!(matches!(
            err,
            SimError::SizeMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_empty_circuit_is_identity() {
        let circuit = Circuit::with_lines("empty", 4);
        let input = vec![true, false, true, true];
        assert_eq!(simulate(&circuit, &input, Direction::Forward).unwrap(), input);
        assert_eq!(simulate(&circuit, &input, Direction::Reverse).unwrap(), input);
    }

    #[test]
    fn test_apply_gate_out_of_range() {
        let gate = Gate::cnot(LineId(0), LineId(5)).unwrap();
        let mut state = vec![true; 2];
        assert!(matches!(
            apply_gate(&gate, &mut state),
            Err(SimError::Ir(IrError::LineNotFound { .. }))
        ));
    }

    #[test]
    fn test_statistics() {
        let circuit = toffoli_circuit();
        let (state, stats) =
            simulate_with_statistics(&circuit, &[true, true, false], Direction::Forward).unwrap();
        assert_eq!(state, vec![true, true, true]);
        assert_eq!(stats.num_gates, 1);
        assert_eq!(stats.direction, Direction::Forward);
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::from_reverse(true), Direction::Reverse);
        assert_eq!(Direction::Forward.inverse(), Direction::Reverse);
        assert_eq!(Direction::Reverse.to_string(), "reverse");
    }
}
