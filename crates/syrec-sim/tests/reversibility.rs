//! Property tests for forward/reverse simulation.

use proptest::prelude::*;
use syrec_ir::{Circuit, Control, Gate, LineId};
use syrec_sim::{Direction, SimError, simple_simulation, simulate};

const NUM_LINES: u32 = 6;

/// A gate over `NUM_LINES` lines: a target and a control mask with polarities.
fn arb_gate() -> impl Strategy<Value = Gate> {
    (0..NUM_LINES, any::<u8>(), any::<u8>()).prop_map(|(target, mask, polarity)| {
        let controls: Vec<Control> = (0..NUM_LINES)
            .filter(|&line| line != target && (mask >> line) & 1 == 1)
            .map(|line| {
                if (polarity >> line) & 1 == 1 {
                    Control::negative(LineId(line))
                } else {
                    Control::positive(LineId(line))
                }
            })
            .collect();
        Gate::new(controls, LineId(target)).unwrap()
    })
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    prop::collection::vec(arb_gate(), 0..40).prop_map(|gates| {
        let mut circuit = Circuit::with_lines("random", NUM_LINES);
        for gate in gates {
            circuit.append(gate).unwrap();
        }
        circuit
    })
}

fn arb_state() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), NUM_LINES as usize)
}

// ---------------------------------------------------------------------------
// Inversion
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn reverse_inverts_forward(circuit in arb_circuit(), state in arb_state()) {
        let output = simulate(&circuit, &state, Direction::Forward).unwrap();
        let back = simulate(&circuit, &output, Direction::Reverse).unwrap();
        prop_assert_eq!(back, state);
    }

    #[test]
    fn forward_inverts_reverse(circuit in arb_circuit(), state in arb_state()) {
        let output = simple_simulation(&circuit, &state, true).unwrap();
        let back = simple_simulation(&circuit, &output, false).unwrap();
        prop_assert_eq!(back, state);
    }

    #[test]
    fn simulation_is_deterministic(circuit in arb_circuit(), state in arb_state()) {
        let first = simulate(&circuit, &state, Direction::Forward).unwrap();
        let second = simulate(&circuit, &state, Direction::Forward).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Permutation
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn circuit_is_a_bijection(circuit in arb_circuit()) {
        let mut seen = vec![false; 1 << NUM_LINES];
        for value in 0..(1u32 << NUM_LINES) {
            let state: Vec<bool> = (0..NUM_LINES).map(|i| (value >> i) & 1 == 1).collect();
            let output = simulate(&circuit, &state, Direction::Forward).unwrap();
            let index = output
                .iter()
                .enumerate()
                .fold(0usize, |acc, (i, &bit)| acc | (usize::from(bit) << i));
            prop_assert!(!seen[index]);
            seen[index] = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn longer_state_is_rejected() {
    let circuit = Circuit::with_lines("small", 2);
    assert!(matches!(
        simulate(&circuit, &[false; 3], Direction::Reverse),
        Err(SimError::SizeMismatch {
            expected: 2,
            found: 3
        })
    ));
}
