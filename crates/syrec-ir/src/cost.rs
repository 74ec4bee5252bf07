//! Quantum and transistor cost of Toffoli gates.
//!
//! The quantum cost of a gate is the number of elementary operations
//! ([`ElementaryOp`]) it expands into. A gate with `c` positive controls
//! costs 1 when `c == 0` and `2^(c+1) - 3` otherwise; every negative
//! control adds two NOT gates. [`decompose`] produces exactly that many
//! operations, so the figure can be checked against an actual expansion.
//!
//! Transistor cost follows the CMOS model of eight transistors per control.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::gate::{Gate, Polarity};
use crate::line::LineId;

/// Largest control count [`decompose`] will expand.
pub const MAX_DECOMPOSITION_CONTROLS: usize = 20;

/// Transistors per control line in the CMOS model.
pub const TRANSISTORS_PER_CONTROL: u64 = 8;

/// An elementary reversible operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementaryOp {
    /// NOT on a single line.
    X {
        /// Inverted line.
        target: LineId,
    },
    /// Controlled NOT.
    Cx {
        /// Control line.
        control: LineId,
        /// Target line.
        target: LineId,
    },
    /// Controlled `2^root`-th root of NOT, or its adjoint.
    CRootX {
        /// Control line.
        control: LineId,
        /// Target line.
        target: LineId,
        /// Root exponent: the operation is `X^(1 / 2^root)`.
        root: u32,
        /// Whether the adjoint is applied.
        adjoint: bool,
    },
}

/// Quantum cost of a single gate.
pub fn gate_quantum_cost(gate: &Gate) -> u64 {
    let controls = gate.num_controls();
    let base = match controls {
        0 => 1,
        c if c >= 63 => u64::MAX,
        c => (1u64 << (c + 1)) - 3,
    };
    base.saturating_add(2 * gate.num_negative_controls() as u64)
}

/// Transistor cost of a single gate.
#[inline]
pub fn gate_transistor_cost(gate: &Gate) -> u64 {
    TRANSISTORS_PER_CONTROL * gate.num_controls() as u64
}

/// Summed quantum cost of all gates in `circuit`.
pub fn quantum_cost(circuit: &Circuit) -> u64 {
    circuit
        .gates()
        .iter()
        .fold(0u64, |acc, g| acc.saturating_add(gate_quantum_cost(g)))
}

/// Summed transistor cost of all gates in `circuit`.
pub fn transistor_cost(circuit: &Circuit) -> u64 {
    circuit
        .gates()
        .iter()
        .fold(0u64, |acc, g| acc.saturating_add(gate_transistor_cost(g)))
}

/// Expand a gate into elementary operations without ancilla lines.
///
/// Negative controls are conjugated with NOT gates. The positive part uses
/// a Gray-code sequence over the controls: each nonempty subset `S` of the
/// controls is visited once, the parity of `S` is accumulated on the
/// highest control in `S` with CNOTs, and a controlled `X^(1/2^(c-1))`
/// (adjoint for even `|S|`) is applied from there to the target. All
/// controls hold their original values afterwards.
pub fn decompose(gate: &Gate) -> IrResult<Vec<ElementaryOp>> {
    let controls = gate.controls();
    if controls.len() > MAX_DECOMPOSITION_CONTROLS {
        return Err(IrError::DecompositionTooLarge {
            controls: controls.len(),
            limit: MAX_DECOMPOSITION_CONTROLS,
        });
    }

    let negated: Vec<LineId> = controls
        .iter()
        .filter(|c| c.polarity == Polarity::Negative)
        .map(|c| c.line)
        .collect();
    let lines: Vec<LineId> = controls.iter().map(|c| c.line).collect();
    let target = gate.target();

    let mut ops = Vec::new();
    ops.extend(negated.iter().map(|&target| ElementaryOp::X { target }));
    match lines.len() {
        0 => ops.push(ElementaryOp::X { target }),
        1 => ops.push(ElementaryOp::Cx {
            control: lines[0],
            target,
        }),
        _ => gray_code_chain(&lines, target, &mut ops),
    }
    ops.extend(negated.iter().map(|&target| ElementaryOp::X { target }));
    Ok(ops)
}

fn gray_code_chain(controls: &[LineId], target: LineId, ops: &mut Vec<ElementaryOp>) {
    let k = controls.len();
    let root = (k - 1) as u32;
    let mut previous: u64 = 0;

    for i in 1..(1u64 << k) {
        let code = i ^ (i >> 1);
        let highest = (63 - code.leading_zeros()) as usize;
        if previous != 0 {
            let flipped = (code ^ previous).trailing_zeros() as usize;
            // A new highest bit takes over the parity held by the previous one.
            let source = if flipped == highest { highest - 1 } else { flipped };
            ops.push(ElementaryOp::Cx {
                control: controls[source],
                target: controls[highest],
            });
        }
        ops.push(ElementaryOp::CRootX {
            control: controls[highest],
            target,
            root,
            adjoint: code.count_ones() % 2 == 0,
        });
        previous = code;
    }
}
