//! Serializable gate listing for downstream consumers.

use serde::{Deserialize, Serialize};

use crate::circuit::Circuit;
use crate::cost::{gate_quantum_cost, gate_transistor_cost};
use crate::error::IrResult;
use crate::gate::Polarity;

/// A control in a [`GateRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRecord {
    /// Line index.
    pub line: u32,
    /// Whether the control is positive.
    pub positive: bool,
}

/// One exported gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRecord {
    /// Position in the circuit.
    pub index: usize,
    /// Gate kind: `not`, `cnot`, `toffoli` or `mct`.
    pub kind: String,
    /// Control lines.
    pub controls: Vec<ControlRecord>,
    /// Target line index.
    pub target: u32,
    /// Quantum cost of this gate.
    pub quantum_cost: u64,
    /// Transistor cost of this gate.
    pub transistor_cost: u64,
    /// Source line of the producing statement, if known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub statement_line: Option<u32>,
}

/// An exported line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Line index.
    pub index: u32,
    /// Line label.
    pub label: String,
    /// Initial constant, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub constant: Option<bool>,
    /// Whether the line is a primary input.
    pub input: bool,
    /// Whether the line is a primary output.
    pub output: bool,
    /// Whether the final value is garbage.
    pub garbage: bool,
}

/// Gate-level listing of a circuit with per-gate costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateList {
    /// Circuit name.
    pub name: String,
    /// Lines in index order.
    pub lines: Vec<LineRecord>,
    /// Gates in application order.
    pub gates: Vec<GateRecord>,
    /// Summed quantum cost.
    pub quantum_cost: u64,
    /// Summed transistor cost.
    pub transistor_cost: u64,
}

impl GateList {
    /// Build the listing for `circuit`.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let lines = circuit
            .lines()
            .iter()
            .map(|line| LineRecord {
                index: line.id.0,
                label: line.label.clone(),
                constant: line.constant,
                input: line.input.is_some(),
                output: line.output.is_some(),
                garbage: line.garbage,
            })
            .collect();

        let gates = circuit
            .annotated_gates()
            .enumerate()
            .map(|(index, (gate, annotation))| GateRecord {
                index,
                kind: gate.name().to_string(),
                controls: gate
                    .controls()
                    .iter()
                    .map(|c| ControlRecord {
                        line: c.line.0,
                        positive: c.polarity == Polarity::Positive,
                    })
                    .collect(),
                target: gate.target().0,
                quantum_cost: gate_quantum_cost(gate),
                transistor_cost: gate_transistor_cost(gate),
                statement_line: annotation.statement_line,
            })
            .collect();

        Self {
            name: circuit.name().to_string(),
            lines,
            gates,
            quantum_cost: circuit.quantum_cost(),
            transistor_cost: circuit.transistor_cost(),
        }
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> IrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Circuit {
    /// Gate-level listing of this circuit.
    pub fn gate_list(&self) -> GateList {
        GateList::from_circuit(self)
    }
}
