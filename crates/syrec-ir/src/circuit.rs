//! Reversible circuit container.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cost;
use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::line::{Line, LineId};

/// Source information attached to a gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateAnnotation {
    /// Source line of the statement that produced the gate.
    pub statement_line: Option<u32>,
}

impl GateAnnotation {
    /// Annotation pointing at a source line.
    pub fn at_line(line: u32) -> Self {
        Self {
            statement_line: Some(line),
        }
    }
}

/// A reversible circuit: an ordered list of lines and an append-only
/// sequence of Toffoli gates over them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Lines in index order.
    lines: Vec<Line>,
    /// Gates in application order.
    gates: Vec<Gate>,
    /// One annotation per gate.
    annotations: Vec<GateAnnotation>,
    /// Lines grouped by register name, in bit order.
    #[serde(skip)]
    registers: FxHashMap<String, Vec<LineId>>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a circuit with `num_lines` unlabeled lines initialized to 0.
    pub fn with_lines(name: impl Into<String>, num_lines: u32) -> Self {
        let mut circuit = Self::new(name);
        for i in 0..num_lines {
            circuit.add_line(Line::constant(format!("l{i}"), false));
        }
        circuit
    }

    /// Name of the circuit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Add a line, assigning it the next free index.
    pub fn add_line(&mut self, mut line: Line) -> LineId {
        let id = LineId(self.lines.len() as u32);
        line.id = id;
        if let Some(register) = &line.register {
            let members = self.registers.entry(register.clone()).or_default();
            members.push(id);
            let lines = &self.lines;
            members.sort_by_key(|member| {
                if *member == id {
                    line.index
                } else {
                    lines[member.index()].index
                }
            });
        }
        self.lines.push(line);
        id
    }

    /// Get a line by id.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.index())
    }

    /// Get a mutable line by id.
    pub fn line_mut(&mut self, id: LineId) -> IrResult<&mut Line> {
        let num_lines = self.lines.len();
        self.lines
            .get_mut(id.index())
            .ok_or(IrError::LineNotFound {
                line: id,
                num_lines,
            })
    }

    /// All lines in index order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines.
    #[inline]
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Append a gate without annotation.
    pub fn append(&mut self, gate: Gate) -> IrResult<&mut Self> {
        self.append_annotated(gate, GateAnnotation::default())
    }

    /// Append a gate with an annotation.
    ///
    /// Every line the gate touches must exist in the circuit.
    pub fn append_annotated(
        &mut self,
        gate: Gate,
        annotation: GateAnnotation,
    ) -> IrResult<&mut Self> {
        if let Some(line) = gate.lines().find(|l| l.index() >= self.lines.len()) {
            return Err(IrError::LineNotFound {
                line,
                num_lines: self.lines.len(),
            });
        }
        self.gates.push(gate);
        self.annotations.push(annotation);
        Ok(self)
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Gates with their annotations.
    pub fn annotated_gates(&self) -> impl Iterator<Item = (&Gate, &GateAnnotation)> {
        self.gates.iter().zip(self.annotations.iter())
    }

    /// Annotation of the gate at `index`.
    pub fn annotation(&self, index: usize) -> Option<&GateAnnotation> {
        self.annotations.get(index)
    }

    /// Number of gates.
    #[inline]
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Whether the circuit has neither lines nor gates.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.gates.is_empty()
    }

    /// Lines belonging to register `name`, ordered by bit index.
    pub fn register(&self, name: &str) -> Option<&[LineId]> {
        self.registers.get(name).map(Vec::as_slice)
    }

    /// Names of all registers, sorted.
    pub fn register_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.registers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Rebuild the register index, e.g. after deserialization.
    pub fn rebuild_registers(&mut self) {
        self.registers.clear();
        let mut indexed: Vec<(&str, u32, LineId)> = self
            .lines
            .iter()
            .filter_map(|l| Some((l.register.as_deref()?, l.index.unwrap_or(0), l.id)))
            .collect();
        indexed.sort_by_key(|&(_, index, id)| (index, id));
        for (register, _, id) in indexed {
            self.registers
                .entry(register.to_string())
                .or_default()
                .push(id);
        }
    }

    /// Labels of the primary inputs, in line order.
    pub fn inputs(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.input.is_some())
    }

    /// Labels of the primary outputs, in line order.
    pub fn outputs(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.output.is_some())
    }

    /// Number of lines whose final value is garbage.
    pub fn num_garbage(&self) -> usize {
        self.lines.iter().filter(|l| l.garbage).count()
    }

    /// Total quantum cost.
    pub fn quantum_cost(&self) -> u64 {
        cost::quantum_cost(self)
    }

    /// Total transistor cost.
    pub fn transistor_cost(&self) -> u64 {
        cost::transistor_cost(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_lines(), 0);
        assert_eq!(circuit.num_gates(), 0);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_append_validates_lines() {
        let mut circuit = Circuit::with_lines("test", 2);
        circuit.append(Gate::cnot(LineId(0), LineId(1)).unwrap()).unwrap();
        let err = circuit
            .append(Gate::cnot(LineId(0), LineId(2)).unwrap())
            .unwrap_err();
        assert!(matches!(err, IrError::LineNotFound { .. }));
        assert_eq!(circuit.num_gates(), 1);
    }

    #[test]
    fn test_register_lookup() {
        let mut circuit = Circuit::new("test");
        let high = circuit.add_line(Line::new("a.1").with_register("a", 1));
        let low = circuit.add_line(Line::new("a.0").with_register("a", 0));
        circuit.add_line(Line::new("b.0").with_register("b", 0));

        assert_eq!(circuit.register("a").unwrap(), &[low, high]);
        assert_eq!(circuit.register_names(), vec!["a", "b"]);
        assert!(circuit.register("c").is_none());
    }

    #[test]
    fn test_rebuild_registers() {
        let mut circuit = Circuit::new("test");
        circuit.add_line(Line::new("a.0").with_register("a", 0));
        circuit.add_line(Line::new("a.1").with_register("a", 1));
        let json = serde_json::to_string(&circuit).unwrap();
        let mut restored: Circuit = serde_json::from_str(&json).unwrap();
        assert!(restored.register("a").is_none());
        restored.rebuild_registers();
        assert_eq!(restored.register("a").unwrap(), &[LineId(0), LineId(1)]);
    }

    #[test]
    fn test_annotations_and_costs() {
        let mut circuit = Circuit::with_lines("test", 3);
        circuit
            .append_annotated(
                Gate::toffoli(LineId(0), LineId(1), LineId(2)).unwrap(),
                GateAnnotation::at_line(4),
            )
            .unwrap();
        circuit.append(Gate::not(LineId(0))).unwrap();

        assert_eq!(circuit.annotation(0).unwrap().statement_line, Some(4));
        assert_eq!(circuit.annotation(1).unwrap().statement_line, None);
        assert_eq!(circuit.quantum_cost(), 6);
        assert_eq!(circuit.transistor_cost(), 16);
    }
}
