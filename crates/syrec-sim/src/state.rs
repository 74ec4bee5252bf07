//! Construction and inspection of simulation states.

use syrec_ir::{Circuit, LineId};

use crate::error::{SimError, SimResult};

/// A state with every line at its declared constant value, or 0.
pub fn initial_state(circuit: &Circuit) -> Vec<bool> {
    circuit.lines().iter().map(|line| line.initial_value()).collect()
}

fn register_lines<'c>(circuit: &'c Circuit, name: &str) -> SimResult<&'c [LineId]> {
    circuit
        .register(name)
        .ok_or_else(|| SimError::UnknownRegister(name.to_string()))
}

/// Unsigned value of register `name`, bit 0 on its first line.
pub fn read_register(circuit: &Circuit, state: &[bool], name: &str) -> SimResult<u64> {
    let lines = register_lines(circuit, name)?;
    if lines.len() > 64 {
        return Err(SimError::RegisterTooWide {
            register: name.to_string(),
            width: lines.len(),
        });
    }
    let mut value = 0u64;
    for (bit, line) in lines.iter().enumerate() {
        let set = state.get(line.index()).copied().ok_or(SimError::SizeMismatch {
            expected: circuit.num_lines(),
            found: state.len(),
        })?;
        if set {
            value |= 1 << bit;
        }
    }
    Ok(value)
}

/// Store `value` on the lines of register `name`.
///
/// Lines beyond bit 63 are cleared.
pub fn write_register(
    circuit: &Circuit,
    state: &mut [bool],
    name: &str,
    value: u64,
) -> SimResult<()> {
    let lines = register_lines(circuit, name)?;
    if lines.len() < 64 && value >> lines.len() != 0 {
        return Err(SimError::ValueTooWide {
            register: name.to_string(),
            value,
            width: lines.len(),
        });
    }
    let found = state.len();
    for (bit, line) in lines.iter().enumerate() {
        let slot = state.get_mut(line.index()).ok_or(SimError::SizeMismatch {
            expected: circuit.num_lines(),
            found,
        })?;
        *slot = bit < 64 && (value >> bit) & 1 == 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrec_ir::Line;

    fn circuit() -> Circuit {
        let mut circuit = Circuit::new("regs");
        for i in 0..3 {
            circuit.add_line(Line::new(format!("a.{i}")).with_register("a", i).with_input("a"));
        }
        circuit.add_line(Line::constant("anc0", false));
        circuit.add_line(Line::constant("anc1_1", true));
        circuit
    }

    #[test]
    fn test_initial_state_uses_constants() {
        assert_eq!(
            initial_state(&circuit()),
            vec![false, false, false, false, true]
        );
    }

    #[test]
    fn test_write_then_read() {
        let circuit = circuit();
        let mut state = initial_state(&circuit);
        write_register(&circuit, &mut state, "a", 5).unwrap();
        assert_eq!(&state[..3], &[true, false, true]);
        assert_eq!(read_register(&circuit, &state, "a").unwrap(), 5);
    }

    #[test]
    fn test_value_too_wide() {
        let circuit = circuit();
        let mut state = initial_state(&circuit);
        assert!(matches!(
            write_register(&circuit, &mut state, "a", 8),
            Err(SimError::ValueTooWide { width: 3, .. })
        ));
    }

    #[test]
    fn test_unknown_register() {
        let circuit = circuit();
        let state = initial_state(&circuit);
        assert!(matches!(
            read_register(&circuit, &state, "b"),
            Err(SimError::UnknownRegister(name)) if name == "b"
        ));
    }
}
