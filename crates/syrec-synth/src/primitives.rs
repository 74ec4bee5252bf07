//! Reversible arithmetic and logic building blocks.
//!
//! Every primitive writes gates into a [`GateSink`]. Operands are slices of
//! lines with the least significant bit first. Primitives that use an
//! operand as scratch space restore it before returning, unless documented
//! otherwise. Controls registered on the sink's [`ControlStack`] are added
//! to every gate emitted through [`GateSink::emit`].

use syrec_ir::{Circuit, Gate, LineId};

use crate::controls::ControlStack;
use crate::error::{SynthesisError, SynthesisResult};

/// Destination for synthesized gates.
pub trait GateSink {
    /// The control propagation stack of the sink.
    fn controls(&mut self) -> &mut ControlStack;

    /// Emit a gate exactly as given.
    fn emit_uncontrolled(&mut self, gate: Gate) -> SynthesisResult<()>;

    /// Emit a gate with the propagated controls added.
    fn emit(&mut self, gate: Gate) -> SynthesisResult<()> {
        let active = self.controls().active();
        if active.is_empty() {
            self.emit_uncontrolled(gate)
        } else {
            let gate = gate.with_additional_controls(&active)?;
            self.emit_uncontrolled(gate)
        }
    }
}

/// A sink that appends straight to a circuit.
pub struct CircuitSink<'c> {
    circuit: &'c mut Circuit,
    controls: ControlStack,
}

impl<'c> CircuitSink<'c> {
    /// Wrap a circuit.
    pub fn new(circuit: &'c mut Circuit) -> Self {
        Self {
            circuit,
            controls: ControlStack::new(),
        }
    }
}

impl GateSink for CircuitSink<'_> {
    fn controls(&mut self) -> &mut ControlStack {
        &mut self.controls
    }

    fn emit_uncontrolled(&mut self, gate: Gate) -> SynthesisResult<()> {
        self.circuit.append(gate)?;
        Ok(())
    }
}

fn require_width(context: &str, expected: usize, found: usize) -> SynthesisResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SynthesisError::WidthMismatch {
            context: context.into(),
            expected,
            found,
        })
    }
}

fn not<S: GateSink + ?Sized>(sink: &mut S, target: LineId) -> SynthesisResult<()> {
    sink.emit(Gate::not(target))
}

fn cnot<S: GateSink + ?Sized>(sink: &mut S, control: LineId, target: LineId) -> SynthesisResult<()> {
    sink.emit(Gate::cnot(control, target)?)
}

fn toffoli<S: GateSink + ?Sized>(
    sink: &mut S,
    control1: LineId,
    control2: LineId,
    target: LineId,
) -> SynthesisResult<()> {
    sink.emit(Gate::toffoli(control1, control2, target)?)
}

/// `dest ^= src`, bit by bit over `src`.
pub fn bitwise_cnot<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src: &[LineId],
) -> SynthesisResult<()> {
    if dest.len() < src.len() {
        return Err(SynthesisError::WidthMismatch {
            context: "bitwise copy".into(),
            expected: src.len(),
            found: dest.len(),
        });
    }
    for (&s, &d) in src.iter().zip(dest) {
        cnot(sink, s, d)?;
    }
    Ok(())
}

/// Invert every line of `dest`.
pub fn bitwise_negation<S: GateSink + ?Sized>(sink: &mut S, dest: &[LineId]) -> SynthesisResult<()> {
    for &line in dest {
        not(sink, line)?;
    }
    Ok(())
}

/// `dest ^= src1 & src2`.
pub fn conjunction<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: LineId,
    src2: LineId,
) -> SynthesisResult<()> {
    toffoli(sink, src1, src2, dest)
}

/// `dest ^= src1 | src2`.
pub fn disjunction<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: LineId,
    src2: LineId,
) -> SynthesisResult<()> {
    cnot(sink, src1, dest)?;
    cnot(sink, src2, dest)?;
    toffoli(sink, src1, src2, dest)
}

/// `dest ^= src1 & src2`, bitwise.
pub fn bitwise_and<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    require_width("bitwise and", dest.len(), src1.len().min(src2.len()))?;
    for ((&d, &a), &b) in dest.iter().zip(src1).zip(src2) {
        conjunction(sink, d, a, b)?;
    }
    Ok(())
}

/// `dest ^= src1 | src2`, bitwise.
pub fn bitwise_or<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    require_width("bitwise or", dest.len(), src1.len().min(src2.len()))?;
    for ((&d, &a), &b) in dest.iter().zip(src1).zip(src2) {
        disjunction(sink, d, a, b)?;
    }
    Ok(())
}

/// Ripple-carry adder computing `rhs += lhs` modulo `2^n`.
///
/// `lhs` is used as scratch and restored. When `carry` is given, the carry
/// out of the most significant bit is XORed into it.
pub fn inplace_add<S: GateSink + ?Sized>(
    sink: &mut S,
    lhs: &[LineId],
    rhs: &[LineId],
    carry: Option<LineId>,
) -> SynthesisResult<()> {
    require_width("addition", rhs.len(), lhs.len())?;
    let n = rhs.len();
    if n == 0 {
        return Ok(());
    }
    let (a, b) = (lhs, rhs);

    if n == 1 {
        if let Some(carry) = carry {
            toffoli(sink, a[0], b[0], carry)?;
        }
        return cnot(sink, a[0], b[0]);
    }

    for i in 1..n {
        cnot(sink, a[i], b[i])?;
    }
    if let Some(carry) = carry {
        cnot(sink, a[n - 1], carry)?;
    }
    for i in (2..n).rev() {
        cnot(sink, a[i - 1], a[i])?;
    }
    for i in 0..n - 1 {
        toffoli(sink, b[i], a[i], a[i + 1])?;
    }
    if let Some(carry) = carry {
        toffoli(sink, a[n - 1], b[n - 1], carry)?;
    }
    for i in (1..n).rev() {
        cnot(sink, a[i], b[i])?;
        toffoli(sink, a[i - 1], b[i - 1], a[i])?;
    }
    for i in 1..n - 1 {
        cnot(sink, a[i], a[i + 1])?;
    }
    for i in (0..n).rev() {
        cnot(sink, a[i], b[i])?;
    }
    Ok(())
}

/// `rhs -= lhs` modulo `2^n`, as `~(~rhs + lhs)`.
pub fn inplace_subtract<S: GateSink + ?Sized>(
    sink: &mut S,
    lhs: &[LineId],
    rhs: &[LineId],
) -> SynthesisResult<()> {
    bitwise_negation(sink, rhs)?;
    inplace_add(sink, lhs, rhs, None)?;
    bitwise_negation(sink, rhs)
}

/// `dest -= src`, XORing `[dest < src]` (the borrow) into `carry`.
pub fn decrease_with_carry<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src: &[LineId],
    carry: LineId,
) -> SynthesisResult<()> {
    require_width("subtraction", dest.len(), src.len())?;
    bitwise_negation(sink, dest)?;
    inplace_add(sink, src, dest, Some(carry))?;
    bitwise_negation(sink, dest)
}

/// `dest += 1` modulo `2^n`.
pub fn increment<S: GateSink + ?Sized>(sink: &mut S, dest: &[LineId]) -> SynthesisResult<()> {
    sink.controls().open_scope();
    for &line in dest {
        sink.controls().register(line);
    }
    for &line in dest.iter().rev() {
        sink.controls().deregister(line);
        not(sink, line)?;
    }
    sink.controls().close_scope();
    Ok(())
}

/// `dest -= 1` modulo `2^n`.
pub fn decrement<S: GateSink + ?Sized>(sink: &mut S, dest: &[LineId]) -> SynthesisResult<()> {
    sink.controls().open_scope();
    for &line in dest {
        not(sink, line)?;
        sink.controls().register(line);
    }
    sink.controls().close_scope();
    Ok(())
}

/// `dest ^= [src1 < src2]`.
pub fn less_than<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    decrease_with_carry(sink, src1, src2, dest)?;
    inplace_add(sink, src2, src1, None)
}

/// `dest ^= [src1 > src2]`.
pub fn greater_than<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    less_than(sink, dest, src2, src1)
}

/// `dest ^= [src1 <= src2]`.
pub fn less_equals<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    greater_than(sink, dest, src1, src2)?;
    not(sink, dest)
}

/// `dest ^= [src1 >= src2]`.
pub fn greater_equals<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    less_than(sink, dest, src1, src2)?;
    not(sink, dest)
}

/// `dest ^= [src1 == src2]`.
pub fn equals<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    require_width("equality", src1.len(), src2.len())?;
    for (&a, &b) in src1.iter().zip(src2) {
        cnot(sink, b, a)?;
        not(sink, a)?;
    }
    sink.emit(Gate::mct(src1.iter().copied(), dest)?)?;
    for (&a, &b) in src1.iter().zip(src2) {
        cnot(sink, b, a)?;
        not(sink, a)?;
    }
    Ok(())
}

/// `dest ^= [src1 != src2]`.
pub fn not_equals<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: LineId,
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    equals(sink, dest, src1, src2)?;
    not(sink, dest)
}

/// Shift-and-add multiplier: `dest ^= src1 * src2` for a zeroed `dest`.
///
/// Each partial product is added under control of one bit of `src1`.
pub fn multiplication<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src1: &[LineId],
    src2: &[LineId],
) -> SynthesisResult<()> {
    if src1.is_empty() || dest.is_empty() {
        return Ok(());
    }
    require_width("multiplication", dest.len(), src1.len().min(src2.len()))?;

    let n = dest.len();
    sink.controls().open_scope();
    sink.controls().register(src1[0]);
    bitwise_cnot(sink, dest, &src2[..n])?;
    sink.controls().deregister(src1[0]);

    for i in 1..n {
        sink.controls().register(src1[i]);
        inplace_add(sink, &src2[..n - i], &dest[i..], None)?;
        sink.controls().deregister(src1[i]);
    }
    sink.controls().close_scope();
    Ok(())
}

/// Restoring divider.
///
/// For zeroed `quotient` and `remainder` lines this leaves
/// `dividend / divisor` in `quotient` and `dividend % divisor` in
/// `remainder`. `dividend` and `divisor` are restored.
pub fn division<S: GateSink + ?Sized>(
    sink: &mut S,
    dividend: &[LineId],
    divisor: &[LineId],
    quotient: &[LineId],
    remainder: &[LineId],
) -> SynthesisResult<()> {
    let n = dividend.len();
    require_width("division", n, divisor.len())?;
    require_width("division", n, quotient.len())?;
    require_width("division", n, remainder.len())?;

    bitwise_cnot(sink, quotient, dividend)?;

    // Most significant bit first: remainder high..low, then quotient high..low.
    let aggregate: Vec<LineId> = remainder
        .iter()
        .rev()
        .chain(quotient.iter().rev())
        .copied()
        .collect();

    sink.controls().open_scope();
    for i in 1..=n {
        let window: Vec<LineId> = aggregate[i..i + n].iter().rev().copied().collect();
        let sign = remainder[n - i];

        decrease_with_carry(sink, &window, divisor, sign)?;
        sink.controls().register(sign);
        inplace_add(sink, divisor, &window, None)?;
        sink.controls().deregister(sign);
        not(sink, sign)?;
    }
    sink.controls().close_scope();

    swap(sink, quotient, remainder)
}

/// Exchange `dest1` and `dest2`.
///
/// Under propagated controls only the middle CNOT of each triple needs
/// them, which realizes a Fredkin gate per bit.
pub fn swap<S: GateSink + ?Sized>(
    sink: &mut S,
    dest1: &[LineId],
    dest2: &[LineId],
) -> SynthesisResult<()> {
    require_width("swap", dest1.len(), dest2.len())?;
    for (&a, &b) in dest1.iter().zip(dest2) {
        sink.emit_uncontrolled(Gate::cnot(b, a)?)?;
        cnot(sink, a, b)?;
        sink.emit_uncontrolled(Gate::cnot(b, a)?)?;
    }
    Ok(())
}

/// `dest ^= src << amount`, truncated to the width of `dest`.
pub fn left_shift<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src: &[LineId],
    amount: usize,
) -> SynthesisResult<()> {
    if amount >= dest.len() {
        return Ok(());
    }
    let shifted = dest.len() - amount;
    if src.len() < shifted {
        return Err(SynthesisError::WidthMismatch {
            context: "left shift".into(),
            expected: shifted,
            found: src.len(),
        });
    }
    for i in 0..shifted {
        cnot(sink, src[i], dest[amount + i])?;
    }
    Ok(())
}

/// `dest ^= src >> amount`.
pub fn right_shift<S: GateSink + ?Sized>(
    sink: &mut S,
    dest: &[LineId],
    src: &[LineId],
    amount: usize,
) -> SynthesisResult<()> {
    if amount >= src.len() {
        return Ok(());
    }
    let shifted = (src.len() - amount).min(dest.len());
    for i in 0..shifted {
        cnot(sink, src[amount + i], dest[i])?;
    }
    Ok(())
}
