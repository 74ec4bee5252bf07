//! Expression lowering.
//!
//! An expression is computed into lines inside an isolated control scope
//! and its own gate buffer. The caller applies the value to its target,
//! after which the buffer is replayed in reverse to restore every
//! temporary (always in line-aware mode, and in either mode inside an
//! uncalled body).

use rustc_hash::FxHashMap;
use syrec_ir::{Gate, LineId};
use syrec_lang::{BinOp, Expression, ShiftOp, UnaryOp};

use super::Synthesizer;
use crate::error::{SynthesisError, SynthesisResult};
use crate::primitives::{
    GateSink, bitwise_and, bitwise_cnot, bitwise_negation, bitwise_or, conjunction, disjunction,
    division, equals, greater_equals, greater_than, inplace_add, inplace_subtract, left_shift,
    less_equals, less_than, multiplication, not_equals, right_shift,
};

/// Lines holding the value of a (sub-)expression.
#[derive(Debug, Clone)]
struct Value {
    lines: Vec<LineId>,
    /// Whether the lines may be overwritten by the next operation.
    owned: bool,
}

impl Value {
    fn owned(lines: Vec<LineId>) -> Self {
        Self { lines, owned: true }
    }

    fn borrowed(lines: Vec<LineId>) -> Self {
        Self {
            lines,
            owned: false,
        }
    }
}

/// Bits needed to represent `value`, at least one.
fn bits_needed(value: u64) -> usize {
    (64 - value.leading_zeros() as usize).max(1)
}

fn max_width(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

fn fold_binary(op: BinOp, lhs: u64, rhs: u64) -> SynthesisResult<u64> {
    match op {
        BinOp::Add => Ok(lhs.wrapping_add(rhs)),
        BinOp::Sub => Ok(lhs.wrapping_sub(rhs)),
        BinOp::Mul => Ok(lhs.wrapping_mul(rhs)),
        BinOp::Div | BinOp::Mod => op.evaluate(lhs, rhs).ok_or(SynthesisError::DivisionByZero),
        _ => op
            .evaluate(lhs, rhs)
            .ok_or_else(|| SynthesisError::Number(format!("({lhs} {op} {rhs})"))),
    }
}

impl Synthesizer<'_> {
    /// Compute `expr`, hand its lines to `apply`, then restore temporaries.
    ///
    /// `width` fixes the result width; narrower values are zero-extended.
    /// The expression must not read any of the `protected` lines.
    pub(super) fn with_expression<R>(
        &mut self,
        expr: &Expression,
        width: Option<usize>,
        protected: &[LineId],
        apply: impl FnOnce(&mut Self, &[LineId]) -> SynthesisResult<R>,
    ) -> SynthesisResult<R> {
        let uses = self.count_uses(expr)?;
        if let Some(line) = protected.iter().find(|line| uses.contains_key(line)) {
            return Err(SynthesisError::OverlappingOperands(format!(
                "expression reads its own target line {line}"
            )));
        }
        let previous_uses = std::mem::replace(&mut self.line_uses, uses);

        let mark = self.allocator.mark();
        self.frames.push(Vec::new());
        self.controls.open_isolated_scope();
        let lowered = self
            .lower_expression(expr, width)
            .and_then(|value| match width {
                Some(width) => self.extend(value, width),
                None => Ok(value),
            });
        self.controls.close_scope();
        let computation = self.frames.pop().unwrap_or_default();
        self.line_uses = previous_uses;
        let value = lowered?;

        self.append_buffer(computation.clone(), false);
        let result = apply(self, &value.lines)?;

        let temporaries = self.allocator.take_since(mark);
        if self.restores_temporaries() {
            self.append_buffer(computation, true);
            for line in temporaries.into_iter().rev() {
                self.allocator.release(line)?;
            }
        }
        Ok(result)
    }

    fn count_uses(&self, expr: &Expression) -> SynthesisResult<FxHashMap<LineId, usize>> {
        let mut uses: FxHashMap<LineId, usize> = FxHashMap::default();
        for access in expr.accesses() {
            for line in self.resolve_access(access)? {
                *uses.entry(line).or_default() += 1;
            }
        }
        Ok(uses)
    }

    /// Whether the lines of `value` may be modified in place.
    ///
    /// Signal lines qualify in line-aware mode when nothing else in the
    /// expression reads them; the computation is undone afterwards.
    fn modifiable(&self, value: &Value) -> bool {
        if value.owned {
            return true;
        }
        self.mode.reuses_lines()
            && value
                .lines
                .iter()
                .all(|line| self.line_uses.get(line).copied().unwrap_or(0) <= 1)
    }

    /// Compile-time value of `expr`, if it reads no signal.
    pub(super) fn fold(&self, expr: &Expression) -> SynthesisResult<Option<u64>> {
        Ok(match expr {
            Expression::Number(number) => Some(self.evaluate_number(number)?),
            Expression::Access(_) => None,
            Expression::Binary { lhs, op, rhs } => match (self.fold(lhs)?, self.fold(rhs)?) {
                (Some(l), Some(r)) => Some(fold_binary(*op, l, r)?),
                _ => None,
            },
            Expression::Shift {
                operand,
                op,
                amount,
            } => match self.fold(operand)? {
                Some(value) => {
                    let amount = u32::try_from(self.evaluate_number(amount)?).unwrap_or(u32::MAX);
                    Some(match op {
                        ShiftOp::Left => value.checked_shl(amount).unwrap_or(0),
                        ShiftOp::Right => value.checked_shr(amount).unwrap_or(0),
                    })
                }
                None => None,
            },
            Expression::Unary { op, operand } => self.fold(operand)?.map(|value| match op {
                UnaryOp::LogicalNot => u64::from(value == 0),
                UnaryOp::BitwiseNot => !value,
            }),
        })
    }

    /// Width of `expr` derived from the signals it reads.
    ///
    /// `None` for expressions made only of numbers, which adapt to their
    /// context.
    pub(super) fn static_width(&self, expr: &Expression) -> SynthesisResult<Option<usize>> {
        Ok(match expr {
            Expression::Number(_) => None,
            Expression::Access(access) => Some(self.resolve_access(access)?.len()),
            Expression::Binary { op, .. } if op.is_predicate() => Some(1),
            Expression::Binary { lhs, rhs, .. } => {
                max_width(self.static_width(lhs)?, self.static_width(rhs)?)
            }
            Expression::Shift { operand, .. } => self.static_width(operand)?,
            Expression::Unary {
                op: UnaryOp::LogicalNot,
                ..
            } => Some(1),
            Expression::Unary { operand, .. } => self.static_width(operand)?,
        })
    }

    fn lower_expression(&mut self, expr: &Expression, width: Option<usize>) -> SynthesisResult<Value> {
        if !matches!(expr, Expression::Access(_)) {
            if let Some(value) = self.fold(expr)? {
                let width = match self.static_width(expr)? {
                    Some(width) => width,
                    None => width.unwrap_or_else(|| bits_needed(value)),
                };
                return self.constant(value, width);
            }
        }

        match expr {
            Expression::Access(access) => Ok(Value::borrowed(self.resolve_access(access)?)),
            Expression::Binary { lhs, op, rhs } => self.lower_binary(lhs, *op, rhs, width),
            Expression::Shift {
                operand,
                op,
                amount,
            } => {
                let amount = usize::try_from(self.evaluate_number(amount)?).unwrap_or(usize::MAX);
                let operand = self.lower_expression(operand, width)?;
                let dest = self.fresh(operand.lines.len());
                match op {
                    ShiftOp::Left => left_shift(self, &dest, &operand.lines, amount)?,
                    ShiftOp::Right => right_shift(self, &dest, &operand.lines, amount)?,
                }
                Ok(Value::owned(dest))
            }
            Expression::Unary { op, operand } => {
                let operand = self.lower_expression(operand, width)?;
                if *op == UnaryOp::LogicalNot && operand.lines.len() != 1 {
                    return Err(SynthesisError::WidthMismatch {
                        context: "logical negation".into(),
                        expected: 1,
                        found: operand.lines.len(),
                    });
                }
                let result = if self.modifiable(&operand) {
                    operand.lines
                } else {
                    self.copy(&operand.lines)?
                };
                bitwise_negation(self, &result)?;
                Ok(Value::owned(result))
            }
            Expression::Number(number) => {
                let value = self.evaluate_number(number)?;
                self.constant(value, width.unwrap_or_else(|| bits_needed(value)))
            }
        }
    }

    fn lower_binary(
        &mut self,
        lhs: &Expression,
        op: BinOp,
        rhs: &Expression,
        width: Option<usize>,
    ) -> SynthesisResult<Value> {
        let operand_width = max_width(self.static_width(lhs)?, self.static_width(rhs)?);
        let operand_width = if op.is_predicate() {
            operand_width
        } else {
            operand_width.or(width)
        }
        .ok_or_else(|| SynthesisError::Unsupported(format!("operand width of '{op}'")))?;

        let lhs = self.lower_expression(lhs, Some(operand_width))?;
        let lhs = self.extend(lhs, operand_width)?;
        let rhs = self.lower_expression(rhs, Some(operand_width))?;
        let mut rhs = self.extend(rhs, operand_width)?;
        if rhs.lines.iter().any(|line| lhs.lines.contains(line)) {
            rhs = Value::owned(self.copy(&rhs.lines)?);
        }
        let (a, b) = (&lhs.lines, &rhs.lines);

        if matches!(op, BinOp::LogicalAnd | BinOp::LogicalOr) && operand_width != 1 {
            return Err(SynthesisError::WidthMismatch {
                context: format!("operands of '{op}'"),
                expected: 1,
                found: operand_width,
            });
        }

        match op {
            BinOp::Add => {
                if self.modifiable(&rhs) {
                    inplace_add(self, a, b, None)?;
                    Ok(Value::owned(rhs.lines))
                } else if self.modifiable(&lhs) {
                    inplace_add(self, b, a, None)?;
                    Ok(Value::owned(lhs.lines))
                } else {
                    let sum = self.copy(a)?;
                    inplace_add(self, b, &sum, None)?;
                    Ok(Value::owned(sum))
                }
            }
            BinOp::Sub => {
                if self.modifiable(&lhs) {
                    inplace_subtract(self, b, a)?;
                    Ok(Value::owned(lhs.lines))
                } else {
                    let difference = self.copy(a)?;
                    inplace_subtract(self, b, &difference)?;
                    Ok(Value::owned(difference))
                }
            }
            BinOp::Xor => {
                if self.modifiable(&rhs) {
                    bitwise_cnot(self, b, a)?;
                    Ok(Value::owned(rhs.lines))
                } else if self.modifiable(&lhs) {
                    bitwise_cnot(self, a, b)?;
                    Ok(Value::owned(lhs.lines))
                } else {
                    let result = self.copy(a)?;
                    bitwise_cnot(self, &result, b)?;
                    Ok(Value::owned(result))
                }
            }
            BinOp::Mul => {
                let product = self.fresh(operand_width);
                multiplication(self, &product, a, b)?;
                Ok(Value::owned(product))
            }
            BinOp::Div | BinOp::Mod => {
                let quotient = self.fresh(operand_width);
                let remainder = self.fresh(operand_width);
                division(self, a, b, &quotient, &remainder)?;
                Ok(Value::owned(if op == BinOp::Div {
                    quotient
                } else {
                    remainder
                }))
            }
            BinOp::BitAnd => {
                let result = self.fresh(operand_width);
                bitwise_and(self, &result, a, b)?;
                Ok(Value::owned(result))
            }
            BinOp::BitOr => {
                let result = self.fresh(operand_width);
                bitwise_or(self, &result, a, b)?;
                Ok(Value::owned(result))
            }
            BinOp::LogicalAnd => {
                let result = self.fresh(1);
                conjunction(self, result[0], a[0], b[0])?;
                Ok(Value::owned(result))
            }
            BinOp::LogicalOr => {
                let result = self.fresh(1);
                disjunction(self, result[0], a[0], b[0])?;
                Ok(Value::owned(result))
            }
            BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq | BinOp::Eq | BinOp::NotEq => {
                let result = self.fresh(1);
                let dest = result[0];
                match op {
                    BinOp::Lt => less_than(self, dest, a, b)?,
                    BinOp::Gt => greater_than(self, dest, a, b)?,
                    BinOp::LtEq => less_equals(self, dest, a, b)?,
                    BinOp::GtEq => greater_equals(self, dest, a, b)?,
                    BinOp::Eq => equals(self, dest, a, b)?,
                    _ => not_equals(self, dest, a, b)?,
                }
                Ok(Value::owned(result))
            }
        }
    }

    /// Zero-extend `value` to `width` lines.
    fn extend(&mut self, value: Value, width: usize) -> SynthesisResult<Value> {
        let Value { mut lines, owned } = value;
        if lines.len() > width {
            return Err(SynthesisError::WidthMismatch {
                context: "expression".into(),
                expected: width,
                found: lines.len(),
            });
        }
        if lines.len() == width {
            return Ok(Value { lines, owned });
        }
        let padding = width - lines.len();
        lines.extend(self.fresh(padding));
        Ok(Value { lines, owned })
    }

    /// Acquire `n` zeroed lines.
    fn fresh(&mut self, n: usize) -> Vec<LineId> {
        (0..n)
            .map(|_| self.allocator.acquire(&mut self.circuit))
            .collect()
    }

    /// Copy `lines` into fresh lines.
    fn copy(&mut self, lines: &[LineId]) -> SynthesisResult<Vec<LineId>> {
        let copy = self.fresh(lines.len());
        bitwise_cnot(self, &copy, lines)?;
        Ok(copy)
    }

    /// Constant lines holding `value` truncated to `width` bits.
    fn constant(&mut self, value: u64, width: usize) -> SynthesisResult<Value> {
        if width == 0 {
            return Err(SynthesisError::ZeroWidth("constant".into()));
        }
        let value = self.program.truncation.apply(value, width);
        let mut lines = Vec::with_capacity(width);
        for bit in 0..width {
            let set = bit < 64 && (value >> bit) & 1 == 1;
            let constant = self.allocator.acquire_constant(&mut self.circuit, set);
            if constant.needs_not {
                self.emit(Gate::not(constant.line))?;
            }
            lines.push(constant.line);
        }
        Ok(Value::owned(lines))
    }
}
