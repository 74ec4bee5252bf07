//! Statement lowering.

use syrec_ir::{Gate, LineId};
use syrec_lang::{
    AssignOp, BinOp, Expression, Number, Statement, StatementKind, UnaryStatementOp,
    VariableAccess,
};
use tracing::debug;

use super::Synthesizer;
use crate::error::{SynthesisError, SynthesisResult};
use crate::primitives::{
    GateSink, bitwise_cnot, bitwise_negation, decrement, increment, inplace_add, inplace_subtract,
    swap,
};

impl<'p> Synthesizer<'p> {
    pub(super) fn lower_statements(&mut self, statements: &'p [Statement]) -> SynthesisResult<()> {
        for statement in statements {
            self.lower_statement(statement)?;
        }
        Ok(())
    }

    fn lower_statement(&mut self, statement: &'p Statement) -> SynthesisResult<()> {
        let previous = self.statement_line.replace(statement.position.line);
        debug!(
            "Lowering statement at {} in '{}'",
            statement.position, self.invocation.module.name
        );
        let result = match &statement.kind {
            StatementKind::Swap { lhs, rhs } => self.lower_swap(lhs, rhs),
            StatementKind::Unary { op, target } => self.lower_unary(*op, target),
            StatementKind::Assign { target, op, value } => self.lower_assign(target, *op, value),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
                fi_condition,
            } => self.lower_if(condition, then_branch, else_branch, fi_condition),
            StatementKind::For {
                variable,
                from,
                to,
                step,
                negative_step,
                body,
            } => self.lower_for(
                variable.as_deref(),
                from.as_ref(),
                to,
                step.as_ref(),
                *negative_step,
                body,
            ),
            StatementKind::Call { module, arguments } => self.lower_call(module, arguments, false),
            StatementKind::Uncall { module, arguments } => {
                self.lower_call(module, arguments, true)
            }
            StatementKind::Skip => Ok(()),
        };
        self.statement_line = previous;
        result
    }

    fn lower_swap(&mut self, lhs: &VariableAccess, rhs: &VariableAccess) -> SynthesisResult<()> {
        let a = self.resolve_access(lhs)?;
        let b = self.resolve_access(rhs)?;
        if a.len() != b.len() {
            return Err(SynthesisError::WidthMismatch {
                context: format!("swap of '{}' and '{}'", lhs.name, rhs.name),
                expected: a.len(),
                found: b.len(),
            });
        }
        if a.iter().any(|line| b.contains(line)) {
            return Err(SynthesisError::OverlappingOperands(format!(
                "swap of '{}' and '{}'",
                lhs.name, rhs.name
            )));
        }
        swap(self, &a, &b)
    }

    fn lower_unary(&mut self, op: UnaryStatementOp, target: &VariableAccess) -> SynthesisResult<()> {
        let lines = self.resolve_access(target)?;
        match op {
            UnaryStatementOp::Invert => bitwise_negation(self, &lines),
            UnaryStatementOp::Increment => increment(self, &lines),
            UnaryStatementOp::Decrement => decrement(self, &lines),
        }
    }

    fn lower_assign(
        &mut self,
        target: &VariableAccess,
        op: AssignOp,
        value: &Expression,
    ) -> SynthesisResult<()> {
        let lines = self.resolve_access(target)?;
        if self.mode.reuses_lines() {
            let mut terms = Vec::new();
            self.flatten(op, value, lines.len(), &mut terms)?;
            if terms.len() > 1 {
                debug!("Assignment to '{}' split into {} updates", target.name, terms.len());
                for (op, term) in terms {
                    self.apply_assignment(&lines, op, term)?;
                }
                return Ok(());
            }
        }
        self.apply_assignment(&lines, op, value)
    }

    /// Split `+`/`-` chains under `+=`/`-=` and `^` chains under `^=`.
    ///
    /// Only chains as wide as the target are split, so no intermediate
    /// sum wraps at a narrower width.
    fn flatten<'e>(
        &self,
        op: AssignOp,
        expr: &'e Expression,
        width: usize,
        terms: &mut Vec<(AssignOp, &'e Expression)>,
    ) -> SynthesisResult<()> {
        if let Expression::Binary {
            lhs,
            op: binary,
            rhs,
        } = expr
        {
            let splits = match (op, binary) {
                (AssignOp::Add | AssignOp::Sub, BinOp::Add | BinOp::Sub) => true,
                (AssignOp::Xor, BinOp::Xor) => true,
                _ => false,
            };
            if splits && self.static_width_is(expr, width)? {
                self.flatten(op, lhs, width, terms)?;
                let rhs_op = if *binary == BinOp::Sub { op.inverse() } else { op };
                return self.flatten(rhs_op, rhs, width, terms);
            }
        }
        terms.push((op, expr));
        Ok(())
    }

    fn static_width_is(&self, expr: &Expression, width: usize) -> SynthesisResult<bool> {
        Ok(matches!(self.static_width(expr)?, Some(w) if w == width))
    }

    /// `target op= value`, under the active guards.
    fn apply_assignment(
        &mut self,
        target: &[LineId],
        op: AssignOp,
        value: &Expression,
    ) -> SynthesisResult<()> {
        self.with_expression(value, Some(target.len()), target, |this, lines| match op {
            AssignOp::Add => inplace_add(this, lines, target, None),
            AssignOp::Sub => inplace_subtract(this, lines, target),
            AssignOp::Xor => bitwise_cnot(this, target, lines),
        })
    }

    fn lower_if(
        &mut self,
        condition: &Expression,
        then_branch: &'p [Statement],
        else_branch: &'p [Statement],
        fi_condition: &Expression,
    ) -> SynthesisResult<()> {
        // The guard copies carry the enclosing guards, so the line stays 0
        // whenever an outer branch is inactive.
        let guard = self.allocator.acquire(&mut self.circuit);
        let copy_into_guard = |this: &mut Self, lines: &[LineId]| -> SynthesisResult<()> {
            this.emit(Gate::cnot(lines[0], guard)?)
        };

        self.with_expression(condition, Some(1), &[guard], copy_into_guard)?;
        self.lower_guarded(guard, then_branch)?;
        self.emit_uncontrolled(Gate::not(guard))?;
        self.lower_guarded(guard, else_branch)?;
        self.emit_uncontrolled(Gate::not(guard))?;
        self.with_expression(fi_condition, Some(1), &[guard], copy_into_guard)?;

        self.allocator.release(guard)
    }

    fn lower_guarded(&mut self, guard: LineId, body: &'p [Statement]) -> SynthesisResult<()> {
        self.controls.open_scope();
        self.controls.register(guard);
        let result = self.lower_statements(body);
        self.controls.close_scope();
        result
    }

    fn lower_for(
        &mut self,
        variable: Option<&'p str>,
        from: Option<&Number>,
        to: &Number,
        step: Option<&Number>,
        negative_step: bool,
        body: &'p [Statement],
    ) -> SynthesisResult<()> {
        let start = match from {
            Some(from) => self.evaluate_number(from)?,
            None => 1,
        };
        let end = self.evaluate_number(to)?;
        let step = match step {
            Some(step) => self.evaluate_number(step)?,
            None => 1,
        };
        if step == 0 {
            return Err(SynthesisError::InvalidLoopStep);
        }
        let descending = negative_step || (from.is_some() && start > end);

        let mut value = start;
        loop {
            if (descending && value < end) || (!descending && value > end) {
                break;
            }
            self.iterations += 1;
            if let Some(limit) = self.settings.max_loop_iterations {
                if self.iterations > limit {
                    return Err(SynthesisError::LoopLimitExceeded { limit });
                }
            }

            if let Some(name) = variable {
                self.invocation.loop_vars.push((name, value));
            }
            let result = self.lower_statements(body);
            if variable.is_some() {
                self.invocation.loop_vars.pop();
            }
            result?;

            let next = if descending {
                value.checked_sub(step)
            } else {
                value.checked_add(step)
            };
            match next {
                Some(next) => value = next,
                None => break,
            }
        }
        Ok(())
    }
}
