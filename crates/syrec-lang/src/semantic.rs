//! Semantic checks over a parsed program.
//!
//! The checker walks every module once and reports each violation as a
//! [`Diagnostic`] of kind [`DiagnosticKind::Semantic`]. Widths that depend
//! on loop variables are unknown here and are left to synthesis.
//!
//! [`DiagnosticKind::Semantic`]: crate::error::DiagnosticKind::Semantic

use rustc_hash::FxHashSet;

use crate::ast::{
    BitRange, Expression, Module, Number, NumberContext, Position, Program, Signal, Statement,
    StatementKind, UnaryOp, VariableAccess,
};
use crate::error::Diagnostic;

/// Check a program and return every semantic diagnostic.
pub fn check(program: &Program) -> Vec<Diagnostic> {
    let mut checker = Checker {
        program,
        diagnostics: Vec::new(),
    };
    checker.check_program();
    checker.diagnostics
}

struct Checker<'a> {
    program: &'a Program,
    diagnostics: Vec<Diagnostic>,
}

/// Signals and loop variables visible while checking a module body.
struct Scope<'a> {
    module: &'a Module,
    loop_variables: Vec<String>,
}

impl NumberContext for Scope<'_> {
    fn signal_width(&self, name: &str) -> Option<u64> {
        self.module.find_signal(name).map(|s| u64::from(s.width))
    }

    fn loop_variable(&self, _name: &str) -> Option<u64> {
        None
    }
}

impl<'a> Checker<'a> {
    fn error(&mut self, position: Position, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::semantic(position, message));
    }

    fn check_program(&mut self) {
        let program = self.program;
        if program.modules.is_empty() {
            self.error(Position::new(1, 1), "program declares no modules");
            return;
        }

        let mut seen = FxHashSet::default();
        for module in &program.modules {
            if !seen.insert(module.name.as_str()) {
                self.error(
                    module.position,
                    format!("module '{}' is declared more than once", module.name),
                );
            }
        }

        if let Some(name) = &program.main_module {
            if program.find_module(name).is_none() {
                self.error(Position::new(1, 1), format!("main module '{name}' is not declared"));
            }
        }

        for module in &program.modules {
            self.check_module(module);
        }
    }

    fn check_module(&mut self, module: &'a Module) {
        let mut seen = FxHashSet::default();
        for signal in module.signals() {
            if !seen.insert(signal.name.as_str()) {
                self.error(
                    signal.position,
                    format!(
                        "signal '{}' is declared more than once in module '{}'",
                        signal.name, module.name
                    ),
                );
            }
            self.check_signal(signal);
        }

        let mut scope = Scope {
            module,
            loop_variables: Vec::new(),
        };
        self.check_statements(&module.statements, &mut scope);
    }

    fn check_signal(&mut self, signal: &Signal) {
        if signal.width == 0 {
            self.error(
                signal.position,
                format!("signal '{}' has width zero", signal.name),
            );
        }
        if signal.dimensions.contains(&0) {
            self.error(
                signal.position,
                format!("signal '{}' has an array dimension of zero", signal.name),
            );
        }
    }

    fn check_statements(&mut self, statements: &'a [Statement], scope: &mut Scope<'a>) {
        for statement in statements {
            self.check_statement(statement, scope);
        }
    }

    fn check_statement(&mut self, statement: &'a Statement, scope: &mut Scope<'a>) {
        let position = statement.position;
        match &statement.kind {
            StatementKind::Skip => {}
            StatementKind::Swap { lhs, rhs } => {
                let lw = self.check_target(lhs, scope);
                let rw = self.check_target(rhs, scope);
                if let (Some(lw), Some(rw)) = (lw, rw) {
                    if lw != rw {
                        self.error(
                            position,
                            format!("swap operands have different widths ({lw} and {rw})"),
                        );
                    }
                }
            }
            StatementKind::Unary { target, .. } => {
                self.check_target(target, scope);
            }
            StatementKind::Assign { target, value, .. } => {
                let target_width = self.check_target(target, scope);
                let value_width = self.check_expression(value, scope);
                if let (Some(tw), Some(vw)) = (target_width, value_width) {
                    if tw != vw {
                        self.error(
                            position,
                            format!(
                                "assignment to '{}' of width {tw} from an expression of width {vw}",
                                target.name
                            ),
                        );
                    }
                }
                if value.accesses().iter().any(|a| a.name == target.name) {
                    self.error(
                        position,
                        format!(
                            "assigned signal '{}' occurs in its own right-hand side",
                            target.name
                        ),
                    );
                }
            }
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
                fi_condition,
            } => {
                self.check_condition(condition, scope, "if");
                self.check_statements(then_branch, scope);
                self.check_statements(else_branch, scope);
                self.check_condition(fi_condition, scope, "fi");
            }
            StatementKind::For {
                variable,
                from,
                to,
                step,
                negative_step,
                body,
            } => {
                self.check_for_header(position, variable.as_deref(), from.as_ref(), to, step.as_ref(), *negative_step, scope);
                if let Some(name) = variable {
                    scope.loop_variables.push(name.clone());
                    self.check_statements(body, scope);
                    scope.loop_variables.pop();
                } else {
                    self.check_statements(body, scope);
                }
            }
            StatementKind::Call { module, arguments } | StatementKind::Uncall { module, arguments } => {
                self.check_call(position, module, arguments, scope);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_for_header(
        &mut self,
        position: Position,
        variable: Option<&str>,
        from: Option<&Number>,
        to: &Number,
        step: Option<&Number>,
        negative_step: bool,
        scope: &Scope<'a>,
    ) {
        if let Some(name) = variable {
            if scope.loop_variables.iter().any(|v| v == name) {
                self.error(
                    position,
                    format!("loop variable '${name}' shadows an enclosing loop variable"),
                );
            }
        }
        for number in from.into_iter().chain(std::iter::once(to)).chain(step) {
            self.check_number(number, position, scope);
        }

        let from_value = from.map_or(Some(1), |n| self.constant_value(n, scope));
        let to_value = self.constant_value(to, scope);
        let step_value = step.map_or(Some(1), |n| self.constant_value(n, scope));

        if step_value == Some(0) {
            self.error(position, "loop step must not be zero");
        }
        if let (Some(from), Some(to)) = (from_value, to_value) {
            if negative_step && from < to {
                self.error(
                    position,
                    format!("loop from {from} to {to} cannot use a negative step"),
                );
            }
        }
    }

    fn check_call(&mut self, position: Position, name: &str, arguments: &[String], scope: &Scope<'a>) {
        let Some(callee) = self.program.find_module(name) else {
            self.error(position, format!("unknown module '{name}'"));
            return;
        };

        if callee.parameters.len() != arguments.len() {
            self.error(
                position,
                format!(
                    "module '{name}' expects {} arguments, got {}",
                    callee.parameters.len(),
                    arguments.len()
                ),
            );
        }

        let mut seen = FxHashSet::default();
        for (i, argument) in arguments.iter().enumerate() {
            if !seen.insert(argument.as_str()) {
                self.error(
                    position,
                    format!("signal '{argument}' is passed more than once to '{name}'"),
                );
            }
            let Some(signal) = scope.module.find_signal(argument) else {
                self.error(position, format!("unknown signal '{argument}'"));
                continue;
            };
            if let Some(parameter) = callee.parameters.get(i) {
                if parameter.width != signal.width || parameter.dimensions != signal.dimensions {
                    self.error(
                        position,
                        format!(
                            "argument '{argument}' does not match parameter '{}' of module '{name}'",
                            parameter.name
                        ),
                    );
                }
            }
        }
    }

    fn check_condition(&mut self, condition: &'a Expression, scope: &Scope<'a>, keyword: &str) {
        if let Some(width) = self.check_expression(condition, scope) {
            if width != 1 {
                self.error(
                    condition_position(condition),
                    format!("{keyword} condition must have width 1, found {width}"),
                );
            }
        }
    }

    /// Check an access that a statement modifies. Returns its width if known.
    fn check_target(&mut self, access: &'a VariableAccess, scope: &Scope<'a>) -> Option<u64> {
        let width = self.check_access(access, scope);
        if let Some(signal) = scope.module.find_signal(&access.name) {
            if !signal.kind.is_assignable() {
                self.error(
                    access.position,
                    format!("input signal '{}' cannot be modified", access.name),
                );
            }
        }
        width
    }

    /// Check an access. Returns its width if known.
    fn check_access(&mut self, access: &'a VariableAccess, scope: &Scope<'a>) -> Option<u64> {
        let Some(signal) = scope.module.find_signal(&access.name) else {
            self.error(access.position, format!("unknown signal '{}'", access.name));
            return None;
        };

        if access.indices.len() != signal.dimensions.len() {
            self.error(
                access.position,
                format!(
                    "signal '{}' has {} dimensions, accessed with {} indices",
                    access.name,
                    signal.dimensions.len(),
                    access.indices.len()
                ),
            );
        }
        for (index, &size) in access.indices.iter().zip(signal.dimensions.iter()) {
            self.check_expression(index, scope);
            if let Expression::Number(number) = index {
                if let Some(value) = self.constant_value(number, scope) {
                    if value >= u64::from(size) {
                        self.error(
                            access.position,
                            format!(
                                "index {value} is out of range for dimension of size {size} of '{}'",
                                access.name
                            ),
                        );
                    }
                }
            }
        }

        let width = u64::from(signal.width);
        let Some(BitRange { start, end }) = &access.range else {
            return Some(width);
        };
        self.check_number(start, access.position, scope);
        if let Some(end) = end {
            self.check_number(end, access.position, scope);
        }

        let start_value = self.constant_value(start, scope);
        let end_value = match end {
            Some(end) => self.constant_value(end, scope),
            None => start_value,
        };
        for bit in [start_value, end_value].into_iter().flatten() {
            if bit >= width {
                self.error(
                    access.position,
                    format!(
                        "bit {bit} is out of range for '{}' of width {width}",
                        access.name
                    ),
                );
                return None;
            }
        }
        match (start_value, end_value) {
            (Some(s), Some(e)) => Some(s.abs_diff(e) + 1),
            _ if end.is_none() => Some(1),
            _ => None,
        }
    }

    /// Check an expression. Returns its width if known.
    fn check_expression(&mut self, expr: &'a Expression, scope: &Scope<'a>) -> Option<u64> {
        match expr {
            Expression::Number(number) => {
                self.check_number(number, condition_position(expr), scope);
                None
            }
            Expression::Access(access) => self.check_access(access, scope),
            Expression::Binary { lhs, op, rhs } => {
                let lw = self.check_expression(lhs, scope);
                let rw = self.check_expression(rhs, scope);
                if op.is_predicate() {
                    Some(1)
                } else {
                    match (lw, rw) {
                        (Some(l), Some(r)) => Some(l.max(r)),
                        (w, None) | (None, w) => w,
                    }
                }
            }
            Expression::Shift {
                operand, amount, ..
            } => {
                self.check_number(amount, condition_position(operand), scope);
                self.check_expression(operand, scope)
            }
            Expression::Unary { op, operand } => {
                let width = self.check_expression(operand, scope);
                match op {
                    UnaryOp::LogicalNot => {
                        if let Some(w) = width.filter(|&w| w != 1) {
                            self.error(
                                condition_position(operand),
                                format!("logical negation needs a single bit, found width {w}"),
                            );
                        }
                        Some(1)
                    }
                    UnaryOp::BitwiseNot => width,
                }
            }
        }
    }

    fn check_number(&mut self, number: &Number, position: Position, scope: &Scope<'a>) {
        match number {
            Number::Literal(_) => {}
            Number::Width(name) => {
                if scope.module.find_signal(name).is_none() {
                    self.error(position, format!("unknown signal '{name}' in '#{name}'"));
                }
            }
            Number::LoopVariable(name) => {
                if !scope.loop_variables.iter().any(|v| v == name) {
                    self.error(position, format!("unknown loop variable '${name}'"));
                }
            }
            Number::Binary { lhs, rhs, .. } => {
                self.check_number(lhs, position, scope);
                self.check_number(rhs, position, scope);
            }
        }
    }

    /// Value of a number that does not depend on loop variables.
    fn constant_value(&self, number: &Number, scope: &Scope<'a>) -> Option<u64> {
        let mut loop_variables = Vec::new();
        number.loop_variables(&mut loop_variables);
        if loop_variables.is_empty() {
            number.evaluate(scope).ok()
        } else {
            None
        }
    }
}

/// Best available position for an expression.
fn condition_position(expr: &Expression) -> Position {
    match expr {
        Expression::Access(access) => access.position,
        Expression::Binary { lhs, .. } => condition_position(lhs),
        Expression::Shift { operand, .. } | Expression::Unary { operand, .. } => {
            condition_position(operand)
        }
        Expression::Number(_) => Position::default(),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DiagnosticKind;
    use crate::parse;

    fn messages(source: &str) -> Vec<String> {
        let (program, diagnostics) = parse(source);
        assert!(!program.is_valid() || diagnostics.is_empty());
        assert!(
            diagnostics.iter().all(|d| d.kind == DiagnosticKind::Semantic),
            "{diagnostics:?}"
        );
        diagnostics.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_valid_program() {
        let source = r"
            module inc(inout x(4)) ++= x
            module main(in a(4), out b(4), inout c(1))
                wire t(4)
                b ^= a;
                for $i = 0 to 3 do
                    if c then t.$i ^= a.$i else skip fi c
                rof;
                call inc(t);
                uncall inc(t)
        ";
        assert!(messages(source).is_empty());
    }

    #[test]
    fn test_undeclared_signal() {
        let msgs = messages("module main(out c(2)) c ^= (a + c.0:1)");
        assert!(msgs.iter().any(|m| m.contains("unknown signal 'a'")));
    }

    #[test]
    fn test_redeclaration() {
        let msgs = messages("module main(in a(2), out a(2)) wire a(1) skip");
        assert_eq!(
            msgs.iter()
                .filter(|m| m.contains("declared more than once"))
                .count(),
            2
        );
    }

    #[test]
    fn test_width_mismatch() {
        let msgs = messages("module main(in a(2), out c(3)) c ^= a");
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("width 3"));

        let msgs = messages("module main(inout a(2), inout c(3)) a <=> c");
        assert!(msgs[0].contains("different widths"));
    }

    #[test]
    fn test_literals_adapt() {
        assert!(messages("module main(inout a(4)) a += 3").is_empty());
    }

    #[test]
    fn test_input_not_assignable() {
        let msgs = messages("module main(in a(2), in b(2)) a += b");
        assert!(msgs[0].contains("cannot be modified"));
    }

    #[test]
    fn test_self_reference() {
        let msgs = messages("module main(inout a(2), in b(2)) a += (a.0:1 + b)");
        assert!(msgs.iter().any(|m| m.contains("its own right-hand side")));
    }

    #[test]
    fn test_call_checks() {
        let source = r"
            module f(inout x(2), inout y(2)) x <=> y
            module main(inout a(2), inout b(3))
                call f(a);
                call f(a, a);
                call f(a, b);
                call g(a)
        ";
        let msgs = messages(source);
        assert!(msgs.iter().any(|m| m.contains("expects 2 arguments, got 1")));
        assert!(msgs.iter().any(|m| m.contains("passed more than once")));
        assert!(msgs.iter().any(|m| m.contains("does not match parameter 'y'")));
        assert!(msgs.iter().any(|m| m.contains("unknown module 'g'")));
    }

    #[test]
    fn test_loop_checks() {
        let msgs = messages("module main(inout a(2)) for $i = 0 to 2 step 0 do ++= a rof");
        assert!(msgs.iter().any(|m| m.contains("step must not be zero")));

        let msgs = messages("module main(inout a(2)) for $i = 0 to 2 step -1 do ++= a rof");
        assert!(msgs.iter().any(|m| m.contains("negative step")));

        let msgs = messages(
            "module main(inout a(2)) for $i = 0 to 1 do for $i = 0 to 1 do ++= a rof rof",
        );
        assert!(msgs.iter().any(|m| m.contains("shadows")));

        let msgs = messages("module main(inout a(4)) a.$j ^= 1");
        assert!(msgs.iter().any(|m| m.contains("unknown loop variable '$j'")));
    }

    #[test]
    fn test_range_checks() {
        let msgs = messages("module main(inout a(2), in b[2](1)) a.2 ^= b[2]");
        assert!(msgs.iter().any(|m| m.contains("bit 2 is out of range")));
        assert!(msgs.iter().any(|m| m.contains("index 2 is out of range")));
    }

    #[test]
    fn test_zero_width_and_dimension() {
        let msgs = messages("module main(inout a(0), inout b[0](1)) skip");
        assert!(msgs.iter().any(|m| m.contains("width zero")));
        assert!(msgs.iter().any(|m| m.contains("dimension of zero")));
    }

    #[test]
    fn test_condition_width() {
        let msgs = messages("module main(inout a(2), inout b(2)) if a then ++= b else skip fi a");
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn test_unknown_main_module() {
        let settings = crate::ReadSettings {
            main_module: Some("top".into()),
            ..crate::ReadSettings::default()
        };
        let (program, diagnostics) =
            crate::parse_with_settings("module main(inout a(1)) ~= a", &settings);
        assert!(!program.is_valid());
        assert!(diagnostics[0].message.contains("'top' is not declared"));
    }
}
