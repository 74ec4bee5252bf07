//! Statement parsing for SyReC.

use super::Parser;
use crate::ast::{AssignOp, Statement, StatementKind, UnaryStatementOp};
use crate::error::ParseResult;
use crate::lexer::Token;

impl Parser {
    /// Parse `stmt (';' stmt)*`.
    pub(super) fn parse_statement_list(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = vec![self.parse_statement()?];
        while self.consume(&Token::Semicolon) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let position = self.position();
        let kind = match self.peek() {
            Some(Token::Call) => {
                self.advance();
                let (module, arguments) = self.parse_call_target()?;
                StatementKind::Call { module, arguments }
            }
            Some(Token::Uncall) => {
                self.advance();
                let (module, arguments) = self.parse_call_target()?;
                StatementKind::Uncall { module, arguments }
            }
            Some(Token::For) => self.parse_for()?,
            Some(Token::If) => self.parse_if()?,
            Some(Token::Skip) => {
                self.advance();
                StatementKind::Skip
            }
            Some(Token::InvertAssign | Token::IncrementAssign | Token::DecrementAssign) => {
                self.parse_unary_statement()?
            }
            Some(Token::Identifier(_)) => self.parse_access_statement()?,
            _ => return Err(self.unexpected("statement")),
        };
        Ok(Statement::new(kind, position))
    }

    /// Parse `name(arg, ...)` after `call` or `uncall`.
    fn parse_call_target(&mut self) -> ParseResult<(String, Vec<String>)> {
        let module = self.parse_identifier()?;
        self.expect(Token::LParen)?;
        let mut arguments = Vec::new();
        if !self.check(&Token::RParen) {
            arguments.push(self.parse_identifier()?);
            while self.consume(&Token::Comma) {
                arguments.push(self.parse_identifier()?);
            }
        }
        self.expect(Token::RParen)?;
        Ok((module, arguments))
    }

    /// Parse `for [[$i =] from to] to [step [-] s] do body rof`.
    fn parse_for(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::For)?;

        let variable = if self.check(&Token::Dollar)
            && matches!(self.peek_nth(1), Some(Token::Identifier(_)))
            && matches!(self.peek_nth(2), Some(Token::Eq))
        {
            self.advance();
            let name = self.parse_identifier()?;
            self.expect(Token::Eq)?;
            Some(name)
        } else {
            None
        };

        let first = self.parse_number()?;
        let (from, to) = if self.consume(&Token::To) {
            (Some(first), self.parse_number()?)
        } else if variable.is_some() {
            return Err(self.unexpected("'to'"));
        } else {
            (None, first)
        };

        let mut negative_step = false;
        let step = if self.consume(&Token::Step) {
            negative_step = self.consume(&Token::Minus);
            Some(self.parse_number()?)
        } else {
            None
        };

        self.expect(Token::Do)?;
        let body = self.parse_statement_list()?;
        self.expect(Token::Rof)?;

        Ok(StatementKind::For {
            variable,
            from,
            to,
            step,
            negative_step,
            body,
        })
    }

    /// Parse `if e then s else s fi e`.
    fn parse_if(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::If)?;
        let condition = self.parse_expression()?;
        self.expect(Token::Then)?;
        let then_branch = self.parse_statement_list()?;
        self.expect(Token::Else)?;
        let else_branch = self.parse_statement_list()?;
        self.expect(Token::Fi)?;
        let fi_condition = self.parse_expression()?;

        Ok(StatementKind::If {
            condition,
            then_branch,
            else_branch,
            fi_condition,
        })
    }

    fn parse_unary_statement(&mut self) -> ParseResult<StatementKind> {
        let op = match self.advance() {
            Some(Token::InvertAssign) => UnaryStatementOp::Invert,
            Some(Token::IncrementAssign) => UnaryStatementOp::Increment,
            _ => UnaryStatementOp::Decrement,
        };
        let target = self.parse_access()?;
        Ok(StatementKind::Unary { op, target })
    }

    /// Parse a swap or assignment starting with an access.
    fn parse_access_statement(&mut self) -> ParseResult<StatementKind> {
        let target = self.parse_access()?;
        let op = match self.peek() {
            Some(Token::Swap) => {
                self.advance();
                let rhs = self.parse_access()?;
                return Ok(StatementKind::Swap { lhs: target, rhs });
            }
            Some(Token::PlusEq) => AssignOp::Add,
            Some(Token::MinusEq) => AssignOp::Sub,
            Some(Token::CaretEq) => AssignOp::Xor,
            _ => return Err(self.unexpected("'<=>', '+=', '-=' or '^='")),
        };
        self.advance();
        let value = self.parse_expression()?;
        Ok(StatementKind::Assign { target, op, value })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AssignOp, Number, StatementKind, UnaryStatementOp};
    use crate::parse;

    fn statements(body: &str) -> Vec<StatementKind> {
        let source = format!(
            "module main(inout a(4), inout b(4), inout c(1))\n wire w(4)\n{body}"
        );
        let (program, diagnostics) = parse(&source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        program.modules[0]
            .statements
            .iter()
            .map(|s| s.kind.clone())
            .collect()
    }

    #[test]
    fn test_statement_sequence() {
        let stmts = statements("a <=> b; ++= a; --= b; ~= w; a += b; w ^= a; skip");
        assert_eq!(stmts.len(), 7);
        assert!(matches!(stmts[0], StatementKind::Swap { .. }));
        assert!(matches!(
            stmts[1],
            StatementKind::Unary {
                op: UnaryStatementOp::Increment,
                ..
            }
        ));
        assert!(matches!(
            stmts[4],
            StatementKind::Assign {
                op: AssignOp::Add,
                ..
            }
        ));
        assert_eq!(stmts[6], StatementKind::Skip);
    }

    #[test]
    fn test_for_loop_forms() {
        let stmts = statements(
            "for 3 do ++= a rof; \
             for $i = 0 to 3 do a.$i ^= c rof; \
             for $j = 3 to 0 step - 1 do ++= b rof",
        );
        match &stmts[0] {
            StatementKind::For {
                variable, from, to, ..
            } => {
                assert!(variable.is_none());
                assert!(from.is_none());
                assert_eq!(*to, Number::Literal(3));
            }
            other => panic!("expected for, got {other:?}"),
        }
        match &stmts[1] {
            StatementKind::For { variable, from, .. } => {
                assert_eq!(variable.as_deref(), Some("i"));
                assert_eq!(*from, Some(Number::Literal(0)));
            }
            other => panic!("expected for, got {other:?}"),
        }
        match &stmts[2] {
            StatementKind::For {
                negative_step,
                step,
                ..
            } => {
                assert!(*negative_step);
                assert_eq!(*step, Some(Number::Literal(1)));
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_if_statement() {
        let stmts = statements("if c then ++= a else --= a fi c");
        match &stmts[0] {
            StatementKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.len(), 1);
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_call_statements() {
        let source = r"
            module inc(inout x(4)) ++= x
            module main(inout a(4)) call inc(a); uncall inc(a)
        ";
        let (program, diagnostics) = parse(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let main = program.find_module("main").unwrap();
        assert_eq!(
            main.statements[0].kind,
            StatementKind::Call {
                module: "inc".into(),
                arguments: vec!["a".into()],
            }
        );
        assert!(matches!(main.statements[1].kind, StatementKind::Uncall { .. }));
    }

    #[test]
    fn test_missing_rof() {
        let (_, diagnostics) = parse("module m(inout a(2)) for 2 do ++= a");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("'rof'"));
    }
}
