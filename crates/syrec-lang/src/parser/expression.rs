//! Expression, number and access parsing for SyReC.

use super::Parser;
use crate::ast::{BinOp, BitRange, Expression, Number, ShiftOp, UnaryOp, VariableAccess};
use crate::error::ParseResult;
use crate::lexer::Token;

const SHIFT_PRECEDENCE: u8 = 8;

impl Parser {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expr(0)
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary_expr()?;

        loop {
            if let Some(op) = self.peek_shift_op() {
                if SHIFT_PRECEDENCE < min_prec {
                    break;
                }
                self.advance();
                let amount = self.parse_number()?;
                left = Expression::Shift {
                    operand: Box::new(left),
                    op,
                    amount,
                };
                continue;
            }

            let Some(op) = self.peek_binary_op() else {
                break;
            };
            let prec = op_precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance(); // consume operator

            let right = self.parse_binary_expr(prec + 1)?;
            left = Expression::Binary {
                lhs: Box::new(left),
                op,
                rhs: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expression> {
        let op = if self.consume(&Token::Not) {
            UnaryOp::LogicalNot
        } else if self.consume(&Token::Tilde) {
            UnaryOp::BitwiseNot
        } else {
            return self.parse_primary_expr();
        };
        let operand = self.parse_unary_expr()?;
        Ok(Expression::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expression> {
        match self.peek() {
            Some(Token::IntLiteral(_) | Token::Hash | Token::Dollar) => {
                Ok(Expression::Number(self.parse_number()?))
            }
            Some(Token::Identifier(_)) => Ok(Expression::Access(self.parse_access()?)),
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse `INT | #x | $i | (n op m)`.
    pub(super) fn parse_number(&mut self) -> ParseResult<Number> {
        match self.peek() {
            Some(Token::IntLiteral(v)) => {
                let v = *v;
                self.advance();
                Ok(Number::Literal(v))
            }
            Some(Token::Hash) => {
                self.advance();
                Ok(Number::Width(self.parse_identifier()?))
            }
            Some(Token::Dollar) => {
                self.advance();
                Ok(Number::LoopVariable(self.parse_identifier()?))
            }
            Some(Token::LParen) => {
                self.advance();
                let lhs = self.parse_number()?;
                let op = self
                    .peek_binary_op()
                    .ok_or_else(|| self.unexpected("operator"))?;
                self.advance();
                let rhs = self.parse_number()?;
                self.expect(Token::RParen)?;
                Ok(Number::Binary {
                    lhs: Box::new(lhs),
                    op,
                    rhs: Box::new(rhs),
                })
            }
            _ => Err(self.unexpected("number")),
        }
    }

    /// Parse `name[e]...[.n[:m]]`.
    pub(super) fn parse_access(&mut self) -> ParseResult<VariableAccess> {
        let position = self.position();
        let name = self.parse_identifier()?;

        let mut indices = Vec::new();
        while self.consume(&Token::LBracket) {
            indices.push(self.parse_expression()?);
            self.expect(Token::RBracket)?;
        }

        let range = if self.consume(&Token::Dot) {
            let start = self.parse_number()?;
            let end = if self.consume(&Token::Colon) {
                Some(self.parse_number()?)
            } else {
                None
            };
            Some(BitRange { start, end })
        } else {
            None
        };

        Ok(VariableAccess {
            name,
            indices,
            range,
            position,
        })
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Caret => Some(BinOp::Xor),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Percent => Some(BinOp::Mod),
            Token::And => Some(BinOp::LogicalAnd),
            Token::Or => Some(BinOp::LogicalOr),
            Token::Ampersand => Some(BinOp::BitAnd),
            Token::Pipe => Some(BinOp::BitOr),
            Token::Lt => Some(BinOp::Lt),
            Token::Gt => Some(BinOp::Gt),
            Token::Eq => Some(BinOp::Eq),
            Token::NotEq => Some(BinOp::NotEq),
            Token::LtEq => Some(BinOp::LtEq),
            Token::GtEq => Some(BinOp::GtEq),
            _ => None,
        }
    }

    fn peek_shift_op(&self) -> Option<ShiftOp> {
        match self.peek()? {
            Token::LShift => Some(ShiftOp::Left),
            Token::RShift => Some(ShiftOp::Right),
            _ => None,
        }
    }
}

/// Get operator precedence.
fn op_precedence(op: BinOp) -> u8 {
    match op {
        BinOp::LogicalOr => 1,
        BinOp::LogicalAnd => 2,
        BinOp::BitOr => 3,
        BinOp::Xor => 4,
        BinOp::BitAnd => 5,
        BinOp::Eq | BinOp::NotEq => 6,
        BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => 7,
        BinOp::Add | BinOp::Sub => 9,
        BinOp::Mul | BinOp::Div | BinOp::Mod => 10,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, Expression, Number, ShiftOp, StatementKind, UnaryOp};
    use crate::parse;

    fn value_of(expr: &str) -> Expression {
        let source = format!(
            "module main(in a(4), in b(4), in c(4), in f(1), inout x(4)) x ^= {expr}"
        );
        let (program, diagnostics) = parse(&source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        match &program.modules[0].statements[0].kind {
            StatementKind::Assign { value, .. } => value.clone(),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        match value_of("a + b * c") {
            Expression::Binary {
                op: BinOp::Add,
                rhs,
                ..
            } => assert!(matches!(*rhs, Expression::Binary { op: BinOp::Mul, .. })),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_left_associativity() {
        match value_of("a - b - c") {
            Expression::Binary {
                op: BinOp::Sub,
                lhs,
                ..
            } => assert!(matches!(*lhs, Expression::Binary { op: BinOp::Sub, .. })),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parentheses_and_shift() {
        match value_of("(a + b) << 2") {
            Expression::Shift {
                operand,
                op: ShiftOp::Left,
                amount,
            } => {
                assert_eq!(amount, Number::Literal(2));
                assert!(matches!(*operand, Expression::Binary { op: BinOp::Add, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bit_ranges_and_numbers() {
        match value_of("a.0:3 + (#a - 2)") {
            Expression::Binary { lhs, rhs, .. } => {
                match *lhs {
                    Expression::Access(access) => {
                        let range = access.range.unwrap();
                        assert_eq!(range.start, Number::Literal(0));
                        assert_eq!(range.end, Some(Number::Literal(3)));
                    }
                    other => panic!("unexpected {other:?}"),
                }
                assert!(matches!(*rhs, Expression::Binary { op: BinOp::Sub, .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unary_operators() {
        match value_of("~(a & b)") {
            Expression::Unary {
                op: UnaryOp::BitwiseNot,
                ..
            } => {}
            other => panic!("unexpected {other:?}"),
        }
    }
}
