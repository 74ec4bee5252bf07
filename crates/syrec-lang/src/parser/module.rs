//! Module and signal declaration parsing.

use super::Parser;
use crate::ast::{Module, Signal, SignalKind};
use crate::error::ParseResult;
use crate::lexer::Token;

impl Parser {
    /// Parse `module name(params) decls statements`.
    pub(super) fn parse_module(&mut self) -> ParseResult<Module> {
        let position = self.position();
        self.expect(Token::Module)?;
        let name = self.parse_identifier()?;

        self.expect(Token::LParen)?;
        let mut parameters = Vec::new();
        if !self.check(&Token::RParen) {
            parameters.push(self.parse_parameter()?);
            while self.consume(&Token::Comma) {
                parameters.push(self.parse_parameter()?);
            }
        }
        self.expect(Token::RParen)?;

        let mut locals = Vec::new();
        while let Some(kind) = self.peek_local_kind() {
            self.advance();
            locals.push(self.parse_signal(kind)?);
            while self.consume(&Token::Comma) {
                locals.push(self.parse_signal(kind)?);
            }
        }

        let statements = self.parse_statement_list()?;

        Ok(Module {
            name,
            parameters,
            locals,
            statements,
            position,
        })
    }

    fn parse_parameter(&mut self) -> ParseResult<Signal> {
        let kind = match self.peek() {
            Some(Token::In) => SignalKind::In,
            Some(Token::Out) => SignalKind::Out,
            Some(Token::Inout) => SignalKind::Inout,
            _ => return Err(self.unexpected("'in', 'out' or 'inout'")),
        };
        self.advance();
        self.parse_signal(kind)
    }

    fn peek_local_kind(&self) -> Option<SignalKind> {
        match self.peek()? {
            Token::Wire => Some(SignalKind::Wire),
            Token::State => Some(SignalKind::State),
            _ => None,
        }
    }

    /// Parse `name[d0][d1]...(width)`.
    fn parse_signal(&mut self, kind: SignalKind) -> ParseResult<Signal> {
        let position = self.position();
        let name = self.parse_identifier()?;

        let mut dimensions = Vec::new();
        while self.consume(&Token::LBracket) {
            dimensions.push(self.parse_u32_literal("an array dimension")?);
            self.expect(Token::RBracket)?;
        }

        let width = if self.consume(&Token::LParen) {
            let width = self.parse_u32_literal("a signal width")?;
            self.expect(Token::RParen)?;
            width
        } else {
            self.default_bitwidth
        };

        Ok(Signal {
            name,
            kind,
            dimensions,
            width,
            position,
        })
    }
}
