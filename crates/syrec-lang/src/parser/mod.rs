//! Parser for SyReC.

mod expression;
mod module;
mod statement;

use std::path::Path;

use crate::ast::{Module, Position, Program};
use crate::error::{Diagnostic, DiagnosticKind, ParseError, ParseResult};
use crate::lexer::{SourceMap, SpannedToken, Token, tokenize};
use crate::semantic;
use crate::settings::ReadSettings;

/// Parse SyReC source text with default settings.
pub fn parse(source: &str) -> (Program, Vec<Diagnostic>) {
    parse_with_settings(source, &ReadSettings::default())
}

/// Parse SyReC source text.
///
/// Returns the program and every diagnostic found. A non-empty diagnostic
/// list leaves the program marked invalid.
pub fn parse_with_settings(source: &str, settings: &ReadSettings) -> (Program, Vec<Diagnostic>) {
    let map = SourceMap::new(source);
    let mut diagnostics = Vec::new();
    let mut tokens = Vec::new();

    for result in tokenize(source) {
        match result {
            Ok(t) => tokens.push(t),
            Err((span, msg)) => {
                let (line, column) = map.position(span.start);
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::Lexical,
                    Position::new(line, column),
                    msg,
                ));
            }
        }
    }

    let mut program = if diagnostics.is_empty() {
        let mut parser = Parser::new(tokens, map, source.len(), settings.default_bitwidth);
        Program::new(parser.parse_program(&mut diagnostics))
    } else {
        Program::default()
    };
    program.main_module.clone_from(&settings.main_module);
    program.truncation = settings.truncation;

    if diagnostics.is_empty() {
        diagnostics.extend(semantic::check(&program));
    }
    if !diagnostics.is_empty() {
        program.mark_invalid();
    }
    (program, diagnostics)
}

/// Read and parse a SyReC file.
///
/// A file that cannot be read yields a single [`DiagnosticKind::Io`] diagnostic.
pub fn parse_file(path: impl AsRef<Path>, settings: &ReadSettings) -> (Program, Vec<Diagnostic>) {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => parse_with_settings(&source, settings),
        Err(e) => {
            let mut program = Program::default();
            program.mark_invalid();
            let diagnostic = Diagnostic::new(
                DiagnosticKind::Io,
                Position::default(),
                format!("cannot read '{}': {e}", path.display()),
            );
            (program, vec![diagnostic])
        }
    }
}

/// Parser state.
pub(super) struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    map: SourceMap,
    source_len: usize,
    pub(super) default_bitwidth: u32,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, map: SourceMap, source_len: usize, default_bitwidth: u32) -> Self {
        Self {
            tokens,
            pos: 0,
            map,
            source_len,
            default_bitwidth,
        }
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Peek `n` tokens ahead of the current one.
    pub(super) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Source position of the current token.
    pub(super) fn position(&self) -> Position {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.source_len, |t| t.span.start);
        let (line, column) = self.map.position(offset);
        Position::new(line, column)
    }

    /// Error for the current token not being `expected`.
    pub(super) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let expected = expected.into();
        match self.peek() {
            Some(found) => ParseError::UnexpectedToken {
                position: self.position(),
                expected,
                found: found.to_string(),
            },
            None => ParseError::UnexpectedEof {
                position: self.position(),
                expected,
            },
        }
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(format!("'{expected}'")))
        }
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse all modules, recovering at the next `module` keyword after an error.
    fn parse_program(&mut self, diagnostics: &mut Vec<Diagnostic>) -> Vec<Module> {
        let mut modules = Vec::new();
        while !self.is_eof() {
            let start = self.pos;
            match self.parse_module() {
                Ok(module) => modules.push(module),
                Err(e) => {
                    diagnostics.push(e.into());
                    if self.pos == start {
                        self.advance();
                    }
                    while self.peek().is_some_and(|t| *t != Token::Module) {
                        self.advance();
                    }
                }
            }
        }
        modules
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Identifier(s)) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        match self.peek() {
            Some(Token::IntLiteral(v)) => {
                let v = *v;
                self.advance();
                Ok(v)
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    /// Parse an integer literal that must fit a `u32`.
    pub(super) fn parse_u32_literal(&mut self, context: &str) -> ParseResult<u32> {
        let position = self.position();
        let value = self.parse_int_literal()?;
        u32::try_from(value).map_err(|_| ParseError::IntegerOutOfRange {
            position,
            value,
            context: context.to_string(),
        })
    }
}
