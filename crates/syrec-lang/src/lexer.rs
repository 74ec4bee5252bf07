//! Lexer for SyReC.

use logos::Logos;

/// Tokens for SyReC.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
pub enum Token {
    // Keywords
    #[token("module")]
    Module,

    #[token("in")]
    In,

    #[token("out")]
    Out,

    #[token("inout")]
    Inout,

    #[token("wire")]
    Wire,

    #[token("state")]
    State,

    #[token("call")]
    Call,

    #[token("uncall")]
    Uncall,

    #[token("for")]
    For,

    #[token("to")]
    To,

    #[token("step")]
    Step,

    #[token("do")]
    Do,

    #[token("rof")]
    Rof,

    #[token("if")]
    If,

    #[token("then")]
    Then,

    #[token("else")]
    Else,

    #[token("fi")]
    Fi,

    #[token("skip")]
    Skip,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u64>().ok())]
    IntLiteral(u64),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Statement operators
    #[token("<=>")]
    Swap,
    #[token("~=")]
    InvertAssign,
    #[token("++=")]
    IncrementAssign,
    #[token("--=")]
    DecrementAssign,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("^=")]
    CaretEq,

    // Expression operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("!")]
    Not,
    #[token("~")]
    Tilde,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("=")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("#")]
    Hash,
    #[token("$")]
    Dollar,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Module => write!(f, "module"),
            Token::In => write!(f, "in"),
            Token::Out => write!(f, "out"),
            Token::Inout => write!(f, "inout"),
            Token::Wire => write!(f, "wire"),
            Token::State => write!(f, "state"),
            Token::Call => write!(f, "call"),
            Token::Uncall => write!(f, "uncall"),
            Token::For => write!(f, "for"),
            Token::To => write!(f, "to"),
            Token::Step => write!(f, "step"),
            Token::Do => write!(f, "do"),
            Token::Rof => write!(f, "rof"),
            Token::If => write!(f, "if"),
            Token::Then => write!(f, "then"),
            Token::Else => write!(f, "else"),
            Token::Fi => write!(f, "fi"),
            Token::Skip => write!(f, "skip"),
            Token::IntLiteral(v) => write!(f, "{v}"),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Swap => write!(f, "<=>"),
            Token::InvertAssign => write!(f, "~="),
            Token::IncrementAssign => write!(f, "++="),
            Token::DecrementAssign => write!(f, "--="),
            Token::PlusEq => write!(f, "+="),
            Token::MinusEq => write!(f, "-="),
            Token::CaretEq => write!(f, "^="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Ampersand => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Not => write!(f, "!"),
            Token::Tilde => write!(f, "~"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "!="),
            Token::LShift => write!(f, "<<"),
            Token::RShift => write!(f, ">>"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Hash => write!(f, "#"),
            Token::Dollar => write!(f, "$"),
        }
    }
}

/// A token with its byte span in the source.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Tokenize SyReC source code.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken, (std::ops::Range<usize>, String)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        if let Ok(token) = result {
            tokens.push(Ok(SpannedToken { token, span }));
        } else {
            let slice = String::from_utf8_lossy(&source.as_bytes()[span.clone()]);
            tokens.push(Err((span, format!("Invalid token: '{slice}'"))));
        }
    }

    tokens
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct SourceMap {
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Index the line starts of `source`.
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// Line and column of a byte offset.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line.saturating_sub(1)];
        (line.max(1), offset - start + 1)
    }
}
