//! SyReC Parser and Program Model
//!
//! This crate reads SyReC, a reversible hardware description language, into
//! an in-memory program model. Parsing never fails with an error value:
//! every lexical, syntax and semantic problem is collected as a
//! [`Diagnostic`] next to the (possibly partial) [`Program`].
//!
//! # Example
//!
//! ```rust
//! use syrec_lang::parse;
//!
//! let source = r"
//!     module main(in a(2), in b(2), out c(2))
//!         c ^= (a + b)
//! ";
//!
//! let (program, diagnostics) = parse(source);
//! assert!(diagnostics.is_empty());
//! assert!(program.is_valid());
//! assert_eq!(program.entry_module(None).unwrap().name, "main");
//! ```
//!
//! # Language Summary
//!
//! | Construct | Example |
//! |-----------|---------|
//! | Module | `module adder(in a(4), inout b(4))` |
//! | Locals | `wire t(4), u[2](8)` / `state s(3)` |
//! | Assignment | `b += a`, `b -= a`, `c ^= (a & b)` |
//! | Unary | `~= a`, `++= a`, `--= a` |
//! | Swap | `a <=> b` |
//! | Conditional | `if c then ... else ... fi c` |
//! | Loop | `for $i = 0 to (#a - 1) step 1 do ... rof` |
//! | Calls | `call adder(x, y)`, `uncall adder(x, y)` |
//! | Access | `a`, `a.3`, `a.0:2`, `m[1][$i].0` |

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod settings;

pub use ast::{
    AssignOp, BinOp, BitRange, Expression, Module, Number, NumberContext, NumberError, Position,
    Program, ShiftOp, Signal, SignalKind, Statement, StatementKind, UnaryOp, UnaryStatementOp,
    VariableAccess,
};
pub use error::{Diagnostic, DiagnosticKind, ParseError, ParseResult};
pub use parser::{parse, parse_file, parse_with_settings};
pub use settings::{ConstantTruncation, DEFAULT_BITWIDTH, ReadSettings};
