//! Abstract Syntax Tree for SyReC.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::ConstantTruncation;

/// A position in the source text, 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A complete SyReC program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Modules in declaration order.
    pub modules: Vec<Module>,
    /// Entry module requested when the program was read.
    pub main_module: Option<String>,
    /// How integer constants are fitted to their context width.
    pub truncation: ConstantTruncation,
    valid: bool,
}

impl Default for Program {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Program {
    /// Create a program from modules.
    pub fn new(modules: Vec<Module>) -> Self {
        Self {
            modules,
            main_module: None,
            truncation: ConstantTruncation::default(),
            valid: true,
        }
    }

    /// Whether the program was read without diagnostics.
    ///
    /// Synthesis refuses programs for which this is `false`.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub(crate) fn mark_invalid(&mut self) {
        self.valid = false;
    }

    /// Find a module by name.
    pub fn find_module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Resolve the entry module.
    ///
    /// `name` (or else the name recorded when reading) selects a module
    /// explicitly. Without one, the module called `main` is used, and
    /// failing that the last declared module.
    pub fn entry_module(&self, name: Option<&str>) -> Option<&Module> {
        match name.or(self.main_module.as_deref()) {
            Some(name) => self.find_module(name),
            None => self.find_module("main").or_else(|| self.modules.last()),
        }
    }
}

/// A module declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub parameters: Vec<Signal>,
    /// `wire` and `state` declarations.
    pub locals: Vec<Signal>,
    pub statements: Vec<Statement>,
    pub position: Position,
}

impl Module {
    /// Find a parameter or local signal by name.
    pub fn find_signal(&self, name: &str) -> Option<&Signal> {
        self.parameters
            .iter()
            .chain(self.locals.iter())
            .find(|s| s.name == name)
    }

    /// Parameters followed by locals.
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.parameters.iter().chain(self.locals.iter())
    }
}

/// Kind of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    In,
    Out,
    Inout,
    Wire,
    State,
}

impl SignalKind {
    /// Whether signals of this kind are module parameters.
    pub fn is_parameter(self) -> bool {
        matches!(self, SignalKind::In | SignalKind::Out | SignalKind::Inout)
    }

    /// Whether statements may modify signals of this kind.
    pub fn is_assignable(self) -> bool {
        !matches!(self, SignalKind::In)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::In => "in",
            SignalKind::Out => "out",
            SignalKind::Inout => "inout",
            SignalKind::Wire => "wire",
            SignalKind::State => "state",
        };
        f.write_str(s)
    }
}

/// A declared signal: `name[d0][d1]...(width)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub kind: SignalKind,
    /// Array dimensions, outermost first. Empty for scalars.
    pub dimensions: Vec<u32>,
    pub width: u32,
    pub position: Position,
}

impl Signal {
    /// Number of array elements.
    pub fn num_elements(&self) -> u64 {
        self.dimensions.iter().map(|&d| u64::from(d)).product()
    }

    /// Number of circuit lines the signal occupies.
    pub fn num_lines(&self) -> u64 {
        self.num_elements() * u64::from(self.width)
    }
}

/// Binary expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Xor,
    Mul,
    Div,
    Mod,
    LogicalAnd,
    LogicalOr,
    BitAnd,
    BitOr,
    Lt,
    Gt,
    Eq,
    NotEq,
    LtEq,
    GtEq,
}

impl BinOp {
    /// Whether the operator yields a single bit.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            BinOp::LogicalAnd
                | BinOp::LogicalOr
                | BinOp::Lt
                | BinOp::Gt
                | BinOp::Eq
                | BinOp::NotEq
                | BinOp::LtEq
                | BinOp::GtEq
        )
    }

    /// Evaluate on compile-time values.
    ///
    /// Returns `None` on overflow, underflow or division by zero.
    pub fn evaluate(self, lhs: u64, rhs: u64) -> Option<u64> {
        Some(match self {
            BinOp::Add => lhs.checked_add(rhs)?,
            BinOp::Sub => lhs.checked_sub(rhs)?,
            BinOp::Xor => lhs ^ rhs,
            BinOp::Mul => lhs.checked_mul(rhs)?,
            BinOp::Div => lhs.checked_div(rhs)?,
            BinOp::Mod => lhs.checked_rem(rhs)?,
            BinOp::LogicalAnd => u64::from(lhs != 0 && rhs != 0),
            BinOp::LogicalOr => u64::from(lhs != 0 || rhs != 0),
            BinOp::BitAnd => lhs & rhs,
            BinOp::BitOr => lhs | rhs,
            BinOp::Lt => u64::from(lhs < rhs),
            BinOp::Gt => u64::from(lhs > rhs),
            BinOp::Eq => u64::from(lhs == rhs),
            BinOp::NotEq => u64::from(lhs != rhs),
            BinOp::LtEq => u64::from(lhs <= rhs),
            BinOp::GtEq => u64::from(lhs >= rhs),
        })
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Xor => "^",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::LogicalAnd => "&&",
            BinOp::LogicalOr => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Eq => "=",
            BinOp::NotEq => "!=",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
        };
        f.write_str(s)
    }
}

/// Shift operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftOp {
    Left,
    Right,
}

/// Unary expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!e`, defined on single bits.
    LogicalNot,
    /// `~e`
    BitwiseNot,
}

/// A compile-time number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Number {
    /// Integer literal.
    Literal(u64),
    /// `#x`: declared width of signal `x`.
    Width(String),
    /// `$i`: current value of loop variable `i`.
    LoopVariable(String),
    /// `(n op m)`
    Binary {
        lhs: Box<Number>,
        op: BinOp,
        rhs: Box<Number>,
    },
}

/// Name lookups needed to evaluate a [`Number`].
pub trait NumberContext {
    /// Declared width of a signal.
    fn signal_width(&self, name: &str) -> Option<u64>;
    /// Current value of a loop variable.
    fn loop_variable(&self, name: &str) -> Option<u64>;
}

/// Why a [`Number`] could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    UnknownSignal(String),
    UnknownLoopVariable(String),
    /// Overflow, underflow or division by zero in `(n op m)`.
    Arithmetic(String),
}

impl fmt::Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberError::UnknownSignal(name) => write!(f, "unknown signal '{name}' in '#{name}'"),
            NumberError::UnknownLoopVariable(name) => write!(f, "unknown loop variable '${name}'"),
            NumberError::Arithmetic(expr) => write!(f, "cannot evaluate {expr}"),
        }
    }
}

impl Number {
    /// Evaluate the number.
    pub fn evaluate(&self, ctx: &impl NumberContext) -> Result<u64, NumberError> {
        match self {
            Number::Literal(v) => Ok(*v),
            Number::Width(name) => ctx
                .signal_width(name)
                .ok_or_else(|| NumberError::UnknownSignal(name.clone())),
            Number::LoopVariable(name) => ctx
                .loop_variable(name)
                .ok_or_else(|| NumberError::UnknownLoopVariable(name.clone())),
            Number::Binary { lhs, op, rhs } => {
                let l = lhs.evaluate(ctx)?;
                let r = rhs.evaluate(ctx)?;
                op.evaluate(l, r)
                    .ok_or_else(|| NumberError::Arithmetic(format!("({l} {op} {r})")))
            }
        }
    }

    /// Whether the number is a plain literal.
    pub fn as_literal(&self) -> Option<u64> {
        match self {
            Number::Literal(v) => Some(*v),
            _ => None,
        }
    }

    /// Loop variables the number refers to.
    pub fn loop_variables(&self, out: &mut Vec<String>) {
        match self {
            Number::LoopVariable(name) => out.push(name.clone()),
            Number::Binary { lhs, rhs, .. } => {
                lhs.loop_variables(out);
                rhs.loop_variables(out);
            }
            Number::Literal(_) | Number::Width(_) => {}
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Literal(v) => write!(f, "{v}"),
            Number::Width(name) => write!(f, "#{name}"),
            Number::LoopVariable(name) => write!(f, "${name}"),
            Number::Binary { lhs, op, rhs } => write!(f, "({lhs} {op} {rhs})"),
        }
    }
}

/// Bit selection on an access: `.n` or `.n:m`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRange {
    pub start: Number,
    /// Inclusive end. `None` selects the single bit `start`.
    pub end: Option<Number>,
}

/// A reference to (part of) a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableAccess {
    pub name: String,
    /// One index expression per array dimension.
    pub indices: Vec<Expression>,
    pub range: Option<BitRange>,
    pub position: Position,
}

impl VariableAccess {
    /// Access to a whole scalar signal.
    pub fn whole(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indices: Vec::new(),
            range: None,
            position: Position::default(),
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    Number(Number),
    Access(VariableAccess),
    Binary {
        lhs: Box<Expression>,
        op: BinOp,
        rhs: Box<Expression>,
    },
    /// Shift by a compile-time amount.
    Shift {
        operand: Box<Expression>,
        op: ShiftOp,
        amount: Number,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
}

impl Expression {
    /// Every variable access in the expression, outermost first.
    pub fn accesses(&self) -> Vec<&VariableAccess> {
        let mut out = Vec::new();
        self.collect_accesses(&mut out);
        out
    }

    fn collect_accesses<'a>(&'a self, out: &mut Vec<&'a VariableAccess>) {
        match self {
            Expression::Number(_) => {}
            Expression::Access(access) => {
                out.push(access);
                for index in &access.indices {
                    index.collect_accesses(out);
                }
            }
            Expression::Binary { lhs, rhs, .. } => {
                lhs.collect_accesses(out);
                rhs.collect_accesses(out);
            }
            Expression::Shift { operand, .. } | Expression::Unary { operand, .. } => {
                operand.collect_accesses(out);
            }
        }
    }
}

/// Operators of assignment statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `^=`
    Xor,
}

impl AssignOp {
    /// The operator undoing this one.
    pub fn inverse(self) -> Self {
        match self {
            AssignOp::Add => AssignOp::Sub,
            AssignOp::Sub => AssignOp::Add,
            AssignOp::Xor => AssignOp::Xor,
        }
    }
}

/// Operators of unary statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryStatementOp {
    /// `~=`
    Invert,
    /// `++=`
    Increment,
    /// `--=`
    Decrement,
}

/// A statement with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub position: Position,
}

impl Statement {
    pub fn new(kind: StatementKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// The statement forms of SyReC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `a <=> b`
    Swap {
        lhs: VariableAccess,
        rhs: VariableAccess,
    },
    /// `~= a`, `++= a`, `--= a`
    Unary {
        op: UnaryStatementOp,
        target: VariableAccess,
    },
    /// `a += e`, `a -= e`, `a ^= e`
    Assign {
        target: VariableAccess,
        op: AssignOp,
        value: Expression,
    },
    /// `if e then s else s fi e'`
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Vec<Statement>,
        fi_condition: Expression,
    },
    /// `for $i = from to to step s do body rof`
    For {
        variable: Option<String>,
        from: Option<Number>,
        to: Number,
        step: Option<Number>,
        /// `step -s`: iterate downwards.
        negative_step: bool,
        body: Vec<Statement>,
    },
    /// `call m(a, b)`
    Call { module: String, arguments: Vec<String> },
    /// `uncall m(a, b)`
    Uncall { module: String, arguments: Vec<String> },
    /// `skip`
    Skip,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Env;

    impl NumberContext for Env {
        fn signal_width(&self, name: &str) -> Option<u64> {
            (name == "a").then_some(4)
        }

        fn loop_variable(&self, name: &str) -> Option<u64> {
            (name == "i").then_some(2)
        }
    }

    fn signal(name: &str, kind: SignalKind) -> Signal {
        Signal {
            name: name.into(),
            kind,
            dimensions: vec![],
            width: 2,
            position: Position::default(),
        }
    }

    #[test]
    fn test_number_evaluation() {
        let n = Number::Binary {
            lhs: Box::new(Number::Width("a".into())),
            op: BinOp::Sub,
            rhs: Box::new(Number::LoopVariable("i".into())),
        };
        assert_eq!(n.evaluate(&Env), Ok(2));
        assert_eq!(n.to_string(), "(#a - $i)");

        let bad = Number::Binary {
            lhs: Box::new(Number::Literal(1)),
            op: BinOp::Div,
            rhs: Box::new(Number::Literal(0)),
        };
        assert!(matches!(bad.evaluate(&Env), Err(NumberError::Arithmetic(_))));
        assert_eq!(
            Number::Width("b".into()).evaluate(&Env),
            Err(NumberError::UnknownSignal("b".into()))
        );
    }

    #[test]
    fn test_entry_module_resolution() {
        let module = |name: &str| Module {
            name: name.into(),
            parameters: vec![],
            locals: vec![],
            statements: vec![],
            position: Position::default(),
        };
        let program = Program::new(vec![module("adder"), module("top")]);
        assert_eq!(program.entry_module(None).unwrap().name, "top");
        assert_eq!(program.entry_module(Some("adder")).unwrap().name, "adder");
        assert!(program.entry_module(Some("missing")).is_none());

        let program = Program::new(vec![module("main"), module("top")]);
        assert_eq!(program.entry_module(None).unwrap().name, "main");
    }

    #[test]
    fn test_signal_geometry() {
        let mut s = signal("x", SignalKind::Wire);
        s.dimensions = vec![2, 3];
        s.width = 4;
        assert_eq!(s.num_elements(), 6);
        assert_eq!(s.num_lines(), 24);
        assert!(!SignalKind::In.is_assignable());
        assert!(SignalKind::Inout.is_parameter());
        assert!(!signal("y", SignalKind::State).kind.is_parameter());
    }

    #[test]
    fn test_binop_evaluation() {
        assert_eq!(BinOp::Sub.evaluate(1, 2), None);
        assert_eq!(BinOp::LtEq.evaluate(2, 2), Some(1));
        assert_eq!(AssignOp::Add.inverse(), AssignOp::Sub);
        assert_eq!(AssignOp::Xor.inverse(), AssignOp::Xor);
    }
}
