//! Syntax tree produced by the parser.
//!
//! The tree is a closed set of enums and structs. It is built once by the
//! parser and only read afterwards: the analyzer and the generator walk it
//! by shared reference and every consumer matches exhaustively.

use crate::span::Location;
use crate::types::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub globals: Vec<VarDecl>,
    pub routines: Vec<Routine>,
    pub main: Block,
    pub location: Location,
}

/// One declared name, used for variables and parameters alike.
///
/// `a, b: integer;` produces two `VarDecl`s in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Routine {
    Function(FunctionDecl),
    Procedure(ProcedureDecl),
}

impl Routine {
    pub fn name(&self) -> &str {
        match self {
            Routine::Function(f) => &f.name,
            Routine::Procedure(p) => &p.name,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Routine::Function(f) => f.location,
            Routine::Procedure(p) => p.location,
        }
    }

    pub fn params(&self) -> &[VarDecl] {
        match self {
            Routine::Function(f) => &f.params,
            Routine::Procedure(p) => &p.params,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<VarDecl>,
    pub return_type: Type,
    pub locals: Vec<VarDecl>,
    pub body: Block,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDecl {
    pub name: String,
    pub params: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub body: Block,
    pub location: Location,
}

/// `begin ... end`, or the single statement of an unbracketed loop or
/// branch body.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForDirection {
    /// `to`: ascending, the generator emits `<=` and `++`.
    Up,
    /// `downto`: descending, the generator emits `>=` and `--`.
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseArm {
    pub labels: Vec<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign {
        target: LValue,
        value: Expr,
        location: Location,
    },
    ProcedureCall(Call),
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
        location: Location,
    },
    While {
        condition: Expr,
        body: Block,
        location: Location,
    },
    DoWhile {
        body: Block,
        condition: Expr,
        location: Location,
    },
    RepeatUntil {
        body: Block,
        condition: Expr,
        location: Location,
    },
    For {
        variable: Ident,
        start: Expr,
        end: Expr,
        direction: ForDirection,
        body: Block,
        location: Location,
    },
    Case {
        scrutinee: Expr,
        arms: Vec<CaseArm>,
        default: Option<Block>,
        location: Location,
    },
    Block(Block),
}

impl Stmt {
    pub fn location(&self) -> Location {
        match self {
            Stmt::ProcedureCall(call) => call.location,
            Stmt::Block(block) => block.location,
            Stmt::Assign { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::RepeatUntil { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Case { location, .. } => *location,
        }
    }
}

/// Assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    Variable(Ident),
    Element(ArrayAccess),
}

impl LValue {
    pub fn name(&self) -> &str {
        match self {
            LValue::Variable(ident) => &ident.name,
            LValue::Element(access) => &access.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub location: Location,
}

/// `name[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub name: String,
    pub index: Box<Expr>,
    pub location: Location,
}

/// A procedure or function call; the statement/expression position decides
/// which one it is.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    /// Kept as written so the generator can emit it verbatim.
    Real(String),
    Str(String),
    Char(char),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Location),
    Variable(Ident),
    ArrayAccess(ArrayAccess),
    FunctionCall(Call),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: Location,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: Location,
    },
}

impl Expr {
    pub fn location(&self) -> Location {
        match self {
            Expr::Literal(_, location) => *location,
            Expr::Variable(ident) => ident.location,
            Expr::ArrayAccess(access) => access.location,
            Expr::FunctionCall(call) => call.location,
            Expr::Unary { location, .. } | Expr::Binary { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Negate => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Divide,
    IntDiv,
    Mod,
    /// `=` or `==`
    Equal,
    /// `<>` or `!=`
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    /// Source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Divide => "/",
            BinaryOp::IntDiv => "div",
            BinaryOp::Mod => "mod",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
        }
    }

    /// Binding strength in the source grammar; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or | BinaryOp::Xor => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEq
            | BinaryOp::Greater
            | BinaryOp::GreaterEq => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Divide | BinaryOp::IntDiv | BinaryOp::Mod => 5,
        }
    }
}
