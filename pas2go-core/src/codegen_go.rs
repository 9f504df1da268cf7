//! Go code generator.
//!
//! Turns a validated [`Program`] into Go source text. The generator trusts
//! the analyzer and performs no checks of its own; every function here is
//! total over well-typed trees.
//!
//! Array indices are renormalized to Go's zero-based arrays with the
//! declared lower bound, which is tracked in a scope stack that mirrors the
//! analyzer's frames (globals, then one frame per routine body).

use std::collections::BTreeSet;

use crate::ast::*;
use crate::builtins::find_builtin;
use crate::scope::ScopeStack;
use crate::types::Type;

/// Generate the complete Go translation of `program`.
pub fn generate(program: &Program) -> String {
    let mut generator = GoGenerator::new();
    generator.program(program);

    let mut out = String::from("package main\n\n");
    match generator.imports.len() {
        0 => {}
        1 => {
            for import in &generator.imports {
                out.push_str(&format!("import \"{import}\"\n\n"));
            }
        }
        _ => {
            out.push_str("import (\n");
            for import in &generator.imports {
                out.push_str(&format!("\t\"{import}\"\n"));
            }
            out.push_str(")\n\n");
        }
    }
    out.push_str(&generator.out);
    out
}

/// Go spelling of a type.
pub fn go_type(ty: &Type) -> String {
    match ty {
        Type::Integer => "int".to_string(),
        Type::Real => "float64".to_string(),
        Type::Boolean => "bool".to_string(),
        Type::Char => "rune".to_string(),
        Type::String => "string".to_string(),
        Type::Array { elem, .. } => {
            let size = ty.size().unwrap_or_default();
            format!("[{size}]{}", go_type(elem))
        }
    }
}

/// Go spelling of a binary operator.
fn go_binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Divide | BinaryOp::IntDiv => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Equal => "==",
        BinaryOp::NotEqual | BinaryOp::Xor => "!=",
        BinaryOp::Less => "<",
        BinaryOp::LessEq => "<=",
        BinaryOp::Greater => ">",
        BinaryOp::GreaterEq => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

/// Binding strength of the emitted Go operator; higher binds tighter.
fn go_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        BinaryOp::Xor
        | BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::Less
        | BinaryOp::LessEq
        | BinaryOp::Greater
        | BinaryOp::GreaterEq => 3,
        BinaryOp::Add | BinaryOp::Sub => 4,
        BinaryOp::Mul | BinaryOp::Divide | BinaryOp::IntDiv | BinaryOp::Mod => 5,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Whether `child`, an operand of `parent`, needs parentheses to keep
/// its grouping both in the source reading and in Go.
fn needs_parens(parent: BinaryOp, child: &Expr, side: Side) -> bool {
    let Expr::Binary { op: child, .. } = child else {
        return false;
    };
    let source = (child.precedence(), parent.precedence());
    let go = (go_precedence(*child), go_precedence(parent));
    match side {
        Side::Left => source.0 < source.1 || go.0 < go.1,
        Side::Right => source.0 <= source.1 || go.0 <= go.1,
    }
}

struct GoGenerator {
    out: String,
    indent: usize,
    imports: BTreeSet<&'static str>,
    /// Declared lower bound of every array in scope.
    bounds: ScopeStack<i64>,
    /// Function whose body is being emitted; assignments to its name
    /// become `return`.
    current_function: Option<String>,
}

impl GoGenerator {
    fn new() -> Self {
        GoGenerator {
            out: String::new(),
            indent: 0,
            imports: BTreeSet::new(),
            bounds: ScopeStack::new(),
            current_function: None,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank_line(&mut self) {
        self.out.push('\n');
    }

    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.bounds.push();
        let result = f(self);
        self.bounds.pop();
        result
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    fn record_bound(&mut self, decl: &VarDecl) {
        if let Some(low) = decl.ty.lower_bound() {
            // Names are unique per frame after analysis.
            let _ = self.bounds.declare(decl.name.as_str(), low);
        }
    }

    // -----------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------

    fn program(&mut self, program: &Program) {
        for global in &program.globals {
            self.record_bound(global);
            self.line(format!("var {} {}", global.name, go_type(&global.ty)));
        }
        if !program.globals.is_empty() {
            self.blank_line();
        }

        for routine in &program.routines {
            self.routine(routine);
            self.blank_line();
        }

        self.line("func main() {");
        self.indented(|g| g.block_statements(&program.main));
        self.line("}");
    }

    fn routine(&mut self, routine: &Routine) {
        let (name, params, locals, body, return_type) = match routine {
            Routine::Function(f) => (&f.name, &f.params, &f.locals, &f.body, Some(&f.return_type)),
            Routine::Procedure(p) => (&p.name, &p.params, &p.locals, &p.body, None),
        };

        let params = params
            .iter()
            .map(|p| format!("{} {}", p.name, go_type(&p.ty)))
            .collect::<Vec<_>>()
            .join(", ");
        match return_type {
            Some(ty) => self.line(format!("func {name}({params}) {} {{", go_type(ty))),
            None => self.line(format!("func {name}({params}) {{")),
        }

        self.current_function = return_type.map(|_| name.clone());
        self.with_scope(|g| {
            g.indented(|g| {
                for local in locals {
                    g.record_bound(local);
                    g.line(format!("var {} {}", local.name, go_type(&local.ty)));
                }
                g.block_statements(body);
            });
        });
        self.current_function = None;
        self.line("}");
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn block_statements(&mut self, block: &Block) {
        for stmt in &block.statements {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let value = self.expr(value);
                match target {
                    LValue::Variable(ident)
                        if self.current_function.as_deref() == Some(ident.name.as_str()) =>
                    {
                        self.line(format!("return {value}"));
                    }
                    LValue::Variable(ident) => self.line(format!("{} = {value}", ident.name)),
                    LValue::Element(access) => {
                        let target = self.array_access(access);
                        self.line(format!("{target} = {value}"));
                    }
                }
            }
            Stmt::ProcedureCall(call) => {
                let call = self.call(call);
                self.line(call);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let condition = self.expr(condition);
                self.line(format!("if {condition} {{"));
                self.indented(|g| g.block_statements(then_branch));
                if let Some(else_branch) = else_branch {
                    self.line("} else {");
                    self.indented(|g| g.block_statements(else_branch));
                }
                self.line("}");
            }
            Stmt::While {
                condition, body, ..
            } => {
                let condition = self.expr(condition);
                self.line(format!("for {condition} {{"));
                self.indented(|g| g.block_statements(body));
                self.line("}");
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                let condition = self.expr(condition);
                self.line("for {");
                self.indented(|g| {
                    g.block_statements(body);
                    g.line(format!("if !({condition}) {{"));
                    g.indented(|g| g.line("break"));
                    g.line("}");
                });
                self.line("}");
            }
            Stmt::RepeatUntil {
                body, condition, ..
            } => {
                let condition = self.expr(condition);
                self.line("for {");
                self.indented(|g| {
                    g.block_statements(body);
                    g.line(format!("if {condition} {{"));
                    g.indented(|g| g.line("break"));
                    g.line("}");
                });
                self.line("}");
            }
            Stmt::For {
                variable,
                start,
                end,
                direction,
                body,
                ..
            } => {
                let v = &variable.name;
                let start = self.expr(start);
                let end = self.expr(end);
                let (cmp, step) = match direction {
                    ForDirection::Up => ("<=", "++"),
                    ForDirection::Down => (">=", "--"),
                };
                // Assign the declared counter; `:=` would shadow it.
                self.line(format!("for {v} = {start}; {v} {cmp} {end}; {v}{step} {{"));
                self.indented(|g| g.block_statements(body));
                self.line("}");
            }
            Stmt::Case {
                scrutinee,
                arms,
                default,
                ..
            } => {
                let scrutinee = self.expr(scrutinee);
                self.line(format!("switch {scrutinee} {{"));
                for arm in arms {
                    let labels = arm
                        .labels
                        .iter()
                        .map(|label| self.expr(label))
                        .collect::<Vec<_>>()
                        .join(", ");
                    self.line(format!("case {labels}:"));
                    self.indented(|g| g.block_statements(&arm.body));
                }
                if let Some(default) = default {
                    self.line("default:");
                    self.indented(|g| g.block_statements(default));
                }
                self.line("}");
            }
            Stmt::Block(block) => {
                self.line("{");
                self.indented(|g| g.block_statements(block));
                self.line("}");
            }
        }
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal, _) => go_literal(literal),
            Expr::Variable(ident) => ident.name.clone(),
            Expr::ArrayAccess(access) => self.array_access(access),
            Expr::FunctionCall(call) => self.call(call),
            Expr::Unary { op, operand, .. } => {
                let inner = self.expr(operand);
                let wrap = match operand.as_ref() {
                    Expr::Binary { .. } => true,
                    // `- -x` would lex as a decrement in Go.
                    Expr::Unary { op: nested, .. } => {
                        *op == UnaryOp::Negate && *nested == UnaryOp::Negate
                    }
                    _ => false,
                };
                let symbol = match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Negate => "-",
                };
                if wrap {
                    format!("{symbol}({inner})")
                } else {
                    format!("{symbol}{inner}")
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let mut l = self.expr(left);
                if needs_parens(*op, left, Side::Left) {
                    l = format!("({l})");
                }
                let mut r = self.expr(right);
                if needs_parens(*op, right, Side::Right) {
                    r = format!("({r})");
                }
                format!("{l} {} {r}", go_binary_op(*op))
            }
        }
    }

    fn array_access(&mut self, access: &ArrayAccess) -> String {
        let index = self.expr(&access.index);
        let low = self.bounds.lookup(&access.name).copied().unwrap_or(0);
        match low {
            0 => format!("{}[{index}]", access.name),
            low if low > 0 => format!("{}[({index}) - {low}]", access.name),
            low => format!("{}[({index}) + {}]", access.name, low.unsigned_abs()),
        }
    }

    fn call(&mut self, call: &Call) -> String {
        let args = call
            .args
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Vec<_>>()
            .join(", ");
        match find_builtin(&call.name) {
            Some(builtin) => {
                self.imports.insert(builtin.import);
                format!("{}({args})", builtin.go_callee)
            }
            None => format!("{}({args})", call.name),
        }
    }
}

fn go_literal(literal: &Literal) -> String {
    match literal {
        Literal::Integer(value) => value.to_string(),
        Literal::Real(text) => text.clone(),
        Literal::Boolean(value) => value.to_string(),
        Literal::Str(text) => {
            let mut out = String::from("\"");
            for ch in text.chars() {
                push_escaped(&mut out, ch, '"');
            }
            out.push('"');
            out
        }
        Literal::Char(ch) => {
            let mut out = String::from("'");
            push_escaped(&mut out, *ch, '\'');
            out.push('\'');
            out
        }
    }
}

/// Append `ch` using Go escape rules for a literal delimited by `quote`.
fn push_escaped(out: &mut String, ch: char, quote: char) {
    match ch {
        '\\' => out.push_str("\\\\"),
        '\t' => out.push_str("\\t"),
        '\r' => out.push_str("\\r"),
        '\n' => out.push_str("\\n"),
        c if c == quote => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
        c => out.push(c),
    }
}
