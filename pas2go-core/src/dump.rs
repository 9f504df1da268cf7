//! Human-readable views of the token stream and the syntax tree.
//!
//! These are inspection aids for the command-line driver; nothing in the
//! pipeline depends on their exact format. The tree view indents two
//! spaces per level.

use crate::ast::*;
use crate::lexer::Token;

/// One token per line: location, kind and source text.
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let location = token.location.to_string();
        let kind = format!("{:?}", token.kind);
        let line = format!("{location:<8}{kind:<14}{}", token.lexeme);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Indented tree view of a parsed program.
pub fn dump_ast(program: &Program) -> String {
    let mut dumper = TreeDumper { out: String::new() };
    dumper.program(program);
    dumper.out
}

struct TreeDumper {
    out: String,
}

impl TreeDumper {
    fn line(&mut self, level: usize, text: impl AsRef<str>) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn program(&mut self, program: &Program) {
        if !program.globals.is_empty() {
            self.line(0, "VarDeclaration:");
            self.declarations(&program.globals, 1);
        }
        for routine in &program.routines {
            self.routine(routine);
        }
        self.line(0, "MainBlock:");
        self.statements(&program.main, 1);
    }

    fn declarations(&mut self, decls: &[VarDecl], level: usize) {
        for decl in decls {
            self.line(level, format!("{} : {}", decl.name, decl.ty));
        }
    }

    fn routine(&mut self, routine: &Routine) {
        let (locals, body) = match routine {
            Routine::Function(f) => {
                self.line(0, format!("Function: {}", f.name));
                (&f.locals, &f.body)
            }
            Routine::Procedure(p) => {
                self.line(0, format!("Procedure: {}", p.name));
                (&p.locals, &p.body)
            }
        };
        if !routine.params().is_empty() {
            self.line(1, "Params:");
            self.declarations(routine.params(), 2);
        }
        if let Routine::Function(f) = routine {
            self.line(1, format!("Return: {}", f.return_type));
        }
        if !locals.is_empty() {
            self.line(1, "Locals:");
            self.declarations(locals, 2);
        }
        self.line(1, "Body:");
        self.statements(body, 2);
    }

    fn statements(&mut self, block: &Block, level: usize) {
        for stmt in &block.statements {
            self.stmt(stmt, level);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, level: usize) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                self.line(level, "Assign:");
                match target {
                    LValue::Variable(ident) => self.line(level + 1, format!("Value: {}", ident.name)),
                    LValue::Element(access) => self.array_access(access, level + 1),
                }
                self.expr(value, level + 1);
            }
            Stmt::ProcedureCall(call) => self.call("ProcedureCall", call, level),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.line(level, "If:");
                self.expr(condition, level + 1);
                self.line(level, "Then:");
                self.statements(then_branch, level + 2);
                if let Some(else_branch) = else_branch {
                    self.line(level, "Else:");
                    self.statements(else_branch, level + 2);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.line(level, "While:");
                self.expr(condition, level + 1);
                self.line(level, "Body:");
                self.statements(body, level + 2);
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                self.line(level, "DoWhile:");
                self.line(level + 1, "Body:");
                self.statements(body, level + 2);
                self.line(level + 1, "While:");
                self.expr(condition, level + 2);
            }
            Stmt::RepeatUntil {
                body, condition, ..
            } => {
                self.line(level, "RepeatUntil:");
                self.line(level + 1, "Body:");
                self.statements(body, level + 2);
                self.line(level + 1, "Until:");
                self.expr(condition, level + 2);
            }
            Stmt::For {
                variable,
                start,
                end,
                direction,
                body,
                ..
            } => {
                let direction = match direction {
                    ForDirection::Up => "to",
                    ForDirection::Down => "downto",
                };
                self.line(level, format!("For: {} {direction}", variable.name));
                self.line(level + 1, "From:");
                self.expr(start, level + 2);
                self.line(level + 1, "To:");
                self.expr(end, level + 2);
                self.line(level + 1, "Body:");
                self.statements(body, level + 2);
            }
            Stmt::Case {
                scrutinee,
                arms,
                default,
                ..
            } => {
                self.line(level, "Case:");
                self.expr(scrutinee, level + 1);
                for arm in arms {
                    self.line(level + 1, "When:");
                    for label in &arm.labels {
                        self.expr(label, level + 2);
                    }
                    self.line(level + 1, "Do:");
                    self.statements(&arm.body, level + 2);
                }
                if let Some(default) = default {
                    self.line(level + 1, "Else:");
                    self.statements(default, level + 2);
                }
            }
            Stmt::Block(block) => {
                self.line(level, "Block:");
                self.statements(block, level + 1);
            }
        }
    }

    fn expr(&mut self, expr: &Expr, level: usize) {
        match expr {
            Expr::Literal(literal, _) => {
                let text = match literal {
                    Literal::Integer(value) => value.to_string(),
                    Literal::Real(text) => text.clone(),
                    Literal::Str(text) => format!("'{text}'"),
                    Literal::Char(ch) => format!("'{ch}'"),
                    Literal::Boolean(value) => value.to_string(),
                };
                self.line(level, format!("Value: {text}"));
            }
            Expr::Variable(ident) => self.line(level, format!("Value: {}", ident.name)),
            Expr::ArrayAccess(access) => self.array_access(access, level),
            Expr::FunctionCall(call) => self.call("FunctionCall", call, level),
            Expr::Unary { op, operand, .. } => {
                self.line(level, format!("UnaryOp: {}", op.symbol()));
                self.expr(operand, level + 1);
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                self.line(level, format!("BinOp: {}", op.symbol()));
                self.expr(left, level + 1);
                self.expr(right, level + 1);
            }
        }
    }

    fn array_access(&mut self, access: &ArrayAccess, level: usize) {
        self.line(level, format!("ArrayAccess: {}", access.name));
        self.expr(&access.index, level + 1);
    }

    fn call(&mut self, label: &str, call: &Call, level: usize) {
        self.line(level, format!("{label}: {}", call.name));
        for arg in &call.args {
            self.expr(arg, level + 1);
        }
    }
}
