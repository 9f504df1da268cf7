//! Semantic analysis: name resolution and static type checking.
//!
//! The checker walks the AST depth-first and stops at the first violation.
//! Types must match exactly; there is no implicit numeric promotion and no
//! array value semantics (arrays are only reachable through `name[index]`).
//!
//! Scoping is two-level: the global frame holds the program's variables,
//! and each routine body gets one child frame with its parameters, its own
//! name (functions only, bound to the return type) and its locals.
//! Routine signatures live in separate tables that are filled before any
//! body is checked, so routines may call each other in any order.

use std::collections::HashMap;

use log::trace;

use crate::ast::*;
use crate::builtins::find_builtin;
use crate::error::{CoreError, CoreResult};
use crate::scope::ScopeStack;
use crate::span::Location;
use crate::types::Type;

/// Public entry point: validate a parsed program.
pub fn check_program(program: &Program) -> CoreResult<()> {
    let mut checker = TypeChecker::new();
    checker.check_program(program)
}

#[derive(Debug, Clone)]
struct FunctionSignature {
    params: Vec<Type>,
    return_type: Type,
}

/// Function names Go treats specially at package level: `main` is the
/// entry point and `init` runs before it and cannot be referenced.
const GO_PACKAGE_RESERVED: &[&str] = &["main", "init"];

fn check_package_name(name: &str, location: Location) -> CoreResult<()> {
    if GO_PACKAGE_RESERVED.contains(&name) {
        return Err(CoreError::name(
            format!("'{name}' is reserved by Go at package level"),
            location,
        ));
    }
    Ok(())
}

struct TypeChecker {
    scopes: ScopeStack<Type>,
    functions: HashMap<String, FunctionSignature>,
    procedures: HashMap<String, Vec<Type>>,
    /// Name of the function whose body is being checked.
    current_function: Option<String>,
}

impl TypeChecker {
    fn new() -> Self {
        TypeChecker {
            scopes: ScopeStack::new(),
            functions: HashMap::new(),
            procedures: HashMap::new(),
            current_function: None,
        }
    }

    /// Run `f` inside a fresh scope frame. The frame is popped on every
    /// exit path, including errors.
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> CoreResult<T>) -> CoreResult<T> {
        self.scopes.push();
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn check_program(&mut self, program: &Program) -> CoreResult<()> {
        for global in &program.globals {
            check_package_name(&global.name, global.location)?;
            self.declare(global)?;
        }

        for routine in &program.routines {
            self.register_signature(routine)?;
        }

        for routine in &program.routines {
            self.check_routine(routine)?;
        }

        self.check_block(&program.main)
    }

    fn declare(&mut self, decl: &VarDecl) -> CoreResult<()> {
        if self.scopes.declare(decl.name.as_str(), decl.ty.clone()) {
            Ok(())
        } else {
            Err(CoreError::name(
                format!("'{}' is already declared in this scope", decl.name),
                decl.location,
            ))
        }
    }

    fn register_signature(&mut self, routine: &Routine) -> CoreResult<()> {
        let name = routine.name();
        let location = routine.location();

        check_package_name(name, location)?;
        if self.functions.contains_key(name) || self.procedures.contains_key(name) {
            return Err(CoreError::name(
                format!("routine '{name}' is already declared"),
                location,
            ));
        }
        if self.scopes.lookup(name).is_some() {
            return Err(CoreError::name(
                format!("routine '{name}' has the same name as a global variable"),
                location,
            ));
        }

        let params = routine.params().iter().map(|p| p.ty.clone()).collect();
        match routine {
            Routine::Function(f) => {
                self.functions.insert(
                    name.to_string(),
                    FunctionSignature {
                        params,
                        return_type: f.return_type.clone(),
                    },
                );
            }
            Routine::Procedure(_) => {
                self.procedures.insert(name.to_string(), params);
            }
        }
        Ok(())
    }

    fn check_routine(&mut self, routine: &Routine) -> CoreResult<()> {
        trace!("checking routine {}", routine.name());
        match routine {
            Routine::Function(f) => {
                self.current_function = Some(f.name.clone());
                let result = self.with_scope(|checker| {
                    for param in &f.params {
                        checker.declare(param)?;
                    }
                    checker.declare(&VarDecl {
                        name: f.name.clone(),
                        ty: f.return_type.clone(),
                        location: f.location,
                    })?;
                    for local in &f.locals {
                        checker.declare(local)?;
                    }
                    checker.check_block(&f.body)
                });
                self.current_function = None;
                result
            }
            Routine::Procedure(p) => self.with_scope(|checker| {
                for param in &p.params {
                    checker.declare(param)?;
                }
                for local in &p.locals {
                    checker.declare(local)?;
                }
                checker.check_block(&p.body)
            }),
        }
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    fn check_block(&mut self, block: &Block) -> CoreResult<()> {
        for stmt in &block.statements {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> CoreResult<()> {
        match stmt {
            Stmt::Assign {
                target,
                value,
                location,
            } => self.check_assign(target, value, *location),
            Stmt::ProcedureCall(call) => self.check_procedure_call(call),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.expect_condition(condition, "if")?;
                self.check_block(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_block(else_branch)?;
                }
                Ok(())
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.expect_condition(condition, "while")?;
                self.check_block(body)
            }
            Stmt::DoWhile {
                body, condition, ..
            } => {
                self.check_block(body)?;
                self.expect_condition(condition, "do-while")
            }
            Stmt::RepeatUntil {
                body, condition, ..
            } => {
                self.check_block(body)?;
                self.expect_condition(condition, "repeat-until")
            }
            Stmt::For {
                variable,
                start,
                end,
                body,
                ..
            } => {
                let ty = self.scopes.lookup(&variable.name).cloned().ok_or_else(|| {
                    CoreError::name(
                        format!("undeclared loop variable '{}'", variable.name),
                        variable.location,
                    )
                })?;
                if ty != Type::Integer {
                    return Err(CoreError::type_error(
                        format!("loop variable '{}' must be integer, found {ty}", variable.name),
                        variable.location,
                    ));
                }
                for bound in [start, end] {
                    let bound_ty = self.expr_type(bound)?;
                    if bound_ty != Type::Integer {
                        return Err(CoreError::type_error(
                            format!("for-loop bound must be integer, found {bound_ty}"),
                            bound.location(),
                        ));
                    }
                }
                self.check_block(body)
            }
            Stmt::Case {
                scrutinee,
                arms,
                default,
                ..
            } => {
                let scrutinee_ty = self.expr_type(scrutinee)?;
                for arm in arms {
                    for label in &arm.labels {
                        let label_ty = self.expr_type(label)?;
                        if label_ty != scrutinee_ty {
                            return Err(CoreError::type_error(
                                format!(
                                    "case label of type {label_ty} does not match selector of type {scrutinee_ty}"
                                ),
                                label.location(),
                            ));
                        }
                    }
                    self.check_block(&arm.body)?;
                }
                if let Some(default) = default {
                    self.check_block(default)?;
                }
                Ok(())
            }
            Stmt::Block(block) => self.check_block(block),
        }
    }

    fn check_assign(&mut self, target: &LValue, value: &Expr, location: Location) -> CoreResult<()> {
        let target_ty = match target {
            LValue::Variable(ident) => {
                let ty = self.scopes.lookup(&ident.name).cloned().ok_or_else(|| {
                    CoreError::name(
                        format!("undeclared variable '{}'", ident.name),
                        ident.location,
                    )
                })?;
                if ty.is_array() {
                    return Err(CoreError::type_error(
                        format!("cannot assign to array '{}' as a whole", ident.name),
                        ident.location,
                    ));
                }
                ty
            }
            LValue::Element(access) => self.array_access_type(access)?,
        };

        let value_ty = self.expr_type(value)?;
        if value_ty != target_ty {
            return Err(CoreError::type_error(
                format!(
                    "cannot assign {value_ty} to '{}' of type {target_ty}",
                    target.name()
                ),
                location,
            ));
        }
        Ok(())
    }

    fn check_procedure_call(&mut self, call: &Call) -> CoreResult<()> {
        if find_builtin(&call.name).is_some() {
            for arg in &call.args {
                self.expr_type(arg)?;
            }
            return Ok(());
        }

        self.reject_shadowed_callee(call)?;
        if let Some(params) = self.procedures.get(&call.name).cloned() {
            return self.check_arguments(call, &params);
        }
        if self.functions.contains_key(&call.name) {
            return Err(CoreError::type_error(
                format!("function '{}' cannot be called as a statement", call.name),
                call.location,
            ));
        }
        Err(CoreError::name(
            format!("undeclared procedure '{}'", call.name),
            call.location,
        ))
    }

    fn expect_condition(&mut self, condition: &Expr, construct: &str) -> CoreResult<()> {
        let ty = self.expr_type(condition)?;
        if ty != Type::Boolean {
            return Err(CoreError::type_error(
                format!("{construct} condition must be boolean, found {ty}"),
                condition.location(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------

    fn expr_type(&mut self, expr: &Expr) -> CoreResult<Type> {
        match expr {
            Expr::Literal(literal, _) => Ok(match literal {
                Literal::Integer(_) => Type::Integer,
                Literal::Real(_) => Type::Real,
                Literal::Str(_) => Type::String,
                Literal::Char(_) => Type::Char,
                Literal::Boolean(_) => Type::Boolean,
            }),
            Expr::Variable(ident) => self.variable_type(ident),
            Expr::ArrayAccess(access) => self.array_access_type(access),
            Expr::FunctionCall(call) => self.function_call_type(call),
            Expr::Unary {
                op,
                operand,
                location,
            } => {
                let ty = self.expr_type(operand)?;
                let ok = match op {
                    UnaryOp::Not => ty == Type::Boolean,
                    UnaryOp::Negate => ty.is_numeric(),
                };
                if !ok {
                    return Err(CoreError::type_error(
                        format!("operator '{}' cannot be applied to {ty}", op.symbol()),
                        *location,
                    ));
                }
                Ok(ty)
            }
            Expr::Binary {
                op,
                left,
                right,
                location,
            } => {
                let left_ty = self.expr_type(left)?;
                let right_ty = self.expr_type(right)?;
                binary_result(*op, &left_ty, &right_ty).ok_or_else(|| {
                    CoreError::type_error(
                        format!(
                            "operator '{}' cannot be applied to {left_ty} and {right_ty}",
                            op.symbol()
                        ),
                        *location,
                    )
                })
            }
        }
    }

    fn variable_type(&self, ident: &Ident) -> CoreResult<Type> {
        if self.current_function.as_deref() == Some(ident.name.as_str()) {
            return Err(CoreError::type_error(
                format!(
                    "the result of function '{}' can only be assigned, not read",
                    ident.name
                ),
                ident.location,
            ));
        }

        let ty = self.scopes.lookup(&ident.name).ok_or_else(|| {
            CoreError::name(
                format!("undeclared variable '{}'", ident.name),
                ident.location,
            )
        })?;
        if ty.is_array() {
            return Err(CoreError::type_error(
                format!("array '{}' can only be used through an index", ident.name),
                ident.location,
            ));
        }
        Ok(ty.clone())
    }

    fn array_access_type(&mut self, access: &ArrayAccess) -> CoreResult<Type> {
        let ty = self.scopes.lookup(&access.name).cloned().ok_or_else(|| {
            CoreError::name(
                format!("undeclared array '{}'", access.name),
                access.location,
            )
        })?;
        let Some(elem) = ty.element().cloned() else {
            return Err(CoreError::type_error(
                format!("'{}' of type {ty} is not an array", access.name),
                access.location,
            ));
        };

        let index_ty = self.expr_type(&access.index)?;
        if index_ty != Type::Integer {
            return Err(CoreError::type_error(
                format!("array index must be integer, found {index_ty}"),
                access.index.location(),
            ));
        }
        Ok(elem)
    }

    fn function_call_type(&mut self, call: &Call) -> CoreResult<Type> {
        self.reject_shadowed_callee(call)?;
        if let Some(signature) = self.functions.get(&call.name).cloned() {
            self.check_arguments(call, &signature.params)?;
            return Ok(signature.return_type);
        }
        if self.procedures.contains_key(&call.name) {
            return Err(CoreError::type_error(
                format!("procedure '{}' does not return a value", call.name),
                call.location,
            ));
        }
        Err(CoreError::name(
            format!("undeclared function '{}'", call.name),
            call.location,
        ))
    }

    /// A parameter or local with the callee's name hides the routine.
    /// A function's own name inside its body still refers to the function.
    fn reject_shadowed_callee(&self, call: &Call) -> CoreResult<()> {
        let own_name = self.current_function.as_deref() == Some(call.name.as_str());
        if !own_name && self.scopes.lookup(&call.name).is_some() {
            return Err(CoreError::type_error(
                format!("'{}' is a variable, not a routine", call.name),
                call.location,
            ));
        }
        Ok(())
    }

    fn check_arguments(&mut self, call: &Call, params: &[Type]) -> CoreResult<()> {
        if call.args.len() != params.len() {
            return Err(CoreError::type_error(
                format!(
                    "'{}' expects {} argument(s), found {}",
                    call.name,
                    params.len(),
                    call.args.len()
                ),
                call.location,
            ));
        }
        for (position, (arg, param)) in call.args.iter().zip(params).enumerate() {
            let arg_ty = self.expr_type(arg)?;
            if arg_ty != *param {
                return Err(CoreError::type_error(
                    format!(
                        "argument {} of '{}' must be {param}, found {arg_ty}",
                        position + 1,
                        call.name
                    ),
                    arg.location(),
                ));
            }
        }
        Ok(())
    }
}

/// Result type of a binary operator, or `None` if the operands are invalid.
fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
    if left != right {
        return None;
    }
    match op {
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
            (*left == Type::Boolean).then_some(Type::Boolean)
        }
        BinaryOp::IntDiv | BinaryOp::Mod => (*left == Type::Integer).then_some(Type::Integer),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Divide => {
            left.is_numeric().then(|| left.clone())
        }
        BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::Less
        | BinaryOp::LessEq
        | BinaryOp::Greater
        | BinaryOp::GreaterEq => left.is_numeric().then_some(Type::Boolean),
    }
}
