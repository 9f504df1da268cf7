//! Recursive-descent parser.
//!
//! The parser consumes the token vector produced by [`crate::lexer::tokenize`]
//! and builds a [`Program`]. It uses one token of lookahead everywhere except
//! after an identifier, where the following token decides between a plain
//! value, an array access and a call. The first grammar violation aborts
//! parsing; no partial tree is returned.

use log::trace;

use crate::ast::*;
use crate::error::{CoreError, CoreResult};
use crate::lexer::{Token, TokenKind, tokenize};
use crate::span::Location;
use crate::types::Type;

/// Lex and parse a complete program.
pub fn parse(input: &str) -> CoreResult<Program> {
    let tokens = tokenize(input)?;
    parse_program(&tokens)
}

/// Parse a complete program from a token stream.
///
/// The stream is expected to end with [`TokenKind::Eof`]; a missing
/// terminator is treated as end of input after the last token.
pub fn parse_program(tokens: &[Token]) -> CoreResult<Program> {
    let eof_location = tokens
        .last()
        .map(|t| t.location)
        .unwrap_or_else(Location::start);
    let mut parser = Parser {
        tokens,
        position: 0,
        eof: Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            location: eof_location,
        },
    };
    parser.program()
}

/// Where a type annotation appears; arrays are only allowed in variable
/// declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypePosition {
    Variable,
    Parameter,
    ReturnType,
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    eof: Token,
}

impl<'t> Parser<'t> {
    // -----------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------

    fn program(&mut self) -> CoreResult<Program> {
        let location = self.expect(TokenKind::Program)?.location;
        let name = self.expect(TokenKind::Ident)?.lexeme;
        self.expect(TokenKind::Semi)?;

        let globals = if self.check(TokenKind::Var) {
            self.var_section()?
        } else {
            Vec::new()
        };

        let mut routines = Vec::new();
        while self.check(TokenKind::Function) || self.check(TokenKind::Procedure) {
            routines.push(self.routine()?);
        }

        let main = self.block()?;
        self.expect(TokenKind::Dot)?;
        if !self.check(TokenKind::Eof) {
            return Err(self.error_here("unexpected input after the final '.'"));
        }

        Ok(Program {
            name,
            globals,
            routines,
            main,
            location,
        })
    }

    fn var_section(&mut self) -> CoreResult<Vec<VarDecl>> {
        self.expect(TokenKind::Var)?;
        if !self.check(TokenKind::Ident) {
            return Err(self.unexpected("a variable name"));
        }

        let mut declarations = Vec::new();
        while self.check(TokenKind::Ident) {
            let names = self.name_list()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.type_annotation(TypePosition::Variable)?;
            self.expect(TokenKind::Semi)?;
            declarations.extend(names.into_iter().map(|name| VarDecl {
                name: name.name,
                ty: ty.clone(),
                location: name.location,
            }));
        }
        Ok(declarations)
    }

    /// `a, b, c`
    fn name_list(&mut self) -> CoreResult<Vec<Ident>> {
        let mut names = vec![self.ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn routine(&mut self) -> CoreResult<Routine> {
        let keyword = self.advance();
        let location = keyword.location;
        let is_function = keyword.kind == TokenKind::Function;
        let name = self.expect(TokenKind::Ident)?.lexeme;
        trace!("parsing routine {name}");
        let params = self.params()?;

        let return_type = if is_function {
            self.expect(TokenKind::Colon)?;
            Some(self.type_annotation(TypePosition::ReturnType)?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        let locals = if self.check(TokenKind::Var) {
            self.var_section()?
        } else {
            Vec::new()
        };
        let body = self.block()?;
        self.expect(TokenKind::Semi)?;

        Ok(match return_type {
            Some(return_type) => Routine::Function(FunctionDecl {
                name,
                params,
                return_type,
                locals,
                body,
                location,
            }),
            None => Routine::Procedure(ProcedureDecl {
                name,
                params,
                locals,
                body,
                location,
            }),
        })
    }

    fn params(&mut self) -> CoreResult<Vec<VarDecl>> {
        let mut params = Vec::new();
        if !self.eat(TokenKind::LParen) {
            return Ok(params);
        }
        if self.eat(TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let names = self.name_list()?;
            self.expect(TokenKind::Colon)?;
            let ty = self.type_annotation(TypePosition::Parameter)?;
            params.extend(names.into_iter().map(|name| VarDecl {
                name: name.name,
                ty: ty.clone(),
                location: name.location,
            }));
            if !self.eat(TokenKind::Semi) {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn type_annotation(&mut self, position: TypePosition) -> CoreResult<Type> {
        if !self.check(TokenKind::Array) {
            return self.scalar_type();
        }

        match position {
            TypePosition::Variable => {}
            TypePosition::Parameter => {
                return Err(self.error_here("array types are not allowed in parameter lists"));
            }
            TypePosition::ReturnType => {
                return Err(self.error_here("a function cannot return an array"));
            }
        }

        self.advance(); // array
        self.expect(TokenKind::LBracket)?;
        let low_location = self.current().location;
        let low = self.array_bound()?;
        self.expect(TokenKind::DotDot)?;
        let high = self.array_bound()?;
        self.expect(TokenKind::RBracket)?;
        self.expect(TokenKind::Of)?;
        if self.check(TokenKind::Array) {
            return Err(self.error_here("arrays of arrays are not supported"));
        }
        let elem = self.scalar_type()?;

        if low > high {
            return Err(CoreError::syntax(
                format!("array lower bound {low} is greater than upper bound {high}"),
                low_location,
            ));
        }
        Ok(Type::array(low, high, elem))
    }

    fn array_bound(&mut self) -> CoreResult<i64> {
        let negative = self.eat(TokenKind::Minus);
        let token = self.current().clone();
        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = parse_int(&token)?;
                Ok(if negative { -value } else { value })
            }
            TokenKind::RealLiteral => Err(CoreError::syntax(
                format!("array bound {} must be an integer literal", token.lexeme),
                token.location,
            )),
            _ => Err(self.unexpected("an integer array bound")),
        }
    }

    fn scalar_type(&mut self) -> CoreResult<Type> {
        let ty = match self.current().kind {
            TokenKind::Integer => Type::Integer,
            TokenKind::Real => Type::Real,
            TokenKind::Boolean => Type::Boolean,
            TokenKind::Char => Type::Char,
            TokenKind::String => Type::String,
            _ => return Err(self.unexpected("a type")),
        };
        self.advance();
        Ok(ty)
    }

    // -----------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------

    /// `begin stmt; stmt; ... end`; the `;` right before `end` is optional.
    fn block(&mut self) -> CoreResult<Block> {
        let location = self.expect(TokenKind::Begin)?.location;
        let mut statements = Vec::new();

        loop {
            if self.eat(TokenKind::End) {
                break;
            }
            statements.push(self.statement()?);
            if self.eat(TokenKind::End) {
                break;
            }
            if !self.eat(TokenKind::Semi) {
                return Err(self.unexpected("';' or 'end'"));
            }
        }

        Ok(Block {
            statements,
            location,
        })
    }

    /// Body of a branch or loop: a `begin ... end` block, or a single
    /// statement wrapped in a block.
    fn body(&mut self) -> CoreResult<Block> {
        if self.check(TokenKind::Begin) {
            return self.block();
        }
        let stmt = self.statement()?;
        Ok(Block {
            location: stmt.location(),
            statements: vec![stmt],
        })
    }

    fn statement(&mut self) -> CoreResult<Stmt> {
        match self.current().kind {
            TokenKind::Ident => {
                if self.peek_kind(1) == TokenKind::LParen {
                    let call = self.call()?;
                    return Ok(Stmt::ProcedureCall(call));
                }
                self.assignment()
            }
            TokenKind::Writeln => self.writeln(),
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Do => self.do_while_statement(),
            TokenKind::Repeat => self.repeat_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Case => self.case_statement(),
            TokenKind::Begin => Ok(Stmt::Block(self.block()?)),
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn assignment(&mut self) -> CoreResult<Stmt> {
        let target = self.lvalue()?;
        let location = self.expect(TokenKind::Assign)?.location;
        let value = self.expression()?;
        Ok(Stmt::Assign {
            target,
            value,
            location,
        })
    }

    fn lvalue(&mut self) -> CoreResult<LValue> {
        if self.peek_kind(1) == TokenKind::LBracket {
            return Ok(LValue::Element(self.array_access()?));
        }
        Ok(LValue::Variable(self.ident()?))
    }

    /// `writeln(args)`; the argument list may be omitted entirely.
    fn writeln(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let args = if self.check(TokenKind::LParen) {
            self.arguments()?
        } else {
            Vec::new()
        };
        Ok(Stmt::ProcedureCall(Call {
            name: "writeln".to_string(),
            args,
            location,
        }))
    }

    fn if_statement(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let condition = self.expression()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.body()?;
        let else_branch = if self.eat(TokenKind::Else) {
            Some(self.body()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location,
        })
    }

    fn while_statement(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let condition = self.expression()?;
        self.expect(TokenKind::Do)?;
        let body = self.body()?;
        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    /// `do body while condition`
    fn do_while_statement(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let body = self.body()?;
        self.expect(TokenKind::While)?;
        let condition = self.expression()?;
        Ok(Stmt::DoWhile {
            body,
            condition,
            location,
        })
    }

    /// `repeat stmt; stmt until condition`, `;` before `until` optional.
    fn repeat_statement(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let mut statements = Vec::new();

        loop {
            if self.eat(TokenKind::Until) {
                break;
            }
            statements.push(self.statement()?);
            if self.eat(TokenKind::Until) {
                break;
            }
            if !self.eat(TokenKind::Semi) {
                return Err(self.unexpected("';' or 'until'"));
            }
        }

        let condition = self.expression()?;
        Ok(Stmt::RepeatUntil {
            body: Block {
                statements,
                location,
            },
            condition,
            location,
        })
    }

    fn for_statement(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let variable = self.ident()?;
        self.expect(TokenKind::Assign)?;
        let start = self.expression()?;
        let direction = match self.current().kind {
            TokenKind::To => ForDirection::Up,
            TokenKind::Downto => ForDirection::Down,
            _ => return Err(self.unexpected("'to' or 'downto'")),
        };
        self.advance();
        let end = self.expression()?;
        self.expect(TokenKind::Do)?;
        let body = self.body()?;
        Ok(Stmt::For {
            variable,
            start,
            end,
            direction,
            body,
            location,
        })
    }

    fn case_statement(&mut self) -> CoreResult<Stmt> {
        let location = self.advance().location;
        let scrutinee = self.expression()?;
        self.expect(TokenKind::Of)?;

        let mut arms = Vec::new();
        while !self.check(TokenKind::Else) && !self.check(TokenKind::End) {
            let mut labels = vec![self.case_label()?];
            while self.eat(TokenKind::Comma) {
                labels.push(self.case_label()?);
            }
            self.expect(TokenKind::Colon)?;
            let body = self.body()?;
            arms.push(CaseArm { labels, body });

            if !self.eat(TokenKind::Semi)
                && !self.check(TokenKind::Else)
                && !self.check(TokenKind::End)
            {
                return Err(self.unexpected("';'"));
            }
        }

        let default = if self.eat(TokenKind::Else) {
            let block = self.body()?;
            self.eat(TokenKind::Semi);
            Some(block)
        } else {
            None
        };
        self.expect(TokenKind::End)?;

        Ok(Stmt::Case {
            scrutinee,
            arms,
            default,
            location,
        })
    }

    /// A literal (optionally negated) or a plain identifier.
    fn case_label(&mut self) -> CoreResult<Expr> {
        if self.check(TokenKind::Minus) {
            let location = self.advance().location;
            if !matches!(
                self.current().kind,
                TokenKind::IntLiteral | TokenKind::RealLiteral
            ) {
                return Err(self.unexpected("a numeric case label"));
            }
            let operand = self.primary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(operand),
                location,
            });
        }

        match self.current().kind {
            TokenKind::IntLiteral
            | TokenKind::RealLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::BoolLiteral => self.primary(),
            TokenKind::Ident => Ok(Expr::Variable(self.ident()?)),
            _ => Err(self.unexpected("a case label")),
        }
    }

    // -----------------------------------------------------------------
    // Expressions, loosest level first
    // -----------------------------------------------------------------

    fn expression(&mut self) -> CoreResult<Expr> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> CoreResult<Expr> {
        let mut node = self.and_expr()?;
        while let Some(op) = self.binary_op(&[TokenKind::Or, TokenKind::Xor]) {
            let location = self.advance().location;
            let right = self.and_expr()?;
            node = binary(op, node, right, location);
        }
        Ok(node)
    }

    fn and_expr(&mut self) -> CoreResult<Expr> {
        let mut node = self.relational()?;
        while let Some(op) = self.binary_op(&[TokenKind::And]) {
            let location = self.advance().location;
            let right = self.relational()?;
            node = binary(op, node, right, location);
        }
        Ok(node)
    }

    fn relational(&mut self) -> CoreResult<Expr> {
        let mut node = self.additive()?;
        while let Some(op) = self.binary_op(&[
            TokenKind::Equal,
            TokenKind::EqEq,
            TokenKind::LessGreater,
            TokenKind::BangEq,
            TokenKind::Less,
            TokenKind::LessEq,
            TokenKind::Greater,
            TokenKind::GreaterEq,
        ]) {
            let location = self.advance().location;
            let right = self.additive()?;
            node = binary(op, node, right, location);
        }
        Ok(node)
    }

    fn additive(&mut self) -> CoreResult<Expr> {
        let mut node = self.multiplicative()?;
        while let Some(op) = self.binary_op(&[TokenKind::Plus, TokenKind::Minus]) {
            let location = self.advance().location;
            let right = self.multiplicative()?;
            node = binary(op, node, right, location);
        }
        Ok(node)
    }

    fn multiplicative(&mut self) -> CoreResult<Expr> {
        let mut node = self.unary()?;
        while let Some(op) = self.binary_op(&[
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Div,
            TokenKind::Mod,
        ]) {
            let location = self.advance().location;
            let right = self.unary()?;
            node = binary(op, node, right, location);
        }
        Ok(node)
    }

    fn unary(&mut self) -> CoreResult<Expr> {
        let op = match self.current().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.primary(),
        };
        let location = self.advance().location;
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            location,
        })
    }

    fn primary(&mut self) -> CoreResult<Expr> {
        let token = self.current().clone();
        let literal = match token.kind {
            TokenKind::IntLiteral => Literal::Integer(parse_int(&token)?),
            TokenKind::RealLiteral => Literal::Real(token.lexeme.clone()),
            TokenKind::StringLiteral => Literal::Str(unquote(&token.lexeme).to_string()),
            TokenKind::CharLiteral => {
                let ch = unquote(&token.lexeme).chars().next().ok_or_else(|| {
                    CoreError::syntax("empty char literal", token.location)
                })?;
                Literal::Char(ch)
            }
            TokenKind::BoolLiteral => {
                Literal::Boolean(token.lexeme.eq_ignore_ascii_case("true"))
            }
            TokenKind::Ident => {
                return match self.peek_kind(1) {
                    TokenKind::LParen => Ok(Expr::FunctionCall(self.call()?)),
                    TokenKind::LBracket => Ok(Expr::ArrayAccess(self.array_access()?)),
                    _ => Ok(Expr::Variable(self.ident()?)),
                };
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(Expr::Literal(literal, token.location))
    }

    fn array_access(&mut self) -> CoreResult<ArrayAccess> {
        let name = self.ident()?;
        self.expect(TokenKind::LBracket)?;
        let index = self.expression()?;
        self.expect(TokenKind::RBracket)?;
        Ok(ArrayAccess {
            name: name.name,
            index: Box::new(index),
            location: name.location,
        })
    }

    /// `name(arg, ...)`
    fn call(&mut self) -> CoreResult<Call> {
        let name = self.ident()?;
        let args = self.arguments()?;
        Ok(Call {
            name: name.name,
            args,
            location: name.location,
        })
    }

    fn arguments(&mut self) -> CoreResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    // -----------------------------------------------------------------
    // Token helpers
    // -----------------------------------------------------------------

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.position + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CoreResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn ident(&mut self) -> CoreResult<Ident> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: token.lexeme,
            location: token.location,
        })
    }

    /// The operator at the current token, if it is one of `kinds`.
    fn binary_op(&self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        let kind = self.current().kind;
        if !kinds.contains(&kind) {
            return None;
        }
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::Div => BinaryOp::IntDiv,
            TokenKind::Mod => BinaryOp::Mod,
            TokenKind::Equal | TokenKind::EqEq => BinaryOp::Equal,
            TokenKind::LessGreater | TokenKind::BangEq => BinaryOp::NotEqual,
            TokenKind::Less => BinaryOp::Less,
            TokenKind::LessEq => BinaryOp::LessEq,
            TokenKind::Greater => BinaryOp::Greater,
            TokenKind::GreaterEq => BinaryOp::GreaterEq,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            TokenKind::Xor => BinaryOp::Xor,
            _ => return None,
        };
        Some(op)
    }

    fn unexpected(&self, expected: &str) -> CoreError {
        let token = self.current();
        let found = match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.lexeme),
        };
        CoreError::syntax(format!("expected {expected}, found {found}"), token.location)
    }

    fn error_here(&self, message: &str) -> CoreError {
        CoreError::syntax(message, self.current().location)
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, location: Location) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        location,
    }
}

fn parse_int(token: &Token) -> CoreResult<i64> {
    token.lexeme.parse::<i64>().map_err(|_| {
        CoreError::syntax(
            format!("integer literal {} is out of range", token.lexeme),
            token.location,
        )
    })
}

/// Strip the surrounding quotes of a string or char lexeme.
fn unquote(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(lexeme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_statements(source: &str) -> Vec<Stmt> {
        parse(source).expect("parse").main.statements
    }

    fn single_expr(expr_source: &str) -> Expr {
        let source = format!("program t; begin x := {expr_source} end.");
        match main_statements(&source).remove(0) {
            Stmt::Assign { value, .. } => value,
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    fn syntax_error(source: &str) -> CoreError {
        let err = parse(source).unwrap_err();
        assert!(matches!(err, CoreError::Syntax { .. }), "got {err:?}");
        err
    }

    #[test]
    fn parses_minimal_program() {
        let program = parse("program hello; begin end.").expect("parse");
        assert_eq!(program.name, "hello");
        assert!(program.globals.is_empty());
        assert!(program.routines.is_empty());
        assert!(program.main.statements.is_empty());
    }

    #[test]
    fn expands_declaration_lists_in_order() {
        let program = parse(
            "program t; var a, b: integer; s: string; xs: array[-1..2] of char; begin end.",
        )
        .expect("parse");
        let names: Vec<_> = program.globals.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "s", "xs"]);
        assert_eq!(program.globals[1].ty, Type::Integer);
        assert_eq!(program.globals[3].ty, Type::array(-1, 2, Type::Char));
    }

    #[test]
    fn parses_function_and_procedure() {
        let program = parse(
            "program t;
             function add(a: integer; b: integer): integer;
             begin add := a + b; end;
             procedure show(x, y: real);
             var tmp: real;
             begin writeln(x) end;
             begin end.",
        )
        .expect("parse");
        assert_eq!(program.routines.len(), 2);
        match &program.routines[0] {
            Routine::Function(f) => {
                assert_eq!(f.name, "add");
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.return_type, Type::Integer);
            }
            other => panic!("expected function, got {other:?}"),
        }
        match &program.routines[1] {
            Routine::Procedure(p) => {
                assert_eq!(p.params.len(), 2);
                assert_eq!(p.params[1].ty, Type::Real);
                assert_eq!(p.locals.len(), 1);
            }
            other => panic!("expected procedure, got {other:?}"),
        }
    }

    #[test]
    fn routines_may_omit_parameter_list() {
        let program = parse(
            "program t; function one: integer; begin one := 1 end; procedure p(); begin end; begin end.",
        )
        .expect("parse");
        assert!(program.routines.iter().all(|r| r.params().is_empty()));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = single_expr("1 + 2 * 3");
        let Expr::Binary { op, right, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let expr = single_expr("10 - 3 - 1");
        let Expr::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Sub);
        assert!(matches!(*left, Expr::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn and_binds_tighter_than_or_and_xor() {
        let expr = single_expr("a or b and c xor d");
        let Expr::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Xor);
        let Expr::Binary { op, right, .. } = *left else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Or);
        assert!(matches!(*right, Expr::Binary { op: BinaryOp::And, .. }));
    }

    #[test]
    fn not_applies_to_the_tightest_operand() {
        let expr = single_expr("not a and b");
        let Expr::Binary { op, left, .. } = expr else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::And);
        assert!(matches!(*left, Expr::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn minus_before_literal_is_unary_negation() {
        let expr = single_expr("-1");
        assert!(matches!(
            expr,
            Expr::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn equality_spellings_share_an_operator() {
        for (text, expected) in [
            ("a = b", BinaryOp::Equal),
            ("a == b", BinaryOp::Equal),
            ("a <> b", BinaryOp::NotEqual),
            ("a != b", BinaryOp::NotEqual),
        ] {
            let Expr::Binary { op, .. } = single_expr(text) else {
                panic!("expected binary for {text}");
            };
            assert_eq!(op, expected, "{text}");
        }
    }

    #[test]
    fn identifier_lookahead_picks_call_access_or_value() {
        let expr = single_expr("f(1, 2) + xs[i] + y");
        let Expr::Binary { left, right, .. } = expr else {
            panic!("expected binary");
        };
        assert!(matches!(*right, Expr::Variable(_)));
        let Expr::Binary { left, right, .. } = *left else {
            panic!("expected binary");
        };
        assert!(matches!(*left, Expr::FunctionCall(ref c) if c.args.len() == 2));
        assert!(matches!(*right, Expr::ArrayAccess(_)));
    }

    #[test]
    fn trailing_semicolon_before_end_is_optional() {
        assert_eq!(main_statements("program t; begin x := 1; y := 2 end.").len(), 2);
        assert_eq!(main_statements("program t; begin x := 1; y := 2; end.").len(), 2);
    }

    #[test]
    fn missing_semicolon_between_statements_is_an_error() {
        let err = syntax_error("program t; begin x := 1 y := 2 end.");
        assert_eq!(err.location(), Location::new(1, 25));
    }

    #[test]
    fn single_statement_bodies_are_wrapped_in_blocks() {
        let statements = main_statements(
            "program t; begin
               if a then x := 1 else begin x := 2; y := 3 end;
               while a do x := 1;
               for i := 10 downto 1 do writeln(i)
             end.",
        );
        match &statements[0] {
            Stmt::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                assert_eq!(then_branch.statements.len(), 1);
                assert_eq!(else_branch.statements.len(), 2);
            }
            other => panic!("expected if, got {other:?}"),
        }
        assert!(matches!(&statements[1], Stmt::While { body, .. } if body.statements.len() == 1));
        assert!(matches!(
            &statements[2],
            Stmt::For {
                direction: ForDirection::Down,
                ..
            }
        ));
    }

    #[test]
    fn parses_repeat_and_do_while() {
        let statements = main_statements(
            "program t; begin
               repeat x := x + 1; y := y until x = 5;
               do begin x := x - 1 end while x > 0
             end.",
        );
        assert!(
            matches!(&statements[0], Stmt::RepeatUntil { body, .. } if body.statements.len() == 2)
        );
        assert!(matches!(&statements[1], Stmt::DoWhile { .. }));
    }

    #[test]
    fn parses_case_with_label_lists_and_default() {
        let statements = main_statements(
            "program t; begin
               case i of
                 1: writeln(1);
                 2, 3: writeln(2);
                 -4: begin writeln(4) end;
               else
                 writeln(0);
               end;
             end.",
        );
        let Stmt::Case { arms, default, .. } = &statements[0] else {
            panic!("expected case");
        };
        assert_eq!(arms.len(), 3);
        assert_eq!(arms[1].labels.len(), 2);
        assert!(matches!(arms[2].labels[0], Expr::Unary { op: UnaryOp::Negate, .. }));
        assert!(default.is_some());
    }

    #[test]
    fn last_case_arm_may_omit_semicolon() {
        let statements = main_statements("program t; begin case c of 'a': x := 1 end end.");
        assert!(matches!(&statements[0], Stmt::Case { arms, default: None, .. } if arms.len() == 1));
    }

    #[test]
    fn nested_begin_end_is_a_block_statement() {
        let statements = main_statements("program t; begin begin x := 1 end end.");
        assert!(matches!(&statements[0], Stmt::Block(b) if b.statements.len() == 1));
    }

    #[test]
    fn writeln_without_arguments() {
        let statements = main_statements("program t; begin writeln; writeln() end.");
        assert!(statements
            .iter()
            .all(|s| matches!(s, Stmt::ProcedureCall(c) if c.name == "writeln" && c.args.is_empty())));
    }

    #[test]
    fn literals_are_decoded() {
        assert_eq!(
            single_expr("'hello'"),
            Expr::Literal(Literal::Str("hello".into()), Location::new(1, 23))
        );
        assert!(matches!(single_expr("'h'"), Expr::Literal(Literal::Char('h'), _)));
        assert!(matches!(single_expr("TRUE"), Expr::Literal(Literal::Boolean(true), _)));
        assert!(matches!(single_expr("2.50"), Expr::Literal(Literal::Real(ref r), _) if r == "2.50"));
    }

    #[test]
    fn rejects_real_array_bound() {
        let err = syntax_error("program t; var a: array[1.5..3] of integer; begin end.");
        assert!(err.message().contains("must be an integer"));
    }

    #[test]
    fn rejects_inverted_array_bounds() {
        let err = syntax_error("program t; var a: array[5..1] of integer; begin end.");
        assert!(err.message().contains("greater than upper bound"));
        assert_eq!(err.location(), Location::new(1, 25));
    }

    #[test]
    fn single_element_array_is_valid() {
        let program = parse("program t; var a: array[2..2] of real; begin end.").expect("parse");
        assert_eq!(program.globals[0].ty.size(), Some(1));
    }

    #[test]
    fn rejects_array_parameter() {
        let err = syntax_error(
            "program t; function f(a: array[1..2] of integer): integer; begin f := 1 end; begin end.",
        );
        assert!(err.message().contains("parameter"));
    }

    #[test]
    fn rejects_array_of_array_and_array_return() {
        syntax_error("program t; var a: array[1..2] of array[1..2] of integer; begin end.");
        syntax_error("program t; function f: array[1..2] of integer; begin end; begin end.");
    }

    #[test]
    fn requires_final_dot_and_nothing_after_it() {
        let err = syntax_error("program t; begin end");
        assert_eq!(err.message(), "expected '.', found end of input");
        syntax_error("program t; begin end. extra");
    }

    #[test]
    fn reports_unknown_statement_start() {
        let err = syntax_error("program t; begin 42 end.");
        assert_eq!(err.message(), "expected a statement, found '42'");
    }

    #[test]
    fn reserved_keywords_cannot_name_variables() {
        syntax_error("program t; var default: integer; begin end.");
    }
}
