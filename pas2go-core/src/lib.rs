//! Core pipeline of the pas2go translator.
//!
//! pas2go translates a small Pascal-flavored, statically typed language
//! into Go source text. The pipeline is:
//!
//!   source text
//!     -> lexer      (tokens)
//!     -> parser     (AST)
//!     -> typecheck  (names + types, fail fast)
//!     -> codegen_go (Go text)
//!
//! Higher-level tools (the CLI) should depend on this crate rather than
//! reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Semantic layers: types, scopes, type checking
// ---------------------------------------------------------------------

pub mod types;
pub mod scope;
pub mod typecheck;

// ---------------------------------------------------------------------
// Builtins
// ---------------------------------------------------------------------

pub mod builtins;

// ---------------------------------------------------------------------
// Back-end: code generation, views and compiler orchestration
// ---------------------------------------------------------------------

pub mod codegen_go;
pub mod dump;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use compiler::{CompilationArtifact, compile, translate};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::CoreError;
