use log::debug;

use crate::ast::Program;
use crate::codegen_go::generate;
use crate::diagnostic::Diagnostic;
use crate::error::CoreError;
use crate::lexer::{Token, tokenize};
use crate::parser::parse_program;
use crate::typecheck::check_program;

/// Everything the pipeline produced for one accepted source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationArtifact {
    pub tokens: Vec<Token>,
    pub program: Program,
    pub go: String,
}

/// Run the whole pipeline: lex, parse, check, generate.
///
/// The first error of any phase aborts the run.
pub fn compile(source: &str) -> Result<CompilationArtifact, CoreError> {
    let tokens = tokenize(source)?;
    debug!("lexed {} tokens", tokens.len());

    let program = parse_program(&tokens)?;
    debug!(
        "parsed program '{}': {} globals, {} routines",
        program.name,
        program.globals.len(),
        program.routines.len()
    );

    check_program(&program)?;
    debug!("semantic analysis passed");

    let go = generate(&program);
    debug!("generated {} bytes of Go", go.len());

    Ok(CompilationArtifact {
        tokens,
        program,
        go,
    })
}

/// Translate source text to Go, reporting failures as a [`Diagnostic`].
pub fn translate(source: &str) -> Result<String, Diagnostic> {
    compile(source)
        .map(|artifact| artifact.go)
        .map_err(Diagnostic::from)
}
