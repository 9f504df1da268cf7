use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use pas2go_core::dump::{dump_ast, dump_tokens};
use pas2go_core::lexer::tokenize;
use pas2go_core::parser::parse_program;
use pas2go_core::{Diagnostic, translate};

/// Translate a Pascal-flavored program into Go source.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to read (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// File to write (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, value_enum, default_value = "go")]
    emit: EmitKind,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmitKind {
    /// Go source (full pipeline)
    Go,
    /// Token list (lexer only)
    Tokens,
    /// Syntax tree (lexer and parser)
    Ast,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Diagnostic>() {
                Some(diagnostic) => eprintln!("{diagnostic}"),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let source = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    info!("translating {} bytes, emitting {:?}", source.len(), cli.emit);

    let text = match cli.emit {
        EmitKind::Go => translate(&source)?,
        EmitKind::Tokens => {
            let tokens = tokenize(&source).map_err(Diagnostic::from)?;
            dump_tokens(&tokens)
        }
        EmitKind::Ast => {
            let tokens = tokenize(&source).map_err(Diagnostic::from)?;
            let program = parse_program(&tokens).map_err(Diagnostic::from)?;
            dump_ast(&program)
        }
    };

    match &cli.output {
        Some(path) => write_output(path, &text)?,
        None => io::stdout()
            .write_all(text.as_bytes())
            .context("failed to write stdout")?,
    }
    Ok(())
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, text)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    debug!("wrote {}", path.display());
    Ok(())
}
