//! Shared error type for the whole compiler.
//!
//! Every stage returns `CompileResult` and bails out on the first problem it
//! finds; nothing is recovered or batched. The display strings double as the
//! diagnostics printed by the binary.

use std::path::PathBuf;
use std::process::ExitStatus;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
  #[snafu(display("invalid character '{ch}' at line {line}"))]
  Lexical { ch: char, line: usize },

  #[snafu(display("expected {expected}, found {found}, at line {line}"))]
  Syntax {
    expected: String,
    found: String,
    line: usize,
  },

  #[snafu(display("identifier already used: {name} (line {line})"))]
  DuplicateIdentifier { name: String, line: usize },

  #[snafu(display("undefined identifier: {name} (line {line})"))]
  UndefinedIdentifier { name: String, line: usize },

  #[snafu(display("program contains no statements"))]
  EmptyProgram,

  #[snafu(display("input file {} is empty", path.display()))]
  EmptyInput { path: PathBuf },

  #[snafu(display("failed to read {}", path.display()))]
  ReadInput {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("failed to write {}", path.display()))]
  WriteOutput {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("could not find `{tool}` on PATH"))]
  ToolNotFound { tool: String, source: which::Error },

  #[snafu(display("failed to run `{tool}`"))]
  ToolSpawn {
    tool: String,
    source: std::io::Error,
  },

  #[snafu(display("`{tool}` exited with {status}"))]
  ToolFailed { tool: String, status: ExitStatus },
}

impl CompileError {
  /// Build a syntax error from the expected description and whatever sits at
  /// the cursor.
  pub fn syntax(expected: impl Into<String>, found: impl Into<String>, line: usize) -> Self {
    Self::Syntax {
      expected: expected.into(),
      found: found.into(),
      line,
    }
  }
}
