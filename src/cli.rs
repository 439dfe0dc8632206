use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::Level;

/// Compile a source file into a standalone x86-64 Linux executable.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Options {
  #[arg(value_name = "FILE")]
  input: PathBuf,

  /// Path of the linked executable.
  #[arg(short, long, default_value = "out", value_name = "PATH")]
  output: PathBuf,

  /// Path the generated assembly is written to.
  #[arg(long = "asm", default_value = "out.asm", value_name = "PATH")]
  asm_output: PathBuf,

  /// Stop after writing the assembly; do not run `nasm` or `ld`.
  #[arg(short = 'S', long)]
  emit_asm: bool,

  /// Increase log output (-v info, -vv debug, -vvv trace).
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

impl Options {
  pub fn new(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    asm_output: impl Into<PathBuf>,
  ) -> Self {
    Self {
      input: input.into(),
      output: output.into(),
      asm_output: asm_output.into(),
      emit_asm: false,
      verbose: 0,
    }
  }

  pub fn with_emit_asm(mut self, emit_asm: bool) -> Self {
    self.emit_asm = emit_asm;
    self
  }

  pub fn input(&self) -> &Path {
    &self.input
  }

  pub fn output(&self) -> &Path {
    &self.output
  }

  pub fn asm_output(&self) -> &Path {
    &self.asm_output
  }

  /// Object file path: the assembly path with an `.o` extension.
  pub fn object_output(&self) -> PathBuf {
    self.asm_output.with_extension("o")
  }

  pub fn emit_asm(&self) -> bool {
    self.emit_asm
  }

  pub fn log_level(&self) -> Level {
    match self.verbose {
      0 => Level::WARN,
      1 => Level::INFO,
      2 => Level::DEBUG,
      _ => Level::TRACE,
    }
  }
}
