//! Everything around the pipeline: file I/O and the external toolchain.
//!
//! The assembly is written only after the whole pipeline succeeded, so a
//! failed compile never leaves a half-written `.asm` behind.

use std::ffi::OsStr;
use std::fs;
use std::process::Command;

use snafu::{ResultExt, ensure};
use tracing::info;

use crate::cli::Options;
use crate::error::{
  CompileResult, EmptyInputSnafu, ReadInputSnafu, ToolFailedSnafu, ToolNotFoundSnafu,
  ToolSpawnSnafu, WriteOutputSnafu,
};
use crate::generate_assembly;

/// Read the input, compile it and write the assembly. Returns the text that
/// was written.
pub fn emit(options: &Options) -> CompileResult<String> {
  let input = options.input();
  let source = fs::read_to_string(input).context(ReadInputSnafu { path: input })?;
  ensure!(!source.is_empty(), EmptyInputSnafu { path: input });

  let asm = generate_assembly(&source)?;

  let asm_path = options.asm_output();
  fs::write(asm_path, &asm).context(WriteOutputSnafu { path: asm_path })?;
  info!(path = %asm_path.display(), "wrote assembly");
  Ok(asm)
}

/// Full build: emit assembly, then assemble and link unless `-S` was given.
pub fn compile(options: &Options) -> CompileResult<()> {
  emit(options)?;
  if options.emit_asm() {
    return Ok(());
  }

  let object = options.object_output();
  run_tool(
    "nasm",
    [
      OsStr::new("-felf64"),
      options.asm_output().as_os_str(),
      OsStr::new("-o"),
      object.as_os_str(),
    ],
  )?;
  run_tool(
    "ld",
    [
      OsStr::new("-o"),
      options.output().as_os_str(),
      object.as_os_str(),
    ],
  )?;

  info!(path = %options.output().display(), "linked executable");
  Ok(())
}

fn run_tool<'a>(tool: &str, args: impl IntoIterator<Item = &'a OsStr>) -> CompileResult<()> {
  let path = which::which(tool).context(ToolNotFoundSnafu { tool })?;
  info!(tool, path = %path.display(), "running external tool");

  let status = Command::new(&path)
    .args(args)
    .status()
    .context(ToolSpawnSnafu { tool })?;
  ensure!(status.success(), ToolFailedSnafu { tool, status });
  Ok(())
}
