//! Crate root: wires together the compilation pipeline.
//!
//! Source flows strictly left to right through small stages:
//! - `tokenizer` performs lexical analysis and produces a flat token vector.
//! - `parser` builds the syntax tree described in `ast`, stored in an `arena`.
//! - `codegen` walks the tree once and emits x86-64 NASM assembly.
//! - `error` holds the error type every stage reports through.
//!
//! `driver` and `cli` sit outside the pipeline: they read the input file,
//! write the assembly and hand it to the external assembler and linker.

pub mod arena;
pub mod ast;
pub mod cli;
pub mod driver;
pub mod error;
pub mod parser;
pub mod tokenizer;

mod codegen;

pub use error::{CompileError, CompileResult};

/// Compile a source string into NASM assembly.
pub fn generate_assembly(source: &str) -> CompileResult<String> {
  let tokens = tokenizer::tokenize(source)?;
  if tokens.is_empty() {
    return Err(CompileError::EmptyProgram);
  }
  let program = parser::parse(tokens)?;
  codegen::generate(&program)
}
