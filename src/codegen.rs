//! Code generation: lower the syntax tree into x86-64 NASM assembly.
//!
//! The emitter is a simple stack machine: every expression leaves exactly one
//! word on the stack. `stack_size` mirrors the runtime depth so locals, which
//! live in the slot their initializer was pushed into, can be addressed
//! relative to `rsp` at any later point. Blocks release their locals on exit
//! and `if` chains are lowered to `jz`/`jmp` over numbered labels.

use tracing::{debug, trace};

use crate::arena::Id;
use crate::ast::{Ast, BinaryOp, Expr, IfPred, Program, Scope, Stmt, Term};
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::Token;

const WORD_SIZE: usize = 8;
const SYS_EXIT: i64 = 60;

/// Emit assembly for a whole program.
pub fn generate(program: &Program) -> CompileResult<String> {
  let mut cg = Generator::new(&program.ast);

  cg.asm.push_str("global _start\n");
  cg.asm.push_str("_start:\n");

  for &stmt in &program.stmts {
    cg.emit_stmt(stmt)?;
  }

  // Only reached when no explicit `exit` ran.
  cg.asm.push_str(&format!("    mov rax, {SYS_EXIT}\n"));
  cg.asm.push_str("    mov rdi, 0\n");
  cg.asm.push_str("    syscall\n");

  debug!(bytes = cg.asm.len(), labels = cg.label_count, "generated assembly");
  Ok(cg.asm)
}

/// A `let`-bound name and the stack slot holding its value.
#[derive(Debug, Clone)]
struct Var {
  name: String,
  stack_loc: usize,
}

struct Generator<'a> {
  ast: &'a Ast,
  asm: String,
  stack_size: usize,
  vars: Vec<Var>,
  scopes: Vec<usize>,
  label_count: usize,
}

impl<'a> Generator<'a> {
  fn new(ast: &'a Ast) -> Self {
    Self {
      ast,
      asm: String::new(),
      stack_size: 0,
      vars: Vec::new(),
      scopes: Vec::new(),
      label_count: 0,
    }
  }

  fn push(&mut self, operand: &str) {
    self.asm.push_str(&format!("    push {operand}\n"));
    self.stack_size += 1;
  }

  fn pop(&mut self, reg: &str) {
    self.asm.push_str(&format!("    pop {reg}\n"));
    self.stack_size -= 1;
  }

  fn create_label(&mut self) -> String {
    let label = format!("label{}", self.label_count);
    self.label_count += 1;
    trace!(%label, "created label");
    label
  }

  fn lookup(&self, ident: &Token) -> CompileResult<&Var> {
    self
      .vars
      .iter()
      .find(|var| var.name == ident.text())
      .ok_or_else(|| CompileError::UndefinedIdentifier {
        name: ident.text().to_string(),
        line: ident.line,
      })
  }

  /// Byte offset of `var` above the current stack top.
  fn offset_of(&self, var: &Var) -> usize {
    (self.stack_size - var.stack_loc - 1) * WORD_SIZE
  }

  fn emit_term(&mut self, term: &Term) -> CompileResult<()> {
    match term {
      Term::IntLit(token) => {
        self.asm.push_str(&format!("    mov rax, {}\n", token.text()));
        self.push("rax");
      }
      Term::Ident(token) => {
        let offset = self.offset_of(self.lookup(token)?);
        self.push(&format!("QWORD [rsp + {offset}]"));
      }
      Term::Paren(inner) => self.emit_expr(*inner)?,
    }
    Ok(())
  }

  /// Right operand first, so after both pushes the left one is on top.
  fn emit_expr(&mut self, id: Id<Expr>) -> CompileResult<()> {
    let ast = self.ast;
    match &ast[id] {
      Expr::Term(term) => self.emit_term(term)?,
      Expr::Binary { op, lhs, rhs } => {
        self.emit_expr(*rhs)?;
        self.emit_expr(*lhs)?;
        self.pop("rax");
        self.pop("rbx");
        match op {
          BinaryOp::Add => self.asm.push_str("    add rax, rbx\n"),
          BinaryOp::Sub => self.asm.push_str("    sub rax, rbx\n"),
          BinaryOp::Mul => self.asm.push_str("    imul rbx\n"),
          BinaryOp::Div => {
            self.asm.push_str("    cqo\n");
            self.asm.push_str("    idiv rbx\n");
          }
          BinaryOp::Eq => {
            self.asm.push_str("    cmp rax, rbx\n");
            self.asm.push_str("    sete al\n");
            self.asm.push_str("    movzx rax, al\n");
          }
        }
        self.push("rax");
      }
    }
    Ok(())
  }

  fn begin_scope(&mut self) {
    self.scopes.push(self.vars.len());
    trace!(depth = self.scopes.len(), "enter scope");
  }

  fn end_scope(&mut self) {
    let marker = self.scopes.pop().unwrap_or(0);
    let pop_count = self.vars.len() - marker;
    if pop_count > 0 {
      self
        .asm
        .push_str(&format!("    add rsp, {}\n", pop_count * WORD_SIZE));
    }
    self.stack_size -= pop_count;
    self.vars.truncate(marker);
    trace!(released = pop_count, "leave scope");
  }

  fn emit_scope(&mut self, id: Id<Scope>) -> CompileResult<()> {
    let ast = self.ast;
    self.begin_scope();
    for &stmt in &ast[id].stmts {
      self.emit_stmt(stmt)?;
    }
    self.end_scope();
    Ok(())
  }

  /// Test the value on top of the stack and jump to a fresh label when it is
  /// zero. Returns that label for the caller to place.
  fn emit_test(&mut self, cond: Id<Expr>) -> CompileResult<String> {
    self.emit_expr(cond)?;
    self.pop("rax");
    let label = self.create_label();
    self.asm.push_str("    test rax, rax\n");
    self.asm.push_str(&format!("    jz {label}\n"));
    Ok(label)
  }

  fn emit_if_pred(&mut self, id: Id<IfPred>, end_label: &str) -> CompileResult<()> {
    let ast = self.ast;
    match &ast[id] {
      IfPred::Elif { cond, scope, pred } => {
        let label = self.emit_test(*cond)?;
        self.emit_scope(*scope)?;
        self.asm.push_str(&format!("    jmp {end_label}\n"));
        self.asm.push_str(&format!("{label}:\n"));
        if let Some(next) = pred {
          self.emit_if_pred(*next, end_label)?;
        }
      }
      IfPred::Else(scope) => self.emit_scope(*scope)?,
    }
    Ok(())
  }

  fn emit_stmt(&mut self, id: Id<Stmt>) -> CompileResult<()> {
    let ast = self.ast;
    match &ast[id] {
      Stmt::Exit(expr) => {
        self.emit_expr(*expr)?;
        self.asm.push_str(&format!("    mov rax, {SYS_EXIT}\n"));
        self.pop("rdi");
        self.asm.push_str("    syscall\n");
      }
      Stmt::Let { ident, expr } => {
        if self.vars.iter().any(|var| var.name == ident.text()) {
          return Err(CompileError::DuplicateIdentifier {
            name: ident.text().to_string(),
            line: ident.line,
          });
        }
        // The initializer's result becomes the variable's slot. The name is
        // bound only afterwards, so `let q = q;` cannot read its own slot.
        let stack_loc = self.stack_size;
        self.emit_expr(*expr)?;
        self.vars.push(Var {
          name: ident.text().to_string(),
          stack_loc,
        });
      }
      Stmt::Assign { ident, expr } => {
        self.lookup(ident)?;
        self.emit_expr(*expr)?;
        self.pop("rax");
        let offset = self.offset_of(self.lookup(ident)?);
        self.asm.push_str(&format!("    mov [rsp + {offset}], rax\n"));
      }
      Stmt::Scope(scope) => self.emit_scope(*scope)?,
      Stmt::If { cond, scope, pred } => {
        let label = self.emit_test(*cond)?;
        self.emit_scope(*scope)?;
        match pred {
          Some(pred) => {
            let end_label = self.create_label();
            self.asm.push_str(&format!("    jmp {end_label}\n"));
            self.asm.push_str(&format!("{label}:\n"));
            self.emit_if_pred(*pred, &end_label)?;
            self.asm.push_str(&format!("{end_label}:\n"));
          }
          None => self.asm.push_str(&format!("{label}:\n")),
        }
      }
    }
    Ok(())
  }
}
