//! Syntax tree produced by the parser and walked by the code generator.
//!
//! Every node lives in an [`Arena`] owned by [`Ast`]; children are referenced
//! through typed ids. Links only ever point at nodes built earlier in the
//! same parse, so the structure is a tree by construction.

use std::ops::Index;

use crate::arena::{Arena, Id};
use crate::tokenizer::{Token, TokenKind};

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Eq,
  Add,
  Sub,
  Mul,
  Div,
}

impl BinaryOp {
  pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
    match kind {
      TokenKind::EqEq => Some(Self::Eq),
      TokenKind::Plus => Some(Self::Add),
      TokenKind::Minus => Some(Self::Sub),
      TokenKind::Star => Some(Self::Mul),
      TokenKind::Slash => Some(Self::Div),
      _ => None,
    }
  }

  /// Binding strength; higher binds tighter.
  pub fn precedence(self) -> u8 {
    match self {
      Self::Eq => 0,
      Self::Add | Self::Sub => 1,
      Self::Mul | Self::Div => 2,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
  IntLit(Token),
  Ident(Token),
  Paren(Id<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Term(Term),
  Binary {
    op: BinaryOp,
    lhs: Id<Expr>,
    rhs: Id<Expr>,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
  Exit(Id<Expr>),
  Let {
    ident: Token,
    expr: Id<Expr>,
  },
  Assign {
    ident: Token,
    expr: Id<Expr>,
  },
  Scope(Id<Scope>),
  If {
    cond: Id<Expr>,
    scope: Id<Scope>,
    pred: Option<Id<IfPred>>,
  },
}

/// A braced block: statements in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
  pub stmts: Vec<Id<Stmt>>,
}

/// Tail of an `if`: either another guarded branch or the final `else`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfPred {
  Elif {
    cond: Id<Expr>,
    scope: Id<Scope>,
    pred: Option<Id<IfPred>>,
  },
  Else(Id<Scope>),
}

/// Owner of every node built during one compilation.
#[derive(Debug, Default)]
pub struct Ast {
  exprs: Arena<Expr>,
  stmts: Arena<Stmt>,
  scopes: Arena<Scope>,
  preds: Arena<IfPred>,
}

impl Ast {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alloc_expr(&mut self, expr: Expr) -> Id<Expr> {
    self.exprs.alloc(expr)
  }

  pub fn alloc_stmt(&mut self, stmt: Stmt) -> Id<Stmt> {
    self.stmts.alloc(stmt)
  }

  pub fn alloc_scope(&mut self, scope: Scope) -> Id<Scope> {
    self.scopes.alloc(scope)
  }

  pub fn alloc_pred(&mut self, pred: IfPred) -> Id<IfPred> {
    self.preds.alloc(pred)
  }

  /// Total number of nodes across all categories.
  pub fn node_count(&self) -> usize {
    self.exprs.len() + self.stmts.len() + self.scopes.len() + self.preds.len()
  }
}

impl Index<Id<Expr>> for Ast {
  type Output = Expr;

  fn index(&self, id: Id<Expr>) -> &Expr {
    &self.exprs[id]
  }
}

impl Index<Id<Stmt>> for Ast {
  type Output = Stmt;

  fn index(&self, id: Id<Stmt>) -> &Stmt {
    &self.stmts[id]
  }
}

impl Index<Id<Scope>> for Ast {
  type Output = Scope;

  fn index(&self, id: Id<Scope>) -> &Scope {
    &self.scopes[id]
  }
}

impl Index<Id<IfPred>> for Ast {
  type Output = IfPred;

  fn index(&self, id: Id<IfPred>) -> &IfPred {
    &self.preds[id]
  }
}

/// A parsed compilation unit: the node store plus top-level statements.
#[derive(Debug, Default)]
pub struct Program {
  pub ast: Ast,
  pub stmts: Vec<Id<Stmt>>,
}
