//! Recursive-descent parser producing an arena-backed syntax tree.
//!
//! Statements and blocks are handled by plain recursive descent. Expressions
//! use precedence climbing: `parse_expr` takes the minimum binding strength it
//! may consume and recurses with `prec + 1` for the right operand, which keeps
//! every operator left-associative.
//!
//! The first unmet expectation aborts the parse; there is no recovery.

use tracing::debug;

use crate::arena::Id;
use crate::ast::{Ast, BinaryOp, Expr, IfPred, Program, Scope, Stmt, Term};
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind, describe_token};

/// Deepest allowed nesting of blocks and parenthesised expressions. Both the
/// parser and the code generator recurse once per level.
pub const MAX_NESTING: usize = 256;

/// Parse a whole token vector into a program.
pub fn parse(tokens: Vec<Token>) -> CompileResult<Program> {
  let mut parser = Parser::new(tokens);
  let mut stmts = Vec::new();

  while !parser.stream.is_eof() {
    stmts.push(parser.parse_stmt()?);
  }

  debug!(
    statements = stmts.len(),
    nodes = parser.ast.node_count(),
    "parsed program"
  );
  Ok(Program {
    ast: parser.ast,
    stmts,
  })
}

struct Parser {
  stream: TokenStream,
  ast: Ast,
  depth: usize,
}

impl Parser {
  fn new(tokens: Vec<Token>) -> Self {
    Self {
      stream: TokenStream::new(tokens),
      ast: Ast::new(),
      depth: 0,
    }
  }

  fn parse_stmt(&mut self) -> CompileResult<Id<Stmt>> {
    let Some(kind) = self.stream.peek_kind() else {
      return Err(self.stream.error("statement"));
    };

    let stmt = match kind {
      TokenKind::Exit => {
        self.stream.bump();
        self.stream.skip(TokenKind::OpenParen)?;
        let expr = self.parse_expr(0)?;
        self.stream.skip(TokenKind::CloseParen)?;
        self.stream.skip(TokenKind::Semi)?;
        Stmt::Exit(expr)
      }
      TokenKind::Let => {
        self.stream.bump();
        let ident = self.stream.get_ident()?;
        self.stream.skip(TokenKind::Eq)?;
        let expr = self.parse_expr(0)?;
        self.stream.skip(TokenKind::Semi)?;
        Stmt::Let { ident, expr }
      }
      // `x = ...` is always a reassignment, never an expression.
      TokenKind::Ident if self.stream.peek_kind_at(1) == Some(TokenKind::Eq) => {
        let ident = self.stream.get_ident()?;
        self.stream.skip(TokenKind::Eq)?;
        let expr = self.parse_expr(0)?;
        self.stream.skip(TokenKind::Semi)?;
        Stmt::Assign { ident, expr }
      }
      TokenKind::OpenCurly => Stmt::Scope(self.parse_scope()?),
      TokenKind::If => {
        self.stream.bump();
        let cond = self.parse_condition()?;
        let scope = self.parse_scope()?;
        let pred = self.parse_if_pred()?;
        Stmt::If { cond, scope, pred }
      }
      _ => return Err(self.stream.error("statement")),
    };

    Ok(self.ast.alloc_stmt(stmt))
  }

  fn enter_nesting(&mut self) -> CompileResult<()> {
    if self.depth >= MAX_NESTING {
      return Err(self.stream.error(format!("at most {MAX_NESTING} levels of nesting")));
    }
    self.depth += 1;
    Ok(())
  }

  /// `{ stmt* }`, including both braces.
  fn parse_scope(&mut self) -> CompileResult<Id<Scope>> {
    self.stream.skip(TokenKind::OpenCurly)?;
    self.enter_nesting()?;

    let mut scope = Scope::default();
    while !self.stream.is_eof() && self.stream.peek_kind() != Some(TokenKind::CloseCurly) {
      scope.stmts.push(self.parse_stmt()?);
    }
    self.stream.skip(TokenKind::CloseCurly)?;
    self.depth -= 1;

    Ok(self.ast.alloc_scope(scope))
  }

  /// `( expr )` guarding an `if` or `elif` branch.
  fn parse_condition(&mut self) -> CompileResult<Id<Expr>> {
    self.stream.skip(TokenKind::OpenParen)?;
    let cond = self.parse_expr(0)?;
    self.stream.skip(TokenKind::CloseParen)?;
    Ok(cond)
  }

  fn parse_if_pred(&mut self) -> CompileResult<Option<Id<IfPred>>> {
    if self.stream.equal(TokenKind::Elif) {
      let cond = self.parse_condition()?;
      let scope = self.parse_scope()?;
      let pred = self.parse_if_pred()?;
      let elif = IfPred::Elif { cond, scope, pred };
      return Ok(Some(self.ast.alloc_pred(elif)));
    }

    if self.stream.equal(TokenKind::Else) {
      let scope = self.parse_scope()?;
      return Ok(Some(self.ast.alloc_pred(IfPred::Else(scope))));
    }

    Ok(None)
  }

  fn parse_expr(&mut self, min_prec: u8) -> CompileResult<Id<Expr>> {
    let mut lhs = self.parse_term()?;

    loop {
      let Some(op) = self.stream.peek_kind().and_then(BinaryOp::from_token_kind) else {
        break;
      };
      let prec = op.precedence();
      if prec < min_prec {
        break;
      }

      self.stream.bump();
      let rhs = self.parse_expr(prec + 1)?;
      lhs = self.ast.alloc_expr(Expr::Binary { op, lhs, rhs });
    }

    Ok(lhs)
  }

  fn parse_term(&mut self) -> CompileResult<Id<Expr>> {
    let term = match self.stream.peek_kind() {
      Some(TokenKind::IntLit) => Term::IntLit(self.stream.bump_token()),
      Some(TokenKind::Ident) => Term::Ident(self.stream.bump_token()),
      Some(TokenKind::OpenParen) => {
        self.stream.bump();
        self.enter_nesting()?;
        let inner = self.parse_expr(0)?;
        self.stream.skip(TokenKind::CloseParen)?;
        self.depth -= 1;
        Term::Paren(inner)
      }
      _ => return Err(self.stream.error("expression")),
    };

    Ok(self.ast.alloc_expr(Expr::Term(term)))
  }
}

/// Lightweight cursor over the token vector.
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
}

impl TokenStream {
  fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, pos: 0 }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn peek_kind(&self) -> Option<TokenKind> {
    self.peek_kind_at(0)
  }

  fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
    self.tokens.get(self.pos + offset).map(|token| token.kind)
  }

  fn bump(&mut self) {
    self.pos += 1;
  }

  /// Consume the current token and hand back a copy of it. Callers only use
  /// this after peeking, so the cursor is known to be in bounds.
  fn bump_token(&mut self) -> Token {
    let token = self.tokens[self.pos].clone();
    self.pos += 1;
    token
  }

  /// Consume the current token if it has the given kind.
  fn equal(&mut self, kind: TokenKind) -> bool {
    if self.peek_kind() == Some(kind) {
      self.pos += 1;
      return true;
    }
    false
  }

  fn skip(&mut self, kind: TokenKind) -> CompileResult<()> {
    if self.equal(kind) {
      Ok(())
    } else {
      Err(self.error(kind.to_string()))
    }
  }

  fn get_ident(&mut self) -> CompileResult<Token> {
    if self.peek_kind() == Some(TokenKind::Ident) {
      return Ok(self.bump_token());
    }
    Err(self.error(TokenKind::Ident.to_string()))
  }

  /// Line of the most recently consumed token, or 1 before anything was read.
  fn last_line(&self) -> usize {
    self
      .pos
      .checked_sub(1)
      .and_then(|prev| self.tokens.get(prev))
      .map_or(1, |token| token.line)
  }

  fn error(&self, expected: impl Into<String>) -> CompileError {
    CompileError::syntax(expected, describe_token(self.peek()), self.last_line())
  }

  fn is_eof(&self) -> bool {
    self.pos >= self.tokens.len()
  }
}
