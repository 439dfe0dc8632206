//! Lexical analysis: turns the raw source into a flat vector of tokens.
//!
//! The scanner makes a single pass over the bytes with at most one character
//! of lookahead. Whitespace and both comment forms are dropped, newlines only
//! bump the line counter used in diagnostics. Two-character punctuators are
//! matched before single-character ones so `==` never splits into `=` `=`.

use std::fmt;

use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Exit,
  Let,
  If,
  Elif,
  Else,
  Ident,
  IntLit,
  Semi,
  OpenParen,
  CloseParen,
  OpenCurly,
  CloseCurly,
  Eq,
  EqEq,
  Plus,
  Minus,
  Star,
  Slash,
}

impl TokenKind {
  fn keyword(word: &str) -> Option<Self> {
    match word {
      "exit" => Some(Self::Exit),
      "let" => Some(Self::Let),
      "if" => Some(Self::If),
      "elif" => Some(Self::Elif),
      "else" => Some(Self::Else),
      _ => None,
    }
  }

  fn punctuator(c: u8) -> Option<Self> {
    let kind = match c {
      b'(' => Self::OpenParen,
      b')' => Self::CloseParen,
      b'{' => Self::OpenCurly,
      b'}' => Self::CloseCurly,
      b';' => Self::Semi,
      b'=' => Self::Eq,
      b'+' => Self::Plus,
      b'-' => Self::Minus,
      b'*' => Self::Star,
      b'/' => Self::Slash,
      _ => return None,
    };
    Some(kind)
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      Self::Exit => "`exit`",
      Self::Let => "`let`",
      Self::If => "`if`",
      Self::Elif => "`elif`",
      Self::Else => "`else`",
      Self::Ident => "identifier",
      Self::IntLit => "integer literal",
      Self::Semi => "`;`",
      Self::OpenParen => "`(`",
      Self::CloseParen => "`)`",
      Self::OpenCurly => "`{`",
      Self::CloseCurly => "`}`",
      Self::Eq => "`=`",
      Self::EqEq => "`==`",
      Self::Plus => "`+`",
      Self::Minus => "`-`",
      Self::Star => "`*`",
      Self::Slash => "`/`",
    };
    f.write_str(text)
  }
}

/// A lexeme plus the line it started on. Only identifiers and integer
/// literals carry text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: Option<String>,
  pub line: usize,
}

impl Token {
  pub fn new(kind: TokenKind, line: usize) -> Self {
    Self {
      kind,
      text: None,
      line,
    }
  }

  pub fn with_text(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
    Self {
      kind,
      text: Some(text.into()),
      line,
    }
  }

  /// The literal text, or an empty string for punctuators and keywords.
  pub fn text(&self) -> &str {
    self.text.as_deref().unwrap_or("")
  }
}

/// Lex the whole input into tokens in source order.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut line = 1;
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];

    if c == b'\n' {
      line += 1;
      i += 1;
      continue;
    }

    // `is_ascii_whitespace` leaves out vertical tab.
    if c.is_ascii_whitespace() || c == 0x0B {
      i += 1;
      continue;
    }

    if c.is_ascii_alphabetic() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
      }
      let word = &input[start..i];
      let token = match TokenKind::keyword(word) {
        Some(kind) => Token::new(kind, line),
        None => Token::with_text(TokenKind::Ident, word, line),
      };
      tokens.push(token);
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::with_text(TokenKind::IntLit, &input[start..i], line));
      continue;
    }

    if bytes[i..].starts_with(b"//") {
      while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
      }
      continue;
    }

    if bytes[i..].starts_with(b"/*") {
      i += 2;
      while i < bytes.len() && !bytes[i..].starts_with(b"*/") {
        if bytes[i] == b'\n' {
          line += 1;
        }
        i += 1;
      }
      i = (i + 2).min(bytes.len());
      continue;
    }

    if bytes[i..].starts_with(b"==") {
      tokens.push(Token::new(TokenKind::EqEq, line));
      i += 2;
      continue;
    }

    if let Some(kind) = TokenKind::punctuator(c) {
      tokens.push(Token::new(kind, line));
      i += 1;
      continue;
    }

    let ch = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::Lexical { ch, line });
  }

  debug!(count = tokens.len(), lines = line, "tokenized source");
  Ok(tokens)
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>) -> String {
  match token {
    Some(t) => match t.kind {
      TokenKind::Ident | TokenKind::IntLit => format!("{} `{}`", t.kind, t.text()),
      _ => t.kind.to_string(),
    },
    None => "end of input".to_string(),
  }
}
