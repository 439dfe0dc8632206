//! Index-based arena backing the syntax tree.
//!
//! Nodes are pushed once and never freed individually; the whole store goes
//! away with the `Arena`. Handles are plain indices tagged with the node type
//! so a statement id can never be used to look up an expression.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

/// Stable handle to a node of type `T` inside an [`Arena<T>`].
pub struct Id<T> {
  index: u32,
  _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
  fn new(index: usize) -> Self {
    Self {
      index: index as u32,
      _marker: PhantomData,
    }
  }

  pub fn index(self) -> usize {
    self.index as usize
  }
}

// Manual impls: derives would demand `T: Clone` etc.
impl<T> Clone for Id<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
  fn eq(&self, other: &Self) -> bool {
    self.index == other.index
  }
}

impl<T> Eq for Id<T> {}

impl<T> fmt::Debug for Id<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Id({})", self.index)
  }
}

/// Growable store handing out [`Id`]s in allocation order.
#[derive(Debug)]
pub struct Arena<T> {
  nodes: Vec<T>,
}

impl<T> Default for Arena<T> {
  fn default() -> Self {
    Self { nodes: Vec::new() }
  }
}

impl<T> Arena<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn alloc(&mut self, node: T) -> Id<T> {
    let id = Id::new(self.nodes.len());
    self.nodes.push(node);
    id
  }

  pub(crate) fn len(&self) -> usize {
    self.nodes.len()
  }
}

impl<T> Index<Id<T>> for Arena<T> {
  type Output = T;

  fn index(&self, id: Id<T>) -> &T {
    &self.nodes[id.index()]
  }
}
