use std::ops::{Deref, DerefMut};

use cinder_type::definition::DefinitionId;
use cinder_type::{Id, Store};

pub type ScopeId = Id<Scope>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
  Global,
  Function,
  Block,
  /// Body of a synthesized delegate literal.
  DelegateLiteral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
  pub parent: Option<ScopeId>,
  pub kind: ScopeKind,
  /// Declaration that owns declarations made in this scope, and
  /// against which nested references are judged.
  pub context: Option<DefinitionId>,
}

#[derive(Debug, Clone)]
pub struct ScopeTree {
  scopes: Store<Scope>,
  current: ScopeId,
}

impl Default for ScopeTree {
  fn default() -> Self {
    Self::new()
  }
}

impl ScopeTree {
  pub fn new() -> Self {
    let mut scopes = Store::new();
    let global = scopes.alloc(Scope {
      parent: None,
      kind: ScopeKind::Global,
      context: None,
    });

    Self {
      scopes,
      current: global,
    }
  }

  /// Child of the current scope with the same context.
  pub fn push(
    &mut self,
    kind: ScopeKind,
  ) -> ScopeId {
    let context = self.context();
    self.push_with_context(kind, context)
  }

  pub fn push_with_context(
    &mut self,
    kind: ScopeKind,
    context: Option<DefinitionId>,
  ) -> ScopeId {
    let new = self.scopes.alloc(Scope {
      parent: Some(self.current),
      kind,
      context,
    });

    self.current = new;

    new
  }

  pub fn pop(&mut self) {
    if let Some(parent) = self.scopes.get(&self.current).parent {
      self.current = parent;
    }
  }

  /// Push a scope that is popped when the returned guard is dropped,
  /// including while unwinding from a panic.
  pub fn enter(
    &mut self,
    kind: ScopeKind,
    context: Option<DefinitionId>,
  ) -> ScopeGuard<'_> {
    let parent = self.current;
    self.enter_child(parent, kind, context)
  }

  /// Like [`ScopeTree::enter`], but the new scope hangs off `parent`
  /// rather than the current scope.
  pub fn enter_child(
    &mut self,
    parent: ScopeId,
    kind: ScopeKind,
    context: Option<DefinitionId>,
  ) -> ScopeGuard<'_> {
    let saved = self.current;
    self.current = parent;
    self.push_with_context(kind, context);

    ScopeGuard { tree: self, saved }
  }

  pub fn current(&self) -> ScopeId {
    self.current
  }

  pub fn current_scope(&self) -> &Scope {
    self.scopes.get(&self.current)
  }

  pub fn get_scope(
    &self,
    id: &ScopeId,
  ) -> &Scope {
    self.scopes.get(id)
  }

  pub fn context(&self) -> Option<DefinitionId> {
    self.current_scope().context
  }

  /// Number of scopes between the current one and the global scope.
  pub fn depth(&self) -> usize {
    let mut depth = 0;
    let mut current = &self.current;

    while let Some(parent) = &self.scopes.get(current).parent {
      depth += 1;
      current = parent;
    }

    depth
  }
}

pub struct ScopeGuard<'a> {
  tree: &'a mut ScopeTree,
  saved: ScopeId,
}

impl Deref for ScopeGuard<'_> {
  type Target = ScopeTree;

  fn deref(&self) -> &ScopeTree {
    self.tree
  }
}

impl DerefMut for ScopeGuard<'_> {
  fn deref_mut(&mut self) -> &mut ScopeTree {
    self.tree
  }
}

impl Drop for ScopeGuard<'_> {
  fn drop(&mut self) {
    self.tree.current = self.saved;
  }
}
