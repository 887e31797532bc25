use bitflags::bitflags;

use crate::{Id, Store, span::Span, symbol::SymbolId, types::TypeId};

pub type DefinitionId = Id<Definition>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
  pub kind: DefinitionKind,
  pub name: SymbolId,
  pub span: Span,
  /// Enclosing declaration. `None` for module-level declarations.
  pub parent: Option<DefinitionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionKind {
  Function(FunctionDefinition),
  Variable(VariableDefinition),
  Parameter(ParameterDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
  /// `delegate() { ... }`: carries a context pointer to the enclosing frame.
  Delegate,
  /// `function() { ... }`: no context pointer.
  Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
  pub params: Vec<DefinitionId>,
  pub return_type: TypeId,
  /// The `Function` type of this declaration.
  pub type_id: TypeId,
  /// Set for compiler- or user-written function literals.
  pub literal: Option<LiteralKind>,
  /// Implicit receiver of member functions.
  pub this_param: Option<DefinitionId>,
  /// Some local of this function is referenced from a nested function.
  pub nested_frame_ref: bool,
  /// Locals that must live in a heap-allocated frame because a delegate
  /// literal refers to them.
  pub closure_vars: Vec<DefinitionId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
  /// Lives in the enclosing function's frame.
  Stack,
  /// Lives in the data segment; never captured.
  Static,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
  pub type_id: TypeId,
  pub mutable: bool,
  pub storage: Storage,
  /// Referenced from a function nested inside the declaring one.
  pub captured: bool,
  /// Introduced by the compiler (e.g. the `$` length of an index/slice).
  pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
  pub type_id: TypeId,
  pub mutable: bool,
  pub captured: bool,
  pub is_this: bool,
}

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct NestedRefFlags: u32 {
    const NONE       = 0;
    /// The reference is made through a context that never outlives the
    /// referenced frame, so no heap promotion is required.
    const NO_CLOSURE = 1 << 0;
  }
}

/// Outcome of [`DefinitionStore::check_nested_reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedRef {
  /// The reference does not cross a function boundary, or the declaration is
  /// not a frame variable.
  NotNested,
  /// The variable was marked captured by this call.
  Captured,
  /// The variable was already captured; nothing changed except possibly
  /// closure promotion.
  AlreadyCaptured,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefinitionStore {
  definitions: Store<Definition>,
}

impl DefinitionStore {
  pub fn new() -> Self {
    Self {
      definitions: Store::new(),
    }
  }

  pub fn alloc(
    &mut self,
    def: Definition,
  ) -> DefinitionId {
    self.definitions.alloc(def)
  }

  pub fn get(
    &self,
    id: &DefinitionId,
  ) -> &Definition {
    self.definitions.get(id)
  }

  pub fn get_mut(
    &mut self,
    id: &DefinitionId,
  ) -> &mut Definition {
    self.definitions.get_mut(id)
  }

  pub fn iter(&self) -> impl Iterator<Item = (DefinitionId, &Definition)> {
    self.definitions.iter()
  }

  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  pub fn as_function(
    &self,
    id: &DefinitionId,
  ) -> Option<&FunctionDefinition> {
    match &self.get(id).kind {
      DefinitionKind::Function(fd) => Some(fd),
      _ => None,
    }
  }

  pub fn as_function_mut(
    &mut self,
    id: &DefinitionId,
  ) -> Option<&mut FunctionDefinition> {
    match &mut self.get_mut(id).kind {
      DefinitionKind::Function(fd) => Some(fd),
      _ => None,
    }
  }

  /// Variables and parameters (including `this`) are frame-resident values.
  pub fn is_var_declaration(
    &self,
    id: &DefinitionId,
  ) -> bool {
    matches!(
      self.get(id).kind,
      DefinitionKind::Variable(_) | DefinitionKind::Parameter(_)
    )
  }

  pub fn is_captured(
    &self,
    id: &DefinitionId,
  ) -> bool {
    match &self.get(id).kind {
      DefinitionKind::Variable(vd) => vd.captured,
      DefinitionKind::Parameter(pd) => pd.captured,
      _ => false,
    }
  }

  pub fn type_of(
    &self,
    id: &DefinitionId,
  ) -> TypeId {
    match &self.get(id).kind {
      DefinitionKind::Function(fd) => fd.type_id,
      DefinitionKind::Variable(vd) => vd.type_id,
      DefinitionKind::Parameter(pd) => pd.type_id,
    }
  }

  /// Number of functions lexically enclosing `id`.
  pub fn nesting_level(
    &self,
    id: &DefinitionId,
  ) -> u32 {
    let mut level = 0;
    let mut current = self.get(id).parent;

    while let Some(parent) = current {
      if self.as_function(&parent).is_some() {
        level += 1;
      }
      current = self.get(&parent).parent;
    }

    level
  }

  /// Nearest function at or above `id` in the parent chain.
  pub fn enclosing_function(
    &self,
    id: &DefinitionId,
  ) -> Option<DefinitionId> {
    let mut current = Some(*id);

    while let Some(candidate) = current {
      if self.as_function(&candidate).is_some() {
        return Some(candidate);
      }
      current = self.get(&candidate).parent;
    }

    None
  }

  /// The frame of `func` must be heap-allocated.
  pub fn needs_closure(
    &self,
    func: &DefinitionId,
  ) -> bool {
    self.as_function(func).is_some_and(|fd| !fd.closure_vars.is_empty())
  }

  /// Record that `var` is referenced while compiling code whose enclosing
  /// declaration is `context`.
  ///
  /// Marks `var` captured when `context` is a function other than the one
  /// declaring `var`, and promotes the declaring frame to a heap closure when
  /// a delegate literal sits between the two. Capture is monotonic: repeated
  /// calls never clear a flag.
  pub fn check_nested_reference(
    &mut self,
    var: &DefinitionId,
    context: Option<&DefinitionId>,
    flags: NestedRefFlags,
  ) -> NestedRef {
    let def = self.get(var);

    let is_frame_var = match &def.kind {
      DefinitionKind::Variable(vd) => vd.storage == Storage::Stack,
      DefinitionKind::Parameter(_) => true,
      _ => false,
    };

    if !is_frame_var {
      return NestedRef::NotNested;
    }

    let (Some(var_parent), Some(context)) = (def.parent, context) else {
      return NestedRef::NotNested;
    };

    if var_parent == *context {
      return NestedRef::NotNested;
    }

    let Some(fdv) = self.as_function(&var_parent).map(|_| var_parent) else {
      return NestedRef::NotNested;
    };

    let Some(fdthis) = self.as_function(context).map(|_| *context) else {
      return NestedRef::NotNested;
    };

    if fdv == fdthis {
      return NestedRef::NotNested;
    }

    let outcome = match &mut self.get_mut(var).kind {
      DefinitionKind::Variable(vd) if vd.captured => NestedRef::AlreadyCaptured,
      DefinitionKind::Variable(vd) => {
        vd.captured = true;
        NestedRef::Captured
      },
      DefinitionKind::Parameter(pd) if pd.captured => NestedRef::AlreadyCaptured,
      DefinitionKind::Parameter(pd) => {
        pd.captured = true;
        NestedRef::Captured
      },
      _ => unreachable!("frame variable checked above"),
    };

    let through_delegate = !flags.contains(NestedRefFlags::NO_CLOSURE) && self.delegate_between(&fdthis, &fdv);

    if let Some(fd) = self.as_function_mut(&fdv) {
      fd.nested_frame_ref = true;

      if through_delegate && !fd.closure_vars.contains(var) {
        fd.closure_vars.push(*var);
      }
    }

    outcome
  }

  /// Whether a delegate literal appears on the parent chain from `inner`
  /// (inclusive) up to, but excluding, `outer`.
  fn delegate_between(
    &self,
    inner: &DefinitionId,
    outer: &DefinitionId,
  ) -> bool {
    let mut current = Some(*inner);

    while let Some(func) = current {
      if func == *outer {
        break;
      }

      if self.as_function(&func).is_some_and(|fd| fd.literal == Some(LiteralKind::Delegate)) {
        return true;
      }

      current = self.get(&func).parent;
    }

    false
  }
}
