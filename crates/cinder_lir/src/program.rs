use cinder_type::{Store, span::Span, types::TypeId};

use crate::{Block, BlockId, LocalId, TempId};

/// A single function in LIR form.
#[derive(Debug, Clone)]
pub struct FunctionLir {
  pub name: String,
  pub return_type: TypeId,
  /// Stack slots.
  pub locals: Store<LocalData>,
  pub temps: Store<TempData>,
  pub blocks: Store<Block>,
  pub entry_block: BlockId,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalData {
  pub ty: TypeId,
  pub mutable: bool,
  /// Debug name (for pretty printing).
  pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempData {
  pub ty: TypeId,
  pub span: Span,
}

impl FunctionLir {
  pub fn local_type(
    &self,
    local: LocalId,
  ) -> TypeId {
    self.locals.get(&local).ty
  }

  pub fn temp_type(
    &self,
    temp: TempId,
  ) -> TypeId {
    self.temps.get(&temp).ty
  }

  /// Labels of every block, in creation order.
  pub fn block_labels(&self) -> Vec<&str> {
    self.blocks.iter().map(|(_, b)| b.label.as_str()).collect()
  }
}
