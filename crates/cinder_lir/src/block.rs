use crate::{BlockId, Instr, Operand};

/// A basic block: a sequence of instructions ending with a terminator.
#[derive(Debug, Clone)]
pub struct Block {
  pub label: String,
  pub instructions: Vec<Instr>,
  pub terminator: Terminator,
}

impl Block {
  pub fn new(label: String) -> Self {
    Self {
      label,
      instructions: Vec::new(),
      terminator: Terminator::Unreachable,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
  Goto(BlockId),

  /// If `condition` holds go to `then_block`, otherwise to `else_block`.
  Branch {
    condition: Operand,
    then_block: BlockId,
    else_block: BlockId,
  },

  Return(Option<Operand>),

  /// Control never reaches the end of the block (after a call that does
  /// not return, or while the block is still being built).
  Unreachable,
}
