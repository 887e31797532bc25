use cinder_type::{Store, span::Span, types::TypeId};

use crate::{Block, BlockId, FunctionLir, Instr, LocalData, LocalId, Operand, TempData, TempId, Terminator};

/// Builder for constructing a single function's LIR.
pub struct FunctionBuilder {
  name: String,
  return_type: TypeId,
  span: Span,

  locals: Store<LocalData>,
  temps: Store<TempData>,
  blocks: Store<Block>,

  /// Block that `emit` appends to.
  current_block: BlockId,

  /// Counter for generating unique block labels.
  block_counter: u32,
}

impl FunctionBuilder {
  pub fn new(
    name: impl Into<String>,
    return_type: TypeId,
    span: Span,
  ) -> Self {
    let mut blocks = Store::new();
    let entry = blocks.alloc(Block::new("entry_0".to_string()));

    Self {
      name: name.into(),
      return_type,
      span,
      locals: Store::new(),
      temps: Store::new(),
      blocks,
      current_block: entry,
      block_counter: 1,
    }
  }

  pub fn create_block(
    &mut self,
    prefix: &str,
  ) -> BlockId {
    let label = format!("{}_{}", prefix, self.block_counter);
    self.block_counter += 1;
    self.blocks.alloc(Block::new(label))
  }

  pub fn switch_to_block(
    &mut self,
    block: BlockId,
  ) {
    self.current_block = block;
  }

  pub fn current_block(&self) -> BlockId {
    self.current_block
  }

  pub fn alloc_local(
    &mut self,
    data: LocalData,
  ) -> LocalId {
    self.locals.alloc(data)
  }

  pub fn alloc_temp(
    &mut self,
    ty: TypeId,
    span: Span,
  ) -> TempId {
    self.temps.alloc(TempData { ty, span })
  }

  pub fn temp_type(
    &self,
    temp: TempId,
  ) -> TypeId {
    self.temps.get(&temp).ty
  }

  pub fn local_type(
    &self,
    local: LocalId,
  ) -> TypeId {
    self.locals.get(&local).ty
  }

  /// Type of the value an operand denotes. A `Local` operand denotes the
  /// slot's contents.
  pub fn operand_type(
    &self,
    operand: &Operand,
  ) -> TypeId {
    match operand {
      Operand::Temp(temp) => self.temp_type(*temp),
      Operand::Local(local) => self.local_type(*local),
      Operand::Const(value) => value.type_id(),
    }
  }

  pub fn return_type(&self) -> TypeId {
    self.return_type
  }

  pub fn emit(
    &mut self,
    instr: Instr,
  ) {
    let block = self.blocks.get_mut(&self.current_block);
    block.instructions.push(instr);
  }

  pub fn terminate(
    &mut self,
    term: Terminator,
  ) {
    let block = self.blocks.get_mut(&self.current_block);
    block.terminator = term;
  }

  pub fn finish(self) -> FunctionLir {
    FunctionLir {
      name: self.name,
      return_type: self.return_type,
      locals: self.locals,
      temps: self.temps,
      blocks: self.blocks,
      entry_block: BlockId::new(0),
      span: self.span,
    }
  }
}
