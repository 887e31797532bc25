#![allow(dead_code)]

use cinder_config::CinderConfig;
use cinder_lir::{
  ConstValue, FunctionLir, LirPrinter, LocalData, Operand, Terminator,
  lowering::{AssocLowering, FunctionBuilder, Value},
};
use cinder_type::{
  BytePosition,
  file::SourceMap,
  span::Span,
  types::{TypeId, TypeStore},
};

/// Byte offset of `aa["k"]` on line 3 of [`SOURCE`].
const INDEX_OFFSET: u32 = 43;

const SOURCE: &str = "void main() {\n  int[string] aa;\n  auto v = aa[\"k\"];\n}\n";

/// A function under construction plus everything associative-array
/// lowering needs.
pub struct Fixture {
  pub types: TypeStore,
  pub sources: SourceMap,
  pub config: CinderConfig,
  pub builder: FunctionBuilder,
  pub span: Span,
}

impl Fixture {
  pub fn new() -> Self {
    Self::build(CinderConfig::quiet(), |types| types.i32())
  }

  pub fn returning(ret: impl FnOnce(&mut TypeStore) -> TypeId) -> Self {
    Self::build(CinderConfig::quiet(), ret)
  }

  pub fn build(
    config: CinderConfig,
    ret: impl FnOnce(&mut TypeStore) -> TypeId,
  ) -> Self {
    let mut types = TypeStore::new();
    let mut sources = SourceMap::new();
    let file = sources.add_file("main.cn", SOURCE.to_string());
    let span = Span::new(file, BytePosition(INDEX_OFFSET), BytePosition(INDEX_OFFSET + 7));

    let ret = ret(&mut types);
    let builder = FunctionBuilder::new("lookup", ret, span.clone());

    Self {
      types,
      sources,
      config,
      builder,
      span,
    }
  }

  pub fn assoc_type(
    &mut self,
    key: TypeId,
    value: TypeId,
  ) -> TypeId {
    self.types.assoc_array(key, value)
  }

  /// A mutable stack slot holding a `value[key]` array.
  pub fn aa_local(
    &mut self,
    name: &str,
    key: TypeId,
    value: TypeId,
  ) -> Value {
    let ty = self.assoc_type(key, value);
    let local = self.builder.alloc_local(LocalData {
      ty,
      mutable: true,
      name: Some(name.to_string()),
    });
    Value::Slot { local, ty }
  }

  pub fn string_key(
    &self,
    key: &str,
  ) -> Value {
    let ty = self.types.string();
    Value::Immediate {
      operand: Operand::Const(ConstValue::String(key.to_string(), ty)),
      ty,
    }
  }

  pub fn assoc(&mut self) -> AssocLowering<'_> {
    AssocLowering::new(&mut self.builder, &mut self.types, &self.sources, &self.config)
  }

  /// Returns `value` (loading it if it lives in memory) from the current block.
  pub fn ret(
    &mut self,
    value: &Value,
  ) {
    let operand = value.load(&mut self.builder, &self.span);
    self.builder.terminate(Terminator::Return(Some(operand)));
  }

  pub fn finish(self) -> (FunctionLir, TypeStore) {
    (self.builder.finish(), self.types)
  }

  pub fn print(self) -> String {
    let (func, types) = self.finish();
    let printed = LirPrinter::new(&func, &types).print();
    printed
  }
}
