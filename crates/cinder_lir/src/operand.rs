use cinder_type::types::TypeId;

use crate::{LocalId, TempId};

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
  /// Result of a previous instruction.
  Temp(TempId),
  Local(LocalId),
  Const(ConstValue),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
  Int(i64, TypeId),
  UInt(u64, TypeId),
  String(String, TypeId),
  Null(TypeId),
}

impl ConstValue {
  pub fn type_id(&self) -> TypeId {
    match self {
      ConstValue::Int(_, ty)
      | ConstValue::UInt(_, ty)
      | ConstValue::String(_, ty)
      | ConstValue::Null(ty) => *ty,
    }
  }
}
