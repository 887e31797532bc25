//! Lowering helpers shared by the expression lowerers.
//!
//! A lowered expression is a [`Value`]: either an operand computed into a
//! temporary, the contents of a stack slot, or memory behind a pointer. The
//! distinction matters to operations that need an address, such as runtime
//! calls taking `void* pkey`.

pub mod assoc;
pub mod builder;

use cinder_type::{span::Span, types::{TypeId, TypeStore}};

pub use assoc::AssocLowering;
pub use builder::FunctionBuilder;

use crate::{Instr, LocalData, Operand};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Immediate { operand: Operand, ty: TypeId },
  Slot { local: crate::LocalId, ty: TypeId },
  Indirect { ptr: Operand, ty: TypeId },
}

impl Value {
  pub fn ty(&self) -> TypeId {
    match self {
      Value::Immediate { ty, .. } | Value::Slot { ty, .. } | Value::Indirect { ty, .. } => *ty,
    }
  }

  /// The value as an operand, loading it if it lives in memory.
  pub fn load(
    &self,
    builder: &mut FunctionBuilder,
    span: &Span,
  ) -> Operand {
    match self {
      Value::Immediate { operand, .. } => operand.clone(),
      Value::Slot { local, ty } => {
        let dest = builder.alloc_temp(*ty, span.clone());
        builder.emit(Instr::Load { dest, source: *local });
        Operand::Temp(dest)
      },
      Value::Indirect { ptr, ty } => {
        let dest = builder.alloc_temp(*ty, span.clone());
        builder.emit(Instr::LoadPtr { dest, ptr: ptr.clone() });
        Operand::Temp(dest)
      },
    }
  }

  /// Address of the value, or `None` for immediates.
  pub fn address(
    &self,
    builder: &mut FunctionBuilder,
    types: &mut TypeStore,
    span: &Span,
  ) -> Option<Operand> {
    match self {
      Value::Immediate { .. } => None,
      Value::Slot { local, ty } => {
        let ptr_ty = types.pointer(*ty);
        let dest = builder.alloc_temp(ptr_ty, span.clone());
        builder.emit(Instr::AddrOfLocal { dest, local: *local });
        Some(Operand::Temp(dest))
      },
      Value::Indirect { ptr, .. } => Some(ptr.clone()),
    }
  }
}

/// Address of `value`, spilling immediates into a fresh stack slot first.
pub fn make_lvalue(
  builder: &mut FunctionBuilder,
  types: &mut TypeStore,
  value: &Value,
  span: &Span,
) -> Operand {
  if let Some(address) = value.address(builder, types, span) {
    return address;
  }

  let ty = value.ty();
  let local = builder.alloc_local(LocalData {
    ty,
    mutable: true,
    name: Some("lvalue.tmp".to_string()),
  });
  let operand = value.load(builder, span);
  builder.emit(Instr::Store { dest: local, value: operand });

  let ptr_ty = types.pointer(ty);
  let dest = builder.alloc_temp(ptr_ty, span.clone());
  builder.emit(Instr::AddrOfLocal { dest, local });
  Operand::Temp(dest)
}

/// `operand` reinterpreted as `target`; emits nothing when the types already agree.
pub fn bit_cast(
  builder: &mut FunctionBuilder,
  operand: Operand,
  target: TypeId,
  span: &Span,
) -> Operand {
  if builder.operand_type(&operand) == target {
    return operand;
  }

  let dest = builder.alloc_temp(target, span.clone());
  builder.emit(Instr::BitCast {
    dest,
    source: operand,
    target_type: target,
  });
  Operand::Temp(dest)
}
