use cinder_ast::{BinaryOperation, UnaryOperation};
use cinder_type::types::TypeId;

use crate::{LocalId, Operand, RuntimeFunction, TempId};

/// A single LIR instruction (TAC form: at most one operation, result in a temp).
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
  /// `dest = *local`
  Load { dest: TempId, source: LocalId },

  /// `*local = value`
  Store { dest: LocalId, value: Operand },

  /// `dest = *ptr`
  LoadPtr { dest: TempId, ptr: Operand },

  /// `dest = &local`
  AddrOfLocal { dest: TempId, local: LocalId },

  /// Reinterpret `source` as `target_type` without changing its bits.
  BitCast {
    dest: TempId,
    source: Operand,
    target_type: TypeId,
  },

  /// Address of the runtime type descriptor for `ty`.
  TypeInfo { dest: TempId, ty: TypeId },

  /// `dest = func(args...)` into the runtime support library.
  RuntimeCall {
    dest: Option<TempId>,
    func: RuntimeFunction,
    args: Vec<Operand>,
  },

  /// `dest = left op right`
  BinOp {
    dest: TempId,
    op: BinaryOperation,
    left: Operand,
    right: Operand,
  },

  /// `dest = op operand`
  UnaryOp {
    dest: TempId,
    op: UnaryOperation,
    operand: Operand,
  },
}
