//! Associative arrays are implemented by the runtime support library; these
//! lowerings turn `aa[key]`, `key in aa`, `aa.remove(key)` and `aa == bb`
//! into calls to it.

use cinder_ast::{BinaryOperation, UnaryOperation};
use cinder_config::{CinderConfig, DebugTrace};
use cinder_log::trace_dbg;
use cinder_type::{
  file::SourceMap,
  span::Span,
  types::{Type, TypeId, TypeStore, format_type},
};

use super::{FunctionBuilder, Value, bit_cast, make_lvalue};
use crate::{ConstValue, Instr, LoweringError, Operand, RuntimeFunction, Terminator};

pub struct AssocLowering<'a> {
  builder: &'a mut FunctionBuilder,
  types: &'a mut TypeStore,
  sources: &'a SourceMap,
  config: &'a CinderConfig,
}

impl<'a> AssocLowering<'a> {
  pub fn new(
    builder: &'a mut FunctionBuilder,
    types: &'a mut TypeStore,
    sources: &'a SourceMap,
    config: &'a CinderConfig,
  ) -> Self {
    Self {
      builder,
      types,
      sources,
      config,
    }
  }

  /// `aa[key]`, yielding the value slot.
  ///
  /// As an lvalue the slot is created if missing (`_aaGetY`). As an rvalue
  /// the lookup goes through `_aaInX` and, with bounds checks enabled, a
  /// missing key calls `_d_arraybounds` with the source location.
  pub fn lower_aa_index(
    &mut self,
    aa: &Value,
    key: &Value,
    value_type: TypeId,
    lvalue: bool,
    span: &Span,
  ) -> Result<Value, LoweringError> {
    let key_type = self.key_type(aa, "associative array index")?;
    let func = if lvalue {
      RuntimeFunction::AaGetY
    } else {
      RuntimeFunction::AaInX
    };
    let (params, _) = func.signature(self.types);

    trace_dbg!(
      self.config,
      DebugTrace::Lir,
      "{} on {}",
      func,
      format_type(self.types, &aa.ty())
    );

    let aa_val = if lvalue {
      let address = aa.address(self.builder, self.types, span);
      address.ok_or_else(|| {
        LoweringError::not_addressable(
          "associative array insertion",
          format_type(self.types, &aa.ty()),
        )
      })?
    } else {
      aa.load(self.builder, span)
    };
    let aa_val = bit_cast(self.builder, aa_val, params[0], span);

    let pkey = make_lvalue(self.builder, self.types, key, span);
    let pkey = bit_cast(self.builder, pkey, params[if lvalue { 3 } else { 2 }], span);

    let args = if lvalue {
      let aati = self.type_info(aa.ty(), span);
      let aati = bit_cast(self.builder, aati, params[1], span);
      let valsize = ConstValue::UInt(self.types.padded_size(&value_type), self.types.u64());
      vec![aa_val, aati, Operand::Const(valsize), pkey]
    } else {
      let keyti = self.type_info(key_type, span);
      let keyti = bit_cast(self.builder, keyti, params[1], span);
      vec![aa_val, keyti, pkey]
    };

    let ret = self.call(func, args, span);
    let target = self.types.pointer(value_type);
    let ret = bit_cast(self.builder, ret, target, span);

    // Insertion never fails, so only lookups are checked.
    if !lvalue && self.config.codegen.bounds_checks {
      self.bounds_check(&ret, span);
    }

    Ok(Value::Indirect {
      ptr: ret,
      ty: value_type,
    })
  }

  /// `key in aa`: pointer to the value, or null.
  pub fn lower_aa_in(
    &mut self,
    aa: &Value,
    key: &Value,
    result_type: TypeId,
    span: &Span,
  ) -> Result<Value, LoweringError> {
    let key_type = self.key_type(aa, "'in' expression")?;
    let func = RuntimeFunction::AaInX;
    let (params, _) = func.signature(self.types);

    let aa_val = aa.load(self.builder, span);
    let aa_val = bit_cast(self.builder, aa_val, params[0], span);

    let keyti = self.type_info(key_type, span);
    let keyti = bit_cast(self.builder, keyti, params[1], span);

    let pkey = make_lvalue(self.builder, self.types, key, span);
    let pkey = bit_cast(self.builder, pkey, params[2], span);

    let ret = self.call(func, vec![aa_val, keyti, pkey], span);
    let ret = bit_cast(self.builder, ret, result_type, span);

    Ok(Value::Immediate {
      operand: ret,
      ty: result_type,
    })
  }

  /// `aa.remove(key)`: whether an entry was removed.
  pub fn lower_aa_remove(
    &mut self,
    aa: &Value,
    key: &Value,
    span: &Span,
  ) -> Result<Value, LoweringError> {
    let key_type = self.key_type(aa, "associative array removal")?;
    let func = RuntimeFunction::AaDelX;
    let (params, ret_type) = func.signature(self.types);

    let aa_val = aa.load(self.builder, span);
    let aa_val = bit_cast(self.builder, aa_val, params[0], span);

    let keyti = self.type_info(key_type, span);
    let keyti = bit_cast(self.builder, keyti, params[1], span);

    let pkey = make_lvalue(self.builder, self.types, key, span);
    let pkey = bit_cast(self.builder, pkey, params[2], span);

    let ret = self.call(func, vec![aa_val, keyti, pkey], span);

    Ok(Value::Immediate {
      operand: ret,
      ty: ret_type,
    })
  }

  /// `lhs == rhs` or `lhs != rhs` on two associative arrays of the same type.
  pub fn lower_aa_equals(
    &mut self,
    op: BinaryOperation,
    lhs: &Value,
    rhs: &Value,
    span: &Span,
  ) -> Result<Value, LoweringError> {
    let negate = match op {
      BinaryOperation::Equal => false,
      BinaryOperation::NotEqual => true,
      other => {
        return Err(LoweringError::unsupported_operator(
          "associative array comparison",
          other.symbol(),
        ));
      },
    };

    if lhs.ty() != rhs.ty() {
      return Err(LoweringError::AssocArrayTypeMismatch {
        left: format_type(self.types, &lhs.ty()),
        right: format_type(self.types, &rhs.ty()),
      });
    }
    self.key_type(lhs, "associative array comparison")?;

    let func = RuntimeFunction::AaEqual;
    let (params, _) = func.signature(self.types);

    let left = lhs.load(self.builder, span);
    let left = bit_cast(self.builder, left, params[1], span);
    let right = rhs.load(self.builder, span);
    let right = bit_cast(self.builder, right, params[2], span);
    let type_info = self.type_info(lhs.ty(), span);

    let res = self.call(func, vec![type_info, left, right], span);

    let boolean = self.types.boolean();
    let zero = Operand::Const(ConstValue::Int(0, self.types.i32()));
    let cmp = self.builder.alloc_temp(boolean, span.clone());
    self.builder.emit(Instr::BinOp {
      dest: cmp,
      op: BinaryOperation::NotEqual,
      left: res,
      right: zero,
    });

    let mut result = Operand::Temp(cmp);
    if negate {
      let not = self.builder.alloc_temp(boolean, span.clone());
      self.builder.emit(Instr::UnaryOp {
        dest: not,
        op: UnaryOperation::Not,
        operand: result,
      });
      result = Operand::Temp(not);
    }

    Ok(Value::Immediate {
      operand: result,
      ty: boolean,
    })
  }

  fn key_type(
    &self,
    aa: &Value,
    context: &str,
  ) -> Result<TypeId, LoweringError> {
    match self.types.get(&aa.ty()) {
      Type::AssocArray { key, .. } => Ok(*key),
      _ => Err(LoweringError::not_an_assoc_array(
        context,
        format_type(self.types, &aa.ty()),
      )),
    }
  }

  fn type_info(
    &mut self,
    ty: TypeId,
    span: &Span,
  ) -> Operand {
    let void_ptr = self.types.void_ptr();
    let dest = self.builder.alloc_temp(void_ptr, span.clone());
    self.builder.emit(Instr::TypeInfo { dest, ty });
    Operand::Temp(dest)
  }

  fn call(
    &mut self,
    func: RuntimeFunction,
    args: Vec<Operand>,
    span: &Span,
  ) -> Operand {
    let (_, ret) = func.signature(self.types);
    let dest = self.builder.alloc_temp(ret, span.clone());
    self.builder.emit(Instr::RuntimeCall {
      dest: Some(dest),
      func,
      args,
    });
    Operand::Temp(dest)
  }

  /// Branch to a `_d_arraybounds` call when `ptr` is null; continues in the
  /// non-null block.
  fn bounds_check(
    &mut self,
    ptr: &Operand,
    span: &Span,
  ) {
    let fail = self.builder.create_block("aaboundscheckfail");
    let ok = self.builder.create_block("aaboundsok");

    let ptr_ty = self.builder.operand_type(ptr);
    let cond = self.builder.alloc_temp(self.types.boolean(), span.clone());
    self.builder.emit(Instr::BinOp {
      dest: cond,
      op: BinaryOperation::NotEqual,
      left: Operand::Const(ConstValue::Null(ptr_ty)),
      right: ptr.clone(),
    });
    self.builder.terminate(Terminator::Branch {
      condition: Operand::Temp(cond),
      then_block: ok,
      else_block: fail,
    });

    self.builder.switch_to_block(fail);
    let file = self.sources.file_name(&span.file);
    let (line, _) = self.sources.line_col(&span.file, span.start);
    let args = vec![
      Operand::Const(ConstValue::String(file, self.types.string())),
      Operand::Const(ConstValue::UInt(u64::from(line), self.types.u32())),
    ];
    self.builder.emit(Instr::RuntimeCall {
      dest: None,
      func: RuntimeFunction::ArrayBounds,
      args,
    });
    debug_assert!(RuntimeFunction::ArrayBounds.is_noreturn());
    self.builder.terminate(Terminator::Unreachable);

    self.builder.switch_to_block(ok);
  }
}
