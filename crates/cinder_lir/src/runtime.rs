use cinder_type::types::{TypeId, TypeStore};

/// Entry points of the runtime support library used by lowered code.
///
/// Associative arrays are opaque `void*` handles and type descriptors are
/// passed as `void*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeFunction {
  /// `void* _aaGetY(AA* aa, TypeInfo aati, size_t valuesize, void* pkey)`
  ///
  /// Returns the slot for `pkey`, inserting a zeroed one if missing.
  AaGetY,
  /// `void* _aaInX(AA aa, TypeInfo keyti, void* pkey)`
  ///
  /// Returns the slot for `pkey`, or null.
  AaInX,
  /// `bool _aaDelX(AA aa, TypeInfo keyti, void* pkey)`
  AaDelX,
  /// `int _aaEqual(TypeInfo ti, AA a, AA b)`
  AaEqual,
  /// `void _d_arraybounds(string file, uint line)`; does not return.
  ArrayBounds,
}

impl RuntimeFunction {
  pub fn name(&self) -> &'static str {
    match self {
      RuntimeFunction::AaGetY => "_aaGetY",
      RuntimeFunction::AaInX => "_aaInX",
      RuntimeFunction::AaDelX => "_aaDelX",
      RuntimeFunction::AaEqual => "_aaEqual",
      RuntimeFunction::ArrayBounds => "_d_arraybounds",
    }
  }

  pub fn is_noreturn(&self) -> bool {
    matches!(self, RuntimeFunction::ArrayBounds)
  }

  /// Parameter types and return type of the C prototype.
  pub fn signature(
    &self,
    types: &mut TypeStore,
  ) -> (Vec<TypeId>, TypeId) {
    let void_ptr = types.void_ptr();

    match self {
      RuntimeFunction::AaGetY => {
        let aa_ptr = types.pointer(void_ptr);
        (vec![aa_ptr, void_ptr, types.u64(), void_ptr], void_ptr)
      },
      RuntimeFunction::AaInX => (vec![void_ptr, void_ptr, void_ptr], void_ptr),
      RuntimeFunction::AaDelX => (vec![void_ptr, void_ptr, void_ptr], types.boolean()),
      RuntimeFunction::AaEqual => (vec![void_ptr, void_ptr, void_ptr], types.i32()),
      RuntimeFunction::ArrayBounds => (vec![types.string(), types.u32()], types.void()),
    }
  }
}

impl std::fmt::Display for RuntimeFunction {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.write_str(self.name())
  }
}
