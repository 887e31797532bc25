use std::collections::HashMap;

use crate::{Id, Store};

pub type TypeId = Id<Type>;

/// Calling convention of a function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
  /// The language's own convention; delegate literals always use it.
  Native,
  C,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
  Void,
  Boolean,
  Char,
  I32,
  I64,
  U32,
  U64,
  F64,
  String,
  Null,

  Pointer(TypeId),
  /// Dynamic array (`T[]`): a length/pointer pair.
  Array {
    element: TypeId,
  },
  /// Associative array (`V[K]`), backed by the runtime support library.
  AssocArray {
    key: TypeId,
    value: TypeId,
  },
  Function {
    params: Vec<TypeId>,
    ret: TypeId,
    linkage: Linkage,
  },
  /// Context pointer plus function pointer. Always wraps a `Function` type.
  Delegate(TypeId),

  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FunctionKey {
  params: Vec<TypeId>,
  ret: TypeId,
  linkage: Linkage,
}

#[derive(Debug, Clone)]
pub struct TypeStore {
  types: Store<Type>,
  primitives: HashMap<Type, TypeId>,
  pointers: HashMap<TypeId, TypeId>,
  arrays: HashMap<TypeId, TypeId>,
  assoc_arrays: HashMap<(TypeId, TypeId), TypeId>,
  functions: HashMap<FunctionKey, TypeId>,
  delegates: HashMap<TypeId, TypeId>,
}

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}

impl TypeStore {
  pub fn new() -> Self {
    let mut store = Self {
      types: Store::new(),
      primitives: HashMap::new(),
      pointers: HashMap::new(),
      arrays: HashMap::new(),
      assoc_arrays: HashMap::new(),
      functions: HashMap::new(),
      delegates: HashMap::new(),
    };
    store.init_primitives();
    store
  }

  fn init_primitives(&mut self) {
    let primitives = [
      Type::Void,
      Type::Boolean,
      Type::Char,
      Type::I32,
      Type::I64,
      Type::U32,
      Type::U64,
      Type::F64,
      Type::String,
      Type::Null,
      Type::Error,
    ];

    for ty in primitives {
      let id = self.types.alloc(ty.clone());
      self.primitives.insert(ty, id);
    }
  }

  fn primitive(
    &self,
    ty: &Type,
  ) -> TypeId {
    self.primitives[ty]
  }

  pub fn void(&self) -> TypeId {
    self.primitive(&Type::Void)
  }

  pub fn boolean(&self) -> TypeId {
    self.primitive(&Type::Boolean)
  }

  pub fn char(&self) -> TypeId {
    self.primitive(&Type::Char)
  }

  pub fn i32(&self) -> TypeId {
    self.primitive(&Type::I32)
  }

  pub fn i64(&self) -> TypeId {
    self.primitive(&Type::I64)
  }

  pub fn u32(&self) -> TypeId {
    self.primitive(&Type::U32)
  }

  /// Also used as `size_t`.
  pub fn u64(&self) -> TypeId {
    self.primitive(&Type::U64)
  }

  pub fn f64(&self) -> TypeId {
    self.primitive(&Type::F64)
  }

  pub fn string(&self) -> TypeId {
    self.primitive(&Type::String)
  }

  pub fn null(&self) -> TypeId {
    self.primitive(&Type::Null)
  }

  pub fn error(&self) -> TypeId {
    self.primitive(&Type::Error)
  }

  pub fn pointer(
    &mut self,
    inner: TypeId,
  ) -> TypeId {
    if let Some(id) = self.pointers.get(&inner) {
      return *id;
    }

    let id = self.types.alloc(Type::Pointer(inner));
    self.pointers.insert(inner, id);
    id
  }

  /// `void*`, modelled as a pointer to `Void`.
  pub fn void_ptr(&mut self) -> TypeId {
    let void = self.void();
    self.pointer(void)
  }

  pub fn array(
    &mut self,
    element: TypeId,
  ) -> TypeId {
    if let Some(id) = self.arrays.get(&element) {
      return *id;
    }

    let id = self.types.alloc(Type::Array { element });
    self.arrays.insert(element, id);
    id
  }

  pub fn assoc_array(
    &mut self,
    key: TypeId,
    value: TypeId,
  ) -> TypeId {
    if let Some(id) = self.assoc_arrays.get(&(key, value)) {
      return *id;
    }

    let id = self.types.alloc(Type::AssocArray { key, value });
    self.assoc_arrays.insert((key, value), id);
    id
  }

  pub fn function(
    &mut self,
    params: Vec<TypeId>,
    ret: TypeId,
    linkage: Linkage,
  ) -> TypeId {
    let key = FunctionKey {
      params: params.clone(),
      ret,
      linkage,
    };

    if let Some(id) = self.functions.get(&key) {
      return *id;
    }

    let id = self.types.alloc(Type::Function { params, ret, linkage });
    self.functions.insert(key, id);
    id
  }

  /// # Panics
  /// Panics if `function` is not a function type.
  pub fn delegate(
    &mut self,
    function: TypeId,
  ) -> TypeId {
    assert!(
      matches!(self.get(&function), Type::Function { .. }),
      "delegate type must wrap a function type"
    );

    if let Some(id) = self.delegates.get(&function) {
      return *id;
    }

    let id = self.types.alloc(Type::Delegate(function));
    self.delegates.insert(function, id);
    id
  }

  pub fn get(
    &self,
    id: &TypeId,
  ) -> &Type {
    self.types.get(id)
  }

  pub fn is_error(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::Error)
  }

  pub fn is_void(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::Void)
  }

  pub fn is_delegate(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::Delegate(_))
  }

  pub fn is_assoc_array(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::AssocArray { .. })
  }

  /// Parameter and return types of a delegate or function pointer type.
  pub fn delegate_signature(
    &self,
    id: &TypeId,
  ) -> Option<(&[TypeId], TypeId)> {
    let function = match self.get(id) {
      Type::Delegate(f) | Type::Pointer(f) => f,
      Type::Function { .. } => id,
      _ => return None,
    };

    match self.get(function) {
      Type::Function { params, ret, .. } => Some((params.as_slice(), *ret)),
      _ => None,
    }
  }

  fn is_integral(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(
      self.get(id),
      Type::Boolean | Type::Char | Type::I32 | Type::I64 | Type::U32 | Type::U64
    )
  }

  fn integral_rank(
    &self,
    id: &TypeId,
  ) -> u8 {
    match self.get(id) {
      Type::Boolean => 0,
      Type::Char => 1,
      Type::I32 | Type::U32 => 2,
      Type::I64 | Type::U64 => 3,
      _ => u8::MAX,
    }
  }

  /// Whether `from` converts to `to` without an explicit cast.
  ///
  /// Error types convert both ways so one failure does not cascade.
  pub fn is_implicitly_convertible(
    &self,
    from: &TypeId,
    to: &TypeId,
  ) -> bool {
    if from == to || self.is_error(from) || self.is_error(to) {
      return true;
    }

    if self.is_integral(from) && self.is_integral(to) {
      return self.integral_rank(from) <= self.integral_rank(to);
    }

    match (self.get(from), self.get(to)) {
      (Type::Null, Type::Pointer(_) | Type::Array { .. } | Type::AssocArray { .. } | Type::Delegate(_)) => true,
      (Type::Pointer(_), Type::Pointer(inner)) => self.is_void(inner),
      _ => false,
    }
  }

  /// Storage size in bytes, padded to the natural alignment of the type.
  pub fn padded_size(
    &self,
    id: &TypeId,
  ) -> u64 {
    match self.get(id) {
      Type::Void | Type::Error => 0,
      Type::Boolean => 1,
      Type::Char | Type::I32 | Type::U32 => 4,
      Type::I64 | Type::U64 | Type::F64 => 8,
      Type::Pointer(_) | Type::AssocArray { .. } | Type::Function { .. } | Type::Null => 8,
      Type::String | Type::Array { .. } | Type::Delegate(_) => 16,
    }
  }
}

pub fn format_type(
  types: &TypeStore,
  id: &TypeId,
) -> String {
  match types.get(id) {
    Type::Void => "void".to_string(),
    Type::Boolean => "bool".to_string(),
    Type::Char => "char".to_string(),
    Type::I32 => "int".to_string(),
    Type::I64 => "long".to_string(),
    Type::U32 => "uint".to_string(),
    Type::U64 => "ulong".to_string(),
    Type::F64 => "double".to_string(),
    Type::String => "string".to_string(),
    Type::Null => "typeof(null)".to_string(),
    Type::Pointer(inner) => format!("{}*", format_type(types, inner)),
    Type::Array { element } => format!("{}[]", format_type(types, element)),
    Type::AssocArray { key, value } => format!("{}[{}]", format_type(types, value), format_type(types, key)),
    Type::Function { params, ret, linkage } => {
      let params: Vec<String> = params.iter().map(|p| format_type(types, p)).collect();
      let prefix = match linkage {
        Linkage::Native => "",
        Linkage::C => "extern(C) ",
      };
      format!("{}{} function({})", prefix, format_type(types, ret), params.join(", "))
    },
    Type::Delegate(function) => match types.get(function) {
      Type::Function { params, ret, .. } => {
        let params: Vec<String> = params.iter().map(|p| format_type(types, p)).collect();
        format!("{} delegate({})", format_type(types, ret), params.join(", "))
      },
      _ => "<invalid delegate>".to_string(),
    },
    Type::Error => "<error>".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn function_types_are_interned() {
    let mut types = TypeStore::new();
    let int = types.i32();

    let a = types.function(vec![], int, Linkage::Native);
    let b = types.function(vec![], int, Linkage::Native);
    let c = types.function(vec![], int, Linkage::C);

    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn delegate_signature_reports_zero_params() {
    let mut types = TypeStore::new();
    let long = types.i64();
    let tf = types.function(vec![], long, Linkage::Native);
    let dg = types.delegate(tf);

    let (params, ret) = types.delegate_signature(&dg).unwrap();
    assert!(params.is_empty());
    assert_eq!(ret, long);
    assert_eq!(format_type(&types, &dg), "long delegate()");
  }

  #[test]
  fn integral_widening_is_implicit() {
    let types = TypeStore::new();
    assert!(types.is_implicitly_convertible(&types.i32(), &types.i64()));
    assert!(!types.is_implicitly_convertible(&types.i64(), &types.i32()));
    assert!(!types.is_implicitly_convertible(&types.string(), &types.i32()));
    assert!(types.is_implicitly_convertible(&types.error(), &types.i32()));
  }

  #[test]
  fn assoc_array_formats_value_then_key() {
    let mut types = TypeStore::new();
    let string = types.string();
    let int = types.i32();
    let aa = types.assoc_array(string, int);
    assert_eq!(format_type(&types, &aa), "int[string]");
  }

  #[test]
  fn padded_size_of_assoc_array_values() {
    let mut types = TypeStore::new();
    let (boolean, int, string) = (types.boolean(), types.i32(), types.string());
    let aa = types.assoc_array(string, int);
    let tf = types.function(vec![], int, Linkage::Native);
    let dg = types.delegate(tf);

    assert_eq!(types.padded_size(&boolean), 1);
    assert_eq!(types.padded_size(&int), 4);
    assert_eq!(types.padded_size(&aa), 8);
    assert_eq!(types.padded_size(&string), 16);
    assert_eq!(types.padded_size(&dg), 16);
  }
}
