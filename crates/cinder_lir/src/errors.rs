use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoweringError {
  /// Both sides of an associative-array comparison must have the same type.
  AssocArrayTypeMismatch { left: String, right: String },
  NotAnAssocArray { context: String, found: String },
  /// The operation needs the address of a value that only exists in a register.
  NotAddressable { context: String, type_repr: String },
  UnsupportedOperator { context: String, operator: String },
}

impl LoweringError {
  pub fn not_an_assoc_array(
    context: impl Into<String>,
    found: impl Into<String>,
  ) -> Self {
    Self::NotAnAssocArray {
      context: context.into(),
      found: found.into(),
    }
  }

  pub fn not_addressable(
    context: impl Into<String>,
    type_repr: impl Into<String>,
  ) -> Self {
    Self::NotAddressable {
      context: context.into(),
      type_repr: type_repr.into(),
    }
  }

  pub fn unsupported_operator(
    context: impl Into<String>,
    operator: impl Into<String>,
  ) -> Self {
    Self::UnsupportedOperator {
      context: context.into(),
      operator: operator.into(),
    }
  }
}

impl fmt::Display for LoweringError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      LoweringError::AssocArrayTypeMismatch { left, right } => {
        write!(
          f,
          "associative array equality is only defined for arrays of the same type, found '{}' and '{}'",
          left, right
        )
      },
      LoweringError::NotAnAssocArray { context, found } => {
        write!(f, "{} expects an associative array, found '{}'", context, found)
      },
      LoweringError::NotAddressable { context, type_repr } => {
        write!(f, "{} needs an addressable value of type '{}'", context, type_repr)
      },
      LoweringError::UnsupportedOperator { context, operator } => {
        write!(f, "unsupported operator '{}' in {}", operator, context)
      },
    }
  }
}

impl std::error::Error for LoweringError {}
