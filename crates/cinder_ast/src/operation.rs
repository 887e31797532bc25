#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperation {
  Neg,
  Not,
  /// Bitwise complement (`~x`).
  Com,
  Deref,
  AddrOf,
  /// Conversion to the type of the enclosing expression.
  Cast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
  // Arithmetic
  Add,
  Sub,
  Mul,
  Div,
  Mod,

  // Bitwise
  And,
  Or,
  Xor,

  // Logical
  AndAnd,
  OrOr,

  // Comparison
  Equal,
  NotEqual,
  Less,
  Greater,
  Identity,

  Assign,
  Comma,
  /// Associative-array membership (`key in aa`).
  In,
  /// Array concatenation.
  Cat,
}

impl UnaryOperation {
  pub fn symbol(&self) -> &'static str {
    match self {
      UnaryOperation::Neg => "-",
      UnaryOperation::Not => "!",
      UnaryOperation::Com => "~",
      UnaryOperation::Deref => "*",
      UnaryOperation::AddrOf => "&",
      UnaryOperation::Cast => "cast",
    }
  }
}

impl BinaryOperation {
  pub fn symbol(&self) -> &'static str {
    match self {
      BinaryOperation::Add => "+",
      BinaryOperation::Sub => "-",
      BinaryOperation::Mul => "*",
      BinaryOperation::Div => "/",
      BinaryOperation::Mod => "%",
      BinaryOperation::And => "&",
      BinaryOperation::Or => "|",
      BinaryOperation::Xor => "^",
      BinaryOperation::AndAnd => "&&",
      BinaryOperation::OrOr => "||",
      BinaryOperation::Equal => "==",
      BinaryOperation::NotEqual => "!=",
      BinaryOperation::Less => "<",
      BinaryOperation::Greater => ">",
      BinaryOperation::Identity => "is",
      BinaryOperation::Assign => "=",
      BinaryOperation::Comma => ",",
      BinaryOperation::In => "in",
      BinaryOperation::Cat => "~",
    }
  }
}
