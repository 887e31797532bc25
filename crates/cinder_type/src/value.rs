use std::fmt::Display;

use ordered_float::OrderedFloat;

#[derive(Debug, PartialEq, Clone, Hash, Eq)]
pub enum LiteralValue {
  Int(i64),
  UnsignedInt(u64),
  Float(OrderedFloat<f64>),
  Boolean(bool),
  Char(char),
  String(String),
  Null,
}

impl Display for LiteralValue {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      LiteralValue::Int(i) => write!(f, "{}", i),
      LiteralValue::UnsignedInt(u) => write!(f, "{}u", u),
      LiteralValue::Float(v) => write!(f, "{}", v),
      LiteralValue::Boolean(b) => write!(f, "{}", b),
      LiteralValue::Char(c) => write!(f, "'{}'", c.escape_default()),
      LiteralValue::String(s) => write!(f, "\"{}\"", s.escape_default()),
      LiteralValue::Null => write!(f, "null"),
    }
  }
}
