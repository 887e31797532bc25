use std::fmt;

use cinder_type::span::Span;

use super::diagnostic_report::{Diagnostic, Severity};

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticMessage {
  // #region Delegates
  DelegateReturnTypeMismatch {
    expected: String,
    found: String,
    literal: String,
    span: Span,
  },
  VoidDelegateReturnsValue {
    found: String,
    literal: String,
    span: Span,
  },
  MissingFunctionLiteralBody {
    name: String,
    span: Span,
  },
  NotAFunctionLiteral {
    found: String,
    span: Span,
  },
  // #endregion Delegates
  // #region Closures
  /// `captures` pairs each heap-allocated variable with its declaration.
  ClosureFrameOnHeap {
    function: String,
    captures: Vec<(String, Span)>,
    span: Span,
  },
  // #endregion Closures
}

impl fmt::Display for DiagnosticMessage {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      DiagnosticMessage::DelegateReturnTypeMismatch { expected, found, .. } => {
        write!(
          f,
          "Cannot implicitly convert expression of type '{}' to delegate return type '{}'",
          found, expected
        )
      },
      DiagnosticMessage::VoidDelegateReturnsValue { found, .. } => {
        write!(f, "Void delegate cannot return a value of type '{}'", found)
      },
      DiagnosticMessage::MissingFunctionLiteralBody { name, .. } => {
        write!(f, "Function literal '{}' has no body", name)
      },
      DiagnosticMessage::NotAFunctionLiteral { found, .. } => {
        write!(f, "Expected a function literal expression, found '{}'", found)
      },
      DiagnosticMessage::ClosureFrameOnHeap { function, captures, .. } => {
        let names: Vec<&str> = captures.iter().map(|(name, _)| name.as_str()).collect();
        write!(
          f,
          "Frame of '{}' is allocated on the heap because a delegate captures: {}",
          function,
          names.join(", ")
        )
      },
    }
  }
}

impl DiagnosticMessage {
  pub fn primary_span(&self) -> Span {
    match self {
      DiagnosticMessage::DelegateReturnTypeMismatch { span, .. }
      | DiagnosticMessage::VoidDelegateReturnsValue { span, .. }
      | DiagnosticMessage::MissingFunctionLiteralBody { span, .. }
      | DiagnosticMessage::NotAFunctionLiteral { span, .. }
      | DiagnosticMessage::ClosureFrameOnHeap { span, .. } => span.clone(),
    }
  }

  pub fn code(&self) -> String {
    match self {
      DiagnosticMessage::DelegateReturnTypeMismatch { .. } => "C0301",
      DiagnosticMessage::VoidDelegateReturnsValue { .. } => "C0302",
      DiagnosticMessage::MissingFunctionLiteralBody { .. } => "C0303",
      DiagnosticMessage::NotAFunctionLiteral { .. } => "C0304",
      DiagnosticMessage::ClosureFrameOnHeap { .. } => "C0401",
    }
    .to_string()
  }

  fn level(&self) -> Severity {
    match self {
      DiagnosticMessage::ClosureFrameOnHeap { .. } => Severity::Info,
      _ => Severity::Error,
    }
  }

  pub fn report(&self) -> Diagnostic {
    let diag = Diagnostic::new(self.level(), self.to_string(), self.code(), self.primary_span());

    match self {
      DiagnosticMessage::DelegateReturnTypeMismatch { literal, .. }
      | DiagnosticMessage::VoidDelegateReturnsValue { literal, .. } => {
        diag.with_note(format!("while checking the body of delegate literal '{}'", literal))
      },
      DiagnosticMessage::ClosureFrameOnHeap { captures, .. } => captures.iter().fold(diag, |diag, (name, span)| {
        diag.with_label(span.clone(), format!("'{}' is captured by a delegate", name))
      }),
      _ => diag,
    }
  }
}
