use cinder_type::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
  /// Reports a code-generation decision, such as a frame moved to the heap.
  Info,
}

impl Severity {
  pub fn title(&self) -> &'static str {
    match self {
      Severity::Error => "Error",
      Severity::Info => "Info",
    }
  }
}

/// A secondary location, e.g. each variable that forced a heap frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
  pub span: Span,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
  pub severity: Severity,
  pub message: String,
  pub error_code: String,
  pub primary_span: Span,
  pub labels: Vec<Label>,
  pub notes: Vec<String>,
}

impl Diagnostic {
  pub fn new(
    severity: Severity,
    message: String,
    error_code: String,
    primary_span: Span,
  ) -> Self {
    Self {
      severity,
      message,
      error_code,
      primary_span,
      labels: Vec::new(),
      notes: Vec::new(),
    }
  }

  pub fn with_label(
    mut self,
    span: Span,
    message: impl Into<String>,
  ) -> Self {
    self.labels.push(Label {
      span,
      message: message.into(),
    });
    self
  }

  pub fn with_note(
    mut self,
    note: impl Into<String>,
  ) -> Self {
    self.notes.push(note.into());
    self
  }

  pub fn is_error(&self) -> bool {
    self.severity == Severity::Error
  }
}
