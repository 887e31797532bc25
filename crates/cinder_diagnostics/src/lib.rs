pub mod diagnostic_report;
pub mod message;

use std::fmt;

use colored::*;
use diagnostic_report::{Diagnostic, Severity};
use cinder_type::{file::SourceMap, span::Span};

pub fn render(
  diag: &Diagnostic,
  sm: &SourceMap,
) {
  eprintln!("{}", DiagnosticRenderer::new(diag, sm));
}

pub fn render_batch(
  diagnostics: &[Diagnostic],
  sm: &SourceMap,
) {
  for diag in diagnostics {
    render(diag, sm);
  }
}

/// Formats a diagnostic with its source excerpt, labels and notes.
pub struct DiagnosticRenderer<'a> {
  diag: &'a Diagnostic,
  sources: &'a SourceMap,
}

impl<'a> DiagnosticRenderer<'a> {
  pub fn new(
    diag: &'a Diagnostic,
    sources: &'a SourceMap,
  ) -> Self {
    Self { diag, sources }
  }

  fn write_header(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let diag = self.diag;
    let title = diag.severity.title();
    let message = diag.message.bold();

    match diag.severity {
      Severity::Info => writeln!(
        f,
        "{}[{}]: {}",
        title.blue().bold(),
        diag.error_code.blue(),
        message
      ),
      Severity::Error => writeln!(
        f,
        "{}[{}]: {}",
        title.red().bold(),
        diag.error_code.red().bold(),
        message
      ),
    }
  }

  fn write_location(
    &self,
    f: &mut fmt::Formatter<'_>,
    span: &Span,
  ) -> fmt::Result {
    let arrow = "-->".blue().bold();

    // Synthesized code has no text to point at.
    if span.is_synthetic() {
      return writeln!(f, "  {} {}", arrow, "<synthetic>".bold());
    }

    let (line, col) = self.sources.line_col(&span.file, span.start);
    writeln!(
      f,
      "  {} {}:{}:{}",
      arrow,
      self.sources.file_name(&span.file).bold(),
      line,
      col
    )
  }

  fn write_snippet(
    &self,
    f: &mut fmt::Formatter<'_>,
    span: &Span,
    marker: ColoredString,
  ) -> fmt::Result {
    if span.is_synthetic() {
      return Ok(());
    }

    let file = self.sources.get(&span.file);
    let (line, col) = self.sources.line_col(&span.file, span.start);
    let (end_line, end_col) = self.sources.line_col(&span.file, span.end);
    let Some(text) = file.text.lines().nth((line as usize).saturating_sub(1)) else {
      return Ok(());
    };

    let width = if line == end_line {
      end_col.saturating_sub(col).max(1) as usize
    } else {
      text.len().saturating_sub(col as usize).max(1)
    };

    let pipe = "|".blue().bold();
    let gutter = " ".repeat(line.to_string().len());
    let indent = " ".repeat(col.saturating_sub(1) as usize);

    writeln!(f, "{} {}", gutter, pipe)?;
    writeln!(f, "{} {} {}", line.to_string().blue().bold(), pipe, text)?;
    writeln!(f, "{} {} {}{}", gutter, pipe, indent, marker.to_string().repeat(width))
  }
}

impl fmt::Display for DiagnosticRenderer<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let diag = self.diag;

    self.write_header(f)?;
    self.write_location(f, &diag.primary_span)?;

    let caret = match diag.severity {
      Severity::Error => "^".red().bold(),
      Severity::Info => "^".blue().bold(),
    };
    self.write_snippet(f, &diag.primary_span, caret)?;

    for label in &diag.labels {
      writeln!(f, "  {} {}", "label:".yellow().bold(), label.message)?;
      self.write_location(f, &label.span)?;
      self.write_snippet(f, &label.span, "-".yellow().bold())?;
    }

    for note in &diag.notes {
      writeln!(f, "  {} {}", "note:".cyan().bold(), note)?;
    }

    Ok(())
  }
}
