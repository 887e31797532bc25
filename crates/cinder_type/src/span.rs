use crate::{BytePosition, file::FileId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span {
  pub start: BytePosition,
  pub end: BytePosition,
  pub file: FileId,
}

impl Span {
  /// # Panics
  /// Panics in debug mode if `start > end`.
  pub fn new(
    file: FileId,
    start: BytePosition,
    end: BytePosition,
  ) -> Self {
    debug_assert!(
      start <= end,
      "Span::new() called with invalid range: start {} > end {}",
      start,
      end
    );
    Self { file, start, end }
  }

  pub fn merge(
    a: &Self,
    b: &Self,
  ) -> Self {
    debug_assert_eq!(a.file, b.file, "Cannot merge spans from different files");
    Self {
      file: a.file,
      start: a.start.min(b.start),
      end: a.end.max(b.end),
    }
  }

  /// Span for compiler-introduced entities that have no source text.
  pub fn synthetic() -> Self {
    Self {
      file: FileId::SYNTHETIC,
      start: BytePosition(0),
      end: BytePosition(0),
    }
  }

  pub fn len(&self) -> usize {
    self.end.0.saturating_sub(self.start.0) as usize
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn is_synthetic(&self) -> bool {
    self.file == FileId::SYNTHETIC
  }
}

impl std::fmt::Display for Span {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "(span start: {} end: {} file: {})", self.start, self.end, self.file)
  }
}
