use std::hash::{Hash, Hasher};
use std::{collections::HashMap, path::PathBuf};

use ahash::AHasher;

use crate::{BytePosition, Id, Store};

pub type FileId = Id<SourceFile>;

impl FileId {
  /// Sentinel for compiler-synthesized entities (delegate literals, length variables).
  pub const SYNTHETIC: FileId = FileId::new(u32::MAX);
}

impl std::fmt::Display for Id<SourceFile> {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "(file id: {})", self.index())
  }
}

#[derive(Default, Clone, Eq, PartialEq, Hash, Debug)]
pub struct SourceFile {
  pub path: PathBuf,
  pub text: String,
  pub line_starts: Vec<BytePosition>,
  pub hash: u64,
}

impl SourceFile {
  pub fn new(
    path: PathBuf,
    text: String,
  ) -> Self {
    let line_starts = compute_line_starts(&text);
    let hash = content_hash(&text);
    Self {
      path,
      text,
      line_starts,
      hash,
    }
  }
}

#[derive(Default)]
pub struct SourceMap {
  files: Store<SourceFile>,
  by_path: HashMap<PathBuf, FileId>,
}

impl SourceMap {
  pub fn new() -> Self {
    Self {
      files: Store::new(),
      by_path: HashMap::new(),
    }
  }

  pub fn add_file<P: Into<PathBuf>>(
    &mut self,
    path: P,
    text: String,
  ) -> FileId {
    let path = path.into();

    if let Some(id) = self.by_path.get(&path) {
      return *id;
    }

    let id = self.files.alloc(SourceFile::new(path.clone(), text));
    self.by_path.insert(path, id);
    id
  }

  #[inline]
  pub fn get(
    &self,
    id: &FileId,
  ) -> &SourceFile {
    self.files.get(id)
  }

  /// Display name used by runtime error calls; synthetic files map to `<synthetic>`.
  pub fn file_name(
    &self,
    id: &FileId,
  ) -> String {
    if *id == FileId::SYNTHETIC {
      return "<synthetic>".to_string();
    }

    self.get(id).path.display().to_string()
  }

  /// 1-based (line, column). Synthetic positions report (0, 0).
  pub fn line_col(
    &self,
    file: &FileId,
    pos: BytePosition,
  ) -> (u32, u32) {
    if *file == FileId::SYNTHETIC {
      return (0, 0);
    }

    let f = self.get(file);
    let line = upper_bound_line(&f.line_starts, pos);
    let line_start = f.line_starts[line].0 as usize;
    let end = (pos.0 as usize).min(f.text.len());
    let slice = &f.text.as_bytes()[line_start..end];
    let col = unicode_column(slice);

    ((line as u32) + 1, (col as u32) + 1)
  }
}

fn compute_line_starts(text: &str) -> Vec<BytePosition> {
  let mut v = vec![BytePosition(0)];

  for (i, b) in text.bytes().enumerate() {
    if b == b'\n' {
      v.push(BytePosition((i + 1) as u32));
    }
  }
  v
}

fn upper_bound_line(
  starts: &[BytePosition],
  pos: BytePosition,
) -> usize {
  let mut lo = 0usize;
  let mut hi = starts.len();
  while lo + 1 < hi {
    let mid = (lo + hi) / 2;
    if starts[mid].0 <= pos.0 { lo = mid } else { hi = mid }
  }
  lo
}

fn unicode_column(slice: &[u8]) -> usize {
  std::str::from_utf8(slice)
    .map(|s| s.chars().count())
    .unwrap_or(slice.len())
}

fn content_hash(text: &str) -> u64 {
  let mut h = AHasher::default();
  text.hash(&mut h);
  h.finish()
}
