use core::marker::PhantomData;

pub mod definition;
pub mod file;
pub mod span;
pub mod symbol;
pub mod types;
pub mod value;

#[repr(transparent)]
pub struct Id<T>(u32, PhantomData<fn() -> T>);

impl<T> Id<T> {
  pub const fn new(index: u32) -> Self {
    Self(index, PhantomData)
  }

  #[inline]
  pub fn index(&self) -> u32 {
    self.0
  }
}

impl<T> Clone for Id<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
  fn eq(
    &self,
    other: &Self,
  ) -> bool {
    self.0 == other.0
  }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
  fn partial_cmp(
    &self,
    other: &Self,
  ) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl<T> Ord for Id<T> {
  fn cmp(
    &self,
    other: &Self,
  ) -> std::cmp::Ordering {
    self.0.cmp(&other.0)
  }
}

impl<T> std::hash::Hash for Id<T> {
  fn hash<H: std::hash::Hasher>(
    &self,
    state: &mut H,
  ) {
    self.0.hash(state);
  }
}

impl<T> std::fmt::Debug for Id<T> {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "Id({})", self.0)
  }
}

impl<T> Default for Id<T> {
  fn default() -> Self {
    Self::new(0)
  }
}

#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BytePosition(pub u32);

impl std::fmt::Display for BytePosition {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store<T> {
  data: Vec<T>,
}

impl<T> Default for Store<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Store<T> {
  pub fn new() -> Self {
    Self { data: Vec::new() }
  }

  pub fn alloc(
    &mut self,
    v: T,
  ) -> Id<T> {
    let id = Id::new(self.data.len() as u32);
    self.data.push(v);
    id
  }

  pub fn get(
    &self,
    id: &Id<T>,
  ) -> &T {
    &self.data[id.0 as usize]
  }

  pub fn get_mut(
    &mut self,
    id: &Id<T>,
  ) -> &mut T {
    &mut self.data[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> {
    self.data.iter().enumerate().map(|(i, v)| (Id::new(i as u32), v))
  }
}
