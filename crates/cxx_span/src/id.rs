use std::marker::PhantomData;
use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Typed, non-zero identifier. Ids handed out by an [`IdAllocator`] double as arena indices.
#[derive(Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Id<T> {
    inner: NonZeroUsize,
    #[cfg_attr(feature = "serde", serde(skip))]
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// # Panics
    ///
    /// When `id` is zero.
    pub fn new(id: usize) -> Self {
        Id {
            inner: NonZeroUsize::new(id).expect("Id cannot be zero"),
            _marker: PhantomData,
        }
    }

    /// Id of the element stored at `index` of a zero based arena.
    pub fn from_index(index: usize) -> Self {
        Id::new(index.saturating_add(1))
    }

    pub fn index(self) -> usize {
        self.inner.get() - 1
    }

    pub fn next(self) -> Self {
        Id::new(self.inner.get().saturating_add(1))
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let type_name = std::any::type_name::<T>();
        let short_name = type_name.rsplit("::").next().unwrap_or(type_name);
        write!(f, "{}({})", short_name.trim_end_matches("Tag"), self.inner)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdAllocator<T: Copy> {
    next_id: Id<T>,
}

impl<T: Copy> IdAllocator<T> {
    pub fn new() -> Self {
        IdAllocator {
            next_id: Id::new(1),
        }
    }

    pub fn next_id(&mut self) -> Id<T> {
        let id = self.next_id;
        self.next_id = self.next_id.next();
        id
    }
}

impl<T: Copy> Default for IdAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}
