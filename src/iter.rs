use std::{fmt, iter::FusedIterator, ptr, slice};

use crate::{array::DynamicArray, storage::Storage};

/// Owning iterator over the elements of a [`DynamicArray`].
///
/// Yields `[start, end)` of the array's former block; the block itself is
/// released when the iterator is dropped, together with any elements that
/// were never yielded.
pub struct IntoIter<T> {
  storage: Storage<T>,
  start: usize,
  end: usize,
}

impl<T> IntoIter<T> {
  /// The elements not yet yielded.
  pub fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.storage.address(self.start), self.end - self.start) }
  }
}

impl<T> Iterator for IntoIter<T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    if self.start == self.end {
      return None;
    }

    let value = unsafe { self.storage.address(self.start).read() };
    self.start += 1;
    Some(value)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = self.end - self.start;
    (remaining, Some(remaining))
  }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
  fn next_back(&mut self) -> Option<T> {
    if self.start == self.end {
      return None;
    }

    self.end -= 1;
    Some(unsafe { self.storage.address(self.end).read() })
  }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
  fn drop(&mut self) {
    let remaining = ptr::slice_from_raw_parts_mut(self.storage.address(self.start), self.end - self.start);
    self.start = self.end;
    unsafe { ptr::drop_in_place(remaining) };
  }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
  }
}

impl<T> IntoIterator for DynamicArray<T> {
  type Item = T;
  type IntoIter = IntoIter<T>;

  fn into_iter(self) -> IntoIter<T> {
    let (storage, len) = self.into_parts();

    IntoIter {
      storage,
      start: 0,
      end: len,
    }
  }
}
