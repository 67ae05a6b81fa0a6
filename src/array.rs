//! The growable sequence built on top of [`Storage`].
//!
//! ```text
//!   DynamicArray { storage, len = 3 }
//!
//!   ┌───────┬───────┬───────┬───────┬───────┬───────┬───────┬───────┐
//!   │   a   │   b   │   c   │  ???  │  ???  │  ???  │  ???  │  ???  │
//!   └───────┴───────┴───────┴───────┴───────┴───────┴───────┴───────┘
//!   ◄──── live [0, len) ────►◄────── uninitialized [len, capacity) ──►
//! ```
//!
//! Every path that builds new elements does so before touching the live
//! range, so a panicking constructor leaves the array exactly as it was.

use std::{
  fmt,
  hash::{Hash, Hasher},
  mem::{self, MaybeUninit},
  ops::{Deref, DerefMut, Index, IndexMut},
  ptr,
  slice::{self, SliceIndex},
};

use crate::{
  check::precondition,
  error::{StorageError, handle_storage_error},
  storage::Storage,
};

/// Capacity of the first block allocated by a growing push.
const MIN_NON_ZERO_CAPACITY: usize = 1;

const GROWTH_FACTOR: usize = 2;

/// A contiguous, growable array of `T`.
///
/// Unlike `Vec`, the storage layer is an explicit [`Storage`] value and the
/// growth policy is fixed: a full array doubles its capacity (starting at
/// one).
///
/// ```rust
/// use rvector::DynamicArray;
///
/// let mut numbers = DynamicArray::new();
/// numbers.push_back(1);
/// numbers.push_back(2);
/// numbers.push_back(4);
///
/// numbers.insert(2, 3);
/// assert_eq!(numbers, [1, 2, 3, 4]);
///
/// numbers.erase(0);
/// assert_eq!(numbers.as_slice(), &[2, 3, 4]);
/// assert_eq!(numbers.capacity(), 4);
/// ```
pub struct DynamicArray<T> {
  storage: Storage<T>,
  len: usize,
}

impl<T> DynamicArray<T> {
  /// An empty array. Does not allocate.
  pub const fn new() -> Self {
    Self {
      storage: Storage::new(),
      len: 0,
    }
  }

  /// An empty array with room for exactly `capacity` elements.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      storage: Storage::allocate(capacity),
      len: 0,
    }
  }

  pub fn try_with_capacity(capacity: usize) -> Result<Self, StorageError> {
    Ok(Self {
      storage: Storage::try_allocate(capacity)?,
      len: 0,
    })
  }

  /// An array of `len` default-constructed elements.
  pub fn with_len(len: usize) -> Self
  where
    T: Default,
  {
    let mut array = Self::with_capacity(len);
    unsafe { array.construct_tail(len, |_| T::default()) };
    array
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn capacity(&self) -> usize {
    self.storage.capacity()
  }

  pub fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.storage.as_ptr(), self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    unsafe { slice::from_raw_parts_mut(self.storage.as_mut_ptr(), self.len) }
  }

  pub fn as_ptr(&self) -> *const T {
    self.storage.as_ptr()
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.storage.as_mut_ptr()
  }

  /// The uninitialized slots `[len, capacity)`.
  pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
    let len = self.len;
    &mut self.storage.as_uninit_slice_mut()[len..]
  }

  /// # Safety
  ///
  /// `index < len`. Checked only with `debug_assertions` or the `checked`
  /// feature.
  pub unsafe fn get_unchecked(
    &self,
    index: usize,
  ) -> &T {
    precondition!(index < self.len, "index {index} out of range for length {}", self.len);
    unsafe { &*self.storage.address(index) }
  }

  /// # Safety
  ///
  /// `index < len`. Checked only with `debug_assertions` or the `checked`
  /// feature.
  pub unsafe fn get_unchecked_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    precondition!(index < self.len, "index {index} out of range for length {}", self.len);
    unsafe { &mut *self.storage.address(index) }
  }

  /// Grows the capacity to exactly `new_capacity`. Does nothing if the array
  /// can already hold that many elements.
  pub fn reserve(
    &mut self,
    new_capacity: usize,
  ) {
    if let Err(err) = self.try_reserve(new_capacity) {
      handle_storage_error(err);
    }
  }

  /// Like [`reserve`](Self::reserve), but reports allocation failure. On
  /// error the array is untouched.
  pub fn try_reserve(
    &mut self,
    new_capacity: usize,
  ) -> Result<(), StorageError> {
    if new_capacity <= self.capacity() {
      return Ok(());
    }

    let mut relocated: Storage<T> = Storage::try_allocate(new_capacity)?;

    tracing::trace!(
      len = self.len,
      from = self.capacity(),
      to = new_capacity,
      "reserving dynamic array storage"
    );

    unsafe { relocate(self.storage.as_ptr(), relocated.as_mut_ptr(), self.len) };
    self.storage.swap(&mut relocated);

    Ok(())
  }

  /// Resizes to `new_len`, filling new slots with `T::default()`.
  pub fn resize(
    &mut self,
    new_len: usize,
  ) where
    T: Default,
  {
    self.resize_with(new_len, T::default);
  }

  /// Resizes to `new_len`, filling new slots with values returned by `f`.
  ///
  /// If `f` panics, the elements it already produced are dropped and the
  /// length is unchanged. Capacity reserved for the call is kept.
  pub fn resize_with<F>(
    &mut self,
    new_len: usize,
    mut f: F,
  ) where
    F: FnMut() -> T,
  {
    if new_len <= self.len {
      self.truncate(new_len);
      return;
    }

    self.reserve(new_len);
    unsafe { self.construct_tail(new_len - self.len, |_| f()) };
  }

  pub fn push_back(
    &mut self,
    value: T,
  ) {
    self.emplace_back(|| value);
  }

  /// Pushes a clone of `value`. The clone is built before any existing
  /// element moves, so a panicking `clone` leaves the array unchanged.
  pub fn push_back_cloned(
    &mut self,
    value: &T,
  ) where
    T: Clone,
  {
    self.emplace_back(|| value.clone());
  }

  pub fn try_push_back(
    &mut self,
    value: T,
  ) -> Result<(), StorageError> {
    self.try_emplace_back(|| value).map(|_| ())
  }

  /// Appends the value produced by `f` and returns a reference to it.
  ///
  /// When the array is full, a block of twice the capacity is allocated and
  /// the new value is constructed there first; existing elements move over
  /// only once that succeeded.
  pub fn emplace_back<F>(
    &mut self,
    f: F,
  ) -> &mut T
  where
    F: FnOnce() -> T,
  {
    match self.try_emplace_back(f) {
      Ok(value) => value,
      Err(err) => handle_storage_error(err),
    }
  }

  pub fn try_emplace_back<F>(
    &mut self,
    f: F,
  ) -> Result<&mut T, StorageError>
  where
    F: FnOnce() -> T,
  {
    let pos = self.len;
    self.try_emplace_at(pos, f)?;
    Ok(unsafe { &mut *self.storage.address(pos) })
  }

  /// Removes and returns the last element, or `None` if empty.
  pub fn pop_back(&mut self) -> Option<T> {
    if self.len == 0 {
      return None;
    }

    Some(unsafe { self.pop_back_unchecked() })
  }

  /// # Safety
  ///
  /// The array must not be empty. Checked only with `debug_assertions` or the
  /// `checked` feature.
  pub unsafe fn pop_back_unchecked(&mut self) -> T {
    precondition!(self.len > 0, "pop_back on an empty DynamicArray");
    self.len -= 1;
    unsafe { self.storage.address(self.len).read() }
  }

  /// Inserts `value` at `pos`, shifting `[pos, len)` one slot up.
  ///
  /// # Panics
  ///
  /// Panics if `pos > len`.
  #[track_caller]
  pub fn insert(
    &mut self,
    pos: usize,
    value: T,
  ) -> &mut T {
    self.emplace(pos, || value)
  }

  #[track_caller]
  pub fn insert_cloned(
    &mut self,
    pos: usize,
    value: &T,
  ) -> &mut T
  where
    T: Clone,
  {
    self.emplace(pos, || value.clone())
  }

  /// Inserts the value produced by `f` at `pos`.
  ///
  /// `f` runs before any element is shifted or relocated, so a panic in it
  /// leaves the array unchanged, on both the in-place and the growing path.
  ///
  /// # Panics
  ///
  /// Panics if `pos > len`.
  #[track_caller]
  pub fn emplace<F>(
    &mut self,
    pos: usize,
    f: F,
  ) -> &mut T
  where
    F: FnOnce() -> T,
  {
    if pos > self.len {
      insert_position_out_of_range(pos, self.len);
    }

    if let Err(err) = self.try_emplace_at(pos, f) {
      handle_storage_error(err);
    }

    unsafe { &mut *self.storage.address(pos) }
  }

  /// Drops the element at `pos` and shifts the tail down. Returns `pos`,
  /// which now names the element that followed the erased one.
  ///
  /// # Panics
  ///
  /// Panics if `pos >= len`.
  #[track_caller]
  pub fn erase(
    &mut self,
    pos: usize,
  ) -> usize {
    drop(self.remove(pos));
    pos
  }

  /// Removes and returns the element at `pos`, shifting the tail down.
  /// Capacity is unchanged.
  ///
  /// # Panics
  ///
  /// Panics if `pos >= len`.
  #[track_caller]
  pub fn remove(
    &mut self,
    pos: usize,
  ) -> T {
    if pos >= self.len {
      remove_position_out_of_range(pos, self.len);
    }

    unsafe {
      let slot = self.storage.address(pos);
      let value = slot.read();
      ptr::copy(slot.add(1), slot, self.len - pos - 1);
      self.len -= 1;
      value
    }
  }

  /// Drops `[new_len, len)`. Does nothing if `new_len >= len`.
  pub fn truncate(
    &mut self,
    new_len: usize,
  ) {
    if new_len >= self.len {
      return;
    }

    let tail = ptr::slice_from_raw_parts_mut(self.storage.address(new_len), self.len - new_len);
    // Shorten first: a panicking `Drop` must not lead to a second drop.
    self.len = new_len;
    unsafe { ptr::drop_in_place(tail) };
  }

  pub fn clear(&mut self) {
    self.truncate(0);
  }

  /// Exchanges contents, including storage, with `other`.
  ///
  /// This shadows the slice's `swap(i, j)`; use `as_mut_slice().swap(i, j)`
  /// to exchange two elements.
  pub fn swap(
    &mut self,
    other: &mut Self,
  ) {
    self.storage.swap(&mut other.storage);
    mem::swap(&mut self.len, &mut other.len);
  }

  /// Move assignment: drops the current contents, takes over `other`'s
  /// storage and elements, and leaves `other` empty with no block.
  pub fn move_from(
    &mut self,
    other: &mut Self,
  ) {
    *self = mem::take(other);
  }

  pub fn extend_from_slice(
    &mut self,
    values: &[T],
  ) where
    T: Clone,
  {
    self.reserve_additional(values.len());
    let start = self.len;
    unsafe { self.construct_tail(values.len(), |i| values[i - start].clone()) };
  }

  pub(crate) fn into_parts(self) -> (Storage<T>, usize) {
    let mut this = mem::ManuallyDrop::new(self);
    (this.storage.take(), this.len)
  }

  /// Makes room for `additional` more elements, doubling if that is larger.
  fn reserve_additional(
    &mut self,
    additional: usize,
  ) {
    let Some(needed) = self.len.checked_add(additional) else {
      handle_storage_error(StorageError::CapacityOverflow {
        requested: usize::MAX,
      });
    };

    if needed > self.capacity() {
      self.reserve(needed.max(self.capacity().saturating_mul(GROWTH_FACTOR)));
    }
  }

  fn grown_capacity(&self) -> Result<usize, StorageError> {
    match self.capacity() {
      0 => Ok(MIN_NON_ZERO_CAPACITY),
      capacity => capacity
        .checked_mul(GROWTH_FACTOR)
        .ok_or(StorageError::CapacityOverflow {
          requested: capacity.saturating_mul(GROWTH_FACTOR),
        }),
    }
  }

  /// Inserts `f()` at `pos <= len`.
  fn try_emplace_at<F>(
    &mut self,
    pos: usize,
    f: F,
  ) -> Result<(), StorageError>
  where
    F: FnOnce() -> T,
  {
    if self.len < self.capacity() {
      let value = f();

      unsafe {
        let slot = self.storage.address(pos);
        ptr::copy(slot, slot.add(1), self.len - pos);
        slot.write(value);
      }
    } else {
      self.grow_with(pos, f)?;
    }

    self.len += 1;

    Ok(())
  }

  /// Moves everything into a block of twice the capacity, leaving a gap at
  /// `pos` filled with `f()`. Does not update `len`.
  fn grow_with<F>(
    &mut self,
    pos: usize,
    f: F,
  ) -> Result<(), StorageError>
  where
    F: FnOnce() -> T,
  {
    let new_capacity = self.grown_capacity()?;
    let mut relocated: Storage<T> = Storage::try_allocate(new_capacity)?;

    tracing::trace!(
      len = self.len,
      from = self.capacity(),
      to = new_capacity,
      "growing dynamic array"
    );

    // If `f` panics, `relocated` only frees its block and the old one is
    // still intact.
    let value = f();

    unsafe {
      relocated.address(pos).write(value);
      relocate(self.storage.as_ptr(), relocated.as_mut_ptr(), pos);
      relocate(self.storage.address(pos), relocated.address(pos + 1), self.len - pos);
    }

    self.storage.swap(&mut relocated);

    Ok(())
  }

  /// Builds `count` elements in the spare slots and commits them in one step.
  ///
  /// # Safety
  ///
  /// `len + count <= capacity`.
  unsafe fn construct_tail<F>(
    &mut self,
    count: usize,
    mut f: F,
  ) where
    F: FnMut(usize) -> T,
  {
    let start = self.len;
    let mut tail = TailGuard {
      base: self.storage.address(start),
      constructed: 0,
    };

    for i in 0..count {
      let value = f(start + i);
      unsafe { tail.base.add(i).write(value) };
      tail.constructed += 1;
    }

    mem::forget(tail);
    self.len += count;
  }
}

/// Drops a run of freshly constructed elements unless forgotten.
struct TailGuard<T> {
  base: *mut T,
  constructed: usize,
}

impl<T> Drop for TailGuard<T> {
  fn drop(&mut self) {
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.base, self.constructed)) };
  }
}

/// Transfers `count` elements between blocks. Moves in Rust cannot fail,
/// so this is always a bitwise move and the source slots become
/// uninitialized.
unsafe fn relocate<T>(
  from: *const T,
  to: *mut T,
  count: usize,
) {
  unsafe { ptr::copy_nonoverlapping(from, to, count) };
}

#[cold]
#[track_caller]
fn insert_position_out_of_range(
  pos: usize,
  len: usize,
) -> ! {
  panic!("insertion position (is {pos}) should be <= len (is {len})");
}

#[cold]
#[track_caller]
fn remove_position_out_of_range(
  pos: usize,
  len: usize,
) -> ! {
  panic!("removal position (is {pos}) should be < len (is {len})");
}

impl<T> Drop for DynamicArray<T> {
  fn drop(&mut self) {
    unsafe { ptr::drop_in_place(self.as_mut_slice()) };
  }
}

impl<T> Default for DynamicArray<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone> Clone for DynamicArray<T> {
  /// Deep copy into a block sized exactly to `len`.
  fn clone(&self) -> Self {
    let mut copy = Self::with_capacity(self.len);
    unsafe { copy.construct_tail(self.len, |i| self[i].clone()) };
    copy
  }

  /// Copy assignment. Reuses the current block when it is large enough,
  /// otherwise builds a full copy and swaps it in.
  fn clone_from(
    &mut self,
    source: &Self,
  ) {
    if source.len > self.capacity() {
      let mut copy = source.clone();
      self.swap(&mut copy);
      return;
    }

    let common = self.len.min(source.len);
    self.as_mut_slice()[..common].clone_from_slice(&source[..common]);

    if source.len < self.len {
      self.truncate(source.len);
    } else {
      unsafe { self.construct_tail(source.len - self.len, |i| source[i].clone()) };
    }
  }
}

impl<T> Deref for DynamicArray<T> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T> DerefMut for DynamicArray<T> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
  fn as_ref(&self) -> &[T] {
    self
  }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
  fn as_mut(&mut self) -> &mut [T] {
    self
  }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynamicArray<T> {
  type Output = I::Output;

  #[track_caller]
  fn index(
    &self,
    index: I,
  ) -> &Self::Output {
    Index::index(self.as_slice(), index)
  }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynamicArray<T> {
  #[track_caller]
  fn index_mut(
    &mut self,
    index: I,
  ) -> &mut Self::Output {
    IndexMut::index_mut(self.as_mut_slice(), index)
  }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T: PartialEq<U>, U> PartialEq<DynamicArray<U>> for DynamicArray<T> {
  fn eq(
    &self,
    other: &DynamicArray<U>,
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: PartialEq<U>, U> PartialEq<[U]> for DynamicArray<T> {
  fn eq(
    &self,
    other: &[U],
  ) -> bool {
    self.as_slice() == other
  }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T> {
  fn eq(
    &self,
    other: &[U; N],
  ) -> bool {
    self.as_slice() == other
  }
}

impl<T: Hash> Hash for DynamicArray<T> {
  fn hash<H: Hasher>(
    &self,
    state: &mut H,
  ) {
    self.as_slice().hash(state);
  }
}

impl<T> Extend<T> for DynamicArray<T> {
  fn extend<I: IntoIterator<Item = T>>(
    &mut self,
    iter: I,
  ) {
    let iter = iter.into_iter();
    let (lower, _) = iter.size_hint();
    self.reserve_additional(lower);

    for value in iter {
      self.push_back(value);
    }
  }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynamicArray<T> {
  fn extend<I: IntoIterator<Item = &'a T>>(
    &mut self,
    iter: I,
  ) {
    self.extend(iter.into_iter().copied());
  }
}

impl<T> FromIterator<T> for DynamicArray<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut array = Self::new();
    array.extend(iter);
    array
  }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
  fn from(values: [T; N]) -> Self {
    let mut array = Self::with_capacity(N);
    for value in values {
      array.push_back(value);
    }
    array
  }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
  fn from(values: &[T]) -> Self {
    let mut array = Self::with_capacity(values.len());
    array.extend_from_slice(values);
    array
  }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
  type Item = &'a mut T;
  type IntoIter = slice::IterMut<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter_mut()
  }
}
