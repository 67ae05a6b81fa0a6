use std::{
  alloc::Layout,
  fmt,
  marker::PhantomData,
  mem::{self, MaybeUninit},
  ptr::{self, NonNull},
  slice,
};

use libc::{c_void, posix_memalign};

use crate::{
  align,
  check::precondition,
  error::{StorageError, handle_storage_error},
};

/// Exclusive owner of one block of uninitialized memory sized for
/// `capacity` values of `T`.
///
/// `Storage` never constructs or drops a `T`. Whoever writes values into the
/// block is responsible for dropping them before the block is released.
///
/// ```text
///   buffer ─► ┌───────┬───────┬───────┬───────┐
///             │  ???  │  ???  │  ???  │  ???  │   capacity = 4
///             └───────┴───────┴───────┴───────┘
/// ```
///
/// A storage with capacity `0` owns no block, and neither does any storage
/// of a zero-sized `T`. In both cases the buffer is a dangling, well-aligned
/// pointer and dropping the storage does nothing.
pub struct Storage<T> {
  buffer: NonNull<T>,
  capacity: usize,
  _marker: PhantomData<T>,
}

// SAFETY: the block is exclusively owned; sharing or sending it is exactly
// as safe as sharing or sending the `T`s it may hold.
unsafe impl<T: Send> Send for Storage<T> {}
unsafe impl<T: Sync> Sync for Storage<T> {}

impl<T> Storage<T> {
  /// A storage that owns no block.
  pub const fn new() -> Self {
    Self {
      buffer: NonNull::dangling(),
      capacity: 0,
      _marker: PhantomData,
    }
  }

  /// Allocates room for `capacity` elements.
  ///
  /// # Panics
  ///
  /// Panics on capacity overflow and aborts through
  /// [`handle_alloc_error`](std::alloc::handle_alloc_error) when out of
  /// memory.
  pub fn allocate(capacity: usize) -> Self {
    match Self::try_allocate(capacity) {
      Ok(storage) => storage,
      Err(err) => handle_storage_error(err),
    }
  }

  /// Allocates room for `capacity` elements, reporting failure instead of
  /// aborting.
  pub fn try_allocate(capacity: usize) -> Result<Self, StorageError> {
    let layout = Self::layout_for(capacity)?;

    if layout.size() == 0 {
      return Ok(Self {
        buffer: NonNull::dangling(),
        capacity,
        _marker: PhantomData,
      });
    }

    let buffer = unsafe { allocate_block(layout) }.ok_or_else(|| {
      tracing::debug!(
        capacity,
        bytes = layout.size(),
        align = layout.align(),
        "storage allocation failed"
      );
      StorageError::OutOfMemory { layout }
    })?;

    tracing::trace!(capacity, bytes = layout.size(), address = ?buffer, "allocated storage block");

    Ok(Self {
      buffer: buffer.cast(),
      capacity,
      _marker: PhantomData,
    })
  }

  fn layout_for(capacity: usize) -> Result<Layout, StorageError> {
    Layout::array::<T>(capacity).map_err(|_| StorageError::CapacityOverflow {
      requested: capacity,
    })
  }

  /// Number of elements the block can hold.
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Whether this storage owns memory obtained from the allocator.
  pub fn is_allocated(&self) -> bool {
    self.capacity != 0 && mem::size_of::<T>() != 0
  }

  pub fn as_ptr(&self) -> *const T {
    self.buffer.as_ptr()
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.buffer.as_ptr()
  }

  /// Address of the slot at `offset`. One past the last slot is allowed.
  ///
  /// Computing the address is safe; reading or writing through it is only
  /// valid for `offset < capacity` and subject to the slot's init state.
  /// `offset <= capacity` is asserted in debug builds and with the `checked`
  /// feature.
  pub fn address(
    &self,
    offset: usize,
  ) -> *mut T {
    precondition!(
      offset <= self.capacity,
      "storage offset {offset} out of range for capacity {}",
      self.capacity
    );
    self.buffer.as_ptr().wrapping_add(offset)
  }

  /// The slot at `index`, which may or may not hold a live value.
  ///
  /// # Panics
  ///
  /// Panics if `index >= capacity`.
  pub fn slot(
    &self,
    index: usize,
  ) -> &MaybeUninit<T> {
    &self.as_uninit_slice()[index]
  }

  /// Mutable access to the slot at `index`.
  ///
  /// # Panics
  ///
  /// Panics if `index >= capacity`.
  pub fn slot_mut(
    &mut self,
    index: usize,
  ) -> &mut MaybeUninit<T> {
    &mut self.as_uninit_slice_mut()[index]
  }

  pub fn as_uninit_slice(&self) -> &[MaybeUninit<T>] {
    unsafe { slice::from_raw_parts(self.buffer.as_ptr().cast(), self.capacity) }
  }

  pub fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<T>] {
    unsafe { slice::from_raw_parts_mut(self.buffer.as_ptr().cast(), self.capacity) }
  }

  /// Exchanges blocks with `other`.
  pub fn swap(
    &mut self,
    other: &mut Self,
  ) {
    mem::swap(&mut self.buffer, &mut other.buffer);
    mem::swap(&mut self.capacity, &mut other.capacity);
  }

  /// Moves the block out, leaving `self` without one.
  pub fn take(&mut self) -> Self {
    mem::take(self)
  }
}

impl<T> Default for Storage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Drop for Storage<T> {
  fn drop(&mut self) {
    if !self.is_allocated() {
      return;
    }

    tracing::trace!(capacity = self.capacity, address = ?self.buffer, "releasing storage block");

    unsafe { libc::free(self.buffer.as_ptr().cast::<c_void>()) };
  }
}

impl<T> fmt::Debug for Storage<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Storage")
      .field("buffer", &self.buffer)
      .field("capacity", &self.capacity)
      .finish()
  }
}

/// Requests `layout.size()` bytes from the C allocator.
///
/// # Safety
///
/// `layout.size()` must be non-zero.
unsafe fn allocate_block(layout: Layout) -> Option<NonNull<u8>> {
  let mut address: *mut c_void = ptr::null_mut();

  let status = unsafe { posix_memalign(&mut address, align!(layout.align()), layout.size()) };

  if status != 0 {
    return None;
  }

  NonNull::new(address.cast::<u8>())
}
