use std::alloc::{self, Layout};

/// Failure to obtain a block of raw storage.
///
/// Returned by the `try_*` entry points. The infallible entry points turn it
/// into a `capacity overflow` panic or a call to
/// [`handle_alloc_error`](std::alloc::handle_alloc_error).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
  /// The requested element count does not fit in `isize::MAX` bytes, or
  /// doubling the current capacity overflowed.
  #[error("capacity overflow: cannot hold {requested} elements")]
  CapacityOverflow { requested: usize },

  /// The C allocator could not satisfy the request.
  #[error("out of memory: failed to allocate {} bytes aligned to {}", .layout.size(), .layout.align())]
  OutOfMemory { layout: Layout },
}

#[cold]
#[track_caller]
pub(crate) fn handle_storage_error(err: StorageError) -> ! {
  match err {
    StorageError::CapacityOverflow { .. } => panic!("{err}"),
    StorageError::OutOfMemory { layout } => alloc::handle_alloc_error(layout),
  }
}
