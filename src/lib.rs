//! # rvector - A Growable Array Over Hand-Managed Storage
//!
//! This crate provides a contiguous, growable sequence container whose raw
//! memory management is split out into its own type.
//!
//! ## Overview
//!
//! Two types cooperate:
//!
//! ```text
//!   DynamicArray<T>                       (constructs / drops elements)
//!   ┌──────────────────────────────┐
//!   │ len: 3                       │
//!   │ storage: Storage<T> ─────────┼──┐   (allocates / frees bytes)
//!   └──────────────────────────────┘  │
//!                                     ▼
//!          ┌───────┬───────┬───────┬───────┐
//!          │   a   │   b   │   c   │  ???  │  capacity = 4
//!          └───────┴───────┴───────┴───────┘
//!          ◄──────── live ────────►◄ spare ►
//! ```
//!
//! [`Storage`] owns one block of uninitialized memory and knows nothing about
//! the values in it. [`DynamicArray`] owns exactly one `Storage` and tracks
//! how many of its slots hold live values.
//!
//! ## Crate Structure
//!
//! ```text
//!   rvector
//!   ├── align      - Word alignment macro (align!)
//!   ├── array      - DynamicArray implementation
//!   ├── check      - Precondition assertions (internal)
//!   ├── error      - StorageError
//!   ├── iter       - Owning IntoIter
//!   └── storage    - Storage implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rvector::DynamicArray;
//!
//! let mut array = DynamicArray::new();
//! array.push_back(1);
//! array.push_back(2);
//! array.push_back(3);
//!
//! assert_eq!(array.len(), 3);
//! assert_eq!(array, [1, 2, 3]);
//! assert!(array.capacity() >= 3);
//! ```
//!
//! ## How Growth Works
//!
//! A push into a full array allocates a block of twice the capacity, builds
//! the new element there, and only then moves the old elements over:
//!
//! ```text
//!   old block   ┌───┬───┐
//!               │ a │ b │                 full, push(c)
//!               └───┴───┘
//!                 │   │
//!   new block   ┌─▼─┬─▼─┬───┬───┐
//!               │ a │ b │ c │   │         1. c constructed first
//!               └───┴───┴───┴───┘         2. a, b moved bitwise
//!                                         3. blocks swapped, old freed
//! ```
//!
//! If building `c` panics, nothing has moved yet: the new block is freed and
//! the array is left exactly as it was. Rust moves cannot fail, so the
//! relocation step always moves and never needs to clone.
//!
//! Capacities observed from an empty array while pushing are `1, 2, 4, 4, 8,
//! ...`.
//!
//! ## Features
//!
//! - **Strong panic safety**: `push_back`, `emplace_back`, `insert`,
//!   `emplace` and `reserve` leave the array unchanged if construction panics
//! - **C allocator backed**: blocks come from `posix_memalign(3)` and return
//!   through `free(3)`
//! - **Zero-cost unchecked access**: `get_unchecked`, `pop_back_unchecked`,
//!   with assertions under `debug_assertions` or the `checked` feature
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no internal synchronization
//! - **Fixed allocator**: no pluggable allocators, no inline buffer
//! - **Unix-only**: Requires `libc` and `posix_memalign` (POSIX systems)
//!
//! ## Logging
//!
//! Block allocation, release and growth are reported through `tracing` at
//! `trace` level; allocation failures at `debug` level.

pub mod align;
mod array;
mod check;
mod error;
mod iter;
mod storage;

pub use array::DynamicArray;
pub use error::StorageError;
pub use iter::IntoIter;
pub use storage::Storage;
