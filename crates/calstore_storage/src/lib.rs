//! # calstore Storage
//!
//! Storage backend trait and implementations for calstore.
//!
//! This crate provides the lowest-level persistence abstraction for the
//! calendar store. Backends are **opaque snapshot stores** - they hold one
//! blob per table and do not interpret the data they store.
//!
//! ## Design Principles
//!
//! - Backends are simple snapshot stores (read, replace, sync)
//! - No knowledge of row schemas or table encodings
//! - Must be `Send + Sync` for concurrent access
//! - calstore_core owns all format interpretation
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage with atomic replacement
//!
//! ## Example
//!
//! ```rust
//! use calstore_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.write(b"snapshot").unwrap();
//! assert_eq!(backend.read().unwrap().as_deref(), Some(&b"snapshot"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod dir;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use dir::StoreDir;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
