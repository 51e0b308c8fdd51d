//! Filesystem primitives for the looper pipeline.
//!
//! This crate provides a [`FileSystem`] trait that abstracts the handful of
//! operations the loop driver needs: recursive scanning, tree copy/removal,
//! and whole-file read, write and rename. This enables:
//!
//! - **Unit testing** the driver without touching the real filesystem
//! - **Clean separation** between decision logic and I/O
//!
//! # Architecture
//!
//! - [`FileSystem`] trait
//! - [`LocalFs`] implementation backed by `std::fs`
//! - [`MockFs`] in-memory implementation (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use looper_fs::{FileSystem, LocalFs};
//!
//! let fs = LocalFs::new();
//! for path in fs.scan(Path::new("src"))? {
//!     println!("{}", path.display());
//! }
//! ```

mod error;
mod filesystem;
mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod path;
mod scanner;

pub use error::{FsError, FsErrorKind, FsOperation};
pub use filesystem::FileSystem;
pub use local::LocalFs;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockFs;
