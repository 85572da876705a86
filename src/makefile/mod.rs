// src/makefile/mod.rs

//! Makefile loading.
//!
//! - [`loader`] finds and reads the makefile through the [`FileSystem`]
//!   abstraction.
//! - [`parser`] turns its text into a [`DependencyGraph`] rooted at the
//!   requested goals.
//!
//! [`FileSystem`]: crate::fs::FileSystem
//! [`DependencyGraph`]: crate::dag::DependencyGraph

pub mod loader;
pub mod parser;

pub use loader::{DEFAULT_MAKEFILES, load, load_from_path, resolve_makefile};
pub use parser::parse;
