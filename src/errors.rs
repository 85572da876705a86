// src/errors.rs

//! Crate-wide error type and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParmakeError {
    #[error("{}:{line}: *** {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: {message}", path.display())]
    ReadMakefile { path: PathBuf, message: String },

    #[error("No targets specified and no makefile found")]
    NoMakefile,

    #[error("No targets")]
    NoTargets,

    #[error("No rule to make target '{0}'")]
    UnknownTarget(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ParmakeError {
    /// Process exit status for an error that aborted the run before any
    /// rule was scheduled.
    ///
    /// An unknown goal exits with 1, every other structural problem with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParmakeError::UnknownTarget(_) => 1,
            _ => 2,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ParmakeError>;
