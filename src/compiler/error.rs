//! Per-mapping error types.
//!
//! Every variant names the file it is about, so a failure can be reported
//! as one human-readable block without extra context.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// File-system operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Write,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// Stylesheet compilation failure.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{message}")]
    Syntax { path: PathBuf, message: String },

    #[error("search path `{0}` is not a directory")]
    SearchPath(PathBuf),

    #[error("failed to {op} `{path}`: {error}")]
    Io {
        op: IoOp,
        path: PathBuf,
        error: io::Error,
    },
}

/// Script bundling failure.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot find module `{specifier}` from `{from}`")]
    Unresolved { specifier: String, from: PathBuf },

    #[error("{path}: {message}")]
    Syntax { path: PathBuf, message: String },

    #[error("search path `{0}` is not a directory")]
    SearchPath(PathBuf),

    #[error("failed to {op} `{path}`: {error}")]
    Io {
        op: IoOp,
        path: PathBuf,
        error: io::Error,
    },

    #[error("minification failed: {0}")]
    Minify(#[from] MinifyError),
}

/// Minification failure (bundles and the minify-only pass).
#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("{language} parse error: {message}")]
    Parse {
        language: &'static str,
        message: String,
    },

    #[error("failed to {op} `{path}`: {error}")]
    Io {
        op: IoOp,
        path: PathBuf,
        error: io::Error,
    },
}

/// Any per-mapping failure, as collected by the pipeline driver.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Style(#[from] CompileError),

    #[error(transparent)]
    Script(#[from] BundleError),

    #[error(transparent)]
    Minify(#[from] MinifyError),
}

/// A failed write, converted into the caller's error type.
#[derive(Debug)]
pub(crate) struct WriteError {
    pub path: PathBuf,
    pub error: io::Error,
}

impl From<WriteError> for CompileError {
    fn from(e: WriteError) -> Self {
        Self::Io {
            op: IoOp::Write,
            path: e.path,
            error: e.error,
        }
    }
}

impl From<WriteError> for BundleError {
    fn from(e: WriteError) -> Self {
        Self::Io {
            op: IoOp::Write,
            path: e.path,
            error: e.error,
        }
    }
}

impl From<WriteError> for MinifyError {
    fn from(e: WriteError) -> Self {
        Self::Io {
            op: IoOp::Write,
            path: e.path,
            error: e.error,
        }
    }
}
