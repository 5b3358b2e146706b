//! Path utilities.
//!
//! - [`fs`]: absolute normalization (`normalize_path`)
//! - [`lexical`]: pure component arithmetic (`clean_path`, `relative_path`, `to_slash`)

pub mod fs;
pub mod lexical;

pub use fs::normalize_path;
pub use lexical::{clean_path, relative_path, to_slash};
