//! Small shared helpers.

pub mod path;
mod plural;
mod size;

pub use plural::plural_count;
pub use size::format_bytes;
