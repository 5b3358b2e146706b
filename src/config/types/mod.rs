//! Configuration utility types.

mod error;
mod mapping;

pub use error::{ConfigError, ManifestDiagnostics};
pub use mapping::{AssetMapping, MappingId, MappingKind};
