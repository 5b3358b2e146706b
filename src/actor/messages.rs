//! Actor Message Definitions
//!
//! ```text
//! WatchActor --BuildEvent--> Reporter
//! ```

use std::path::PathBuf;

use super::watch::ChangeKind;
use crate::compiler::BundleLogEntry;
use crate::config::MappingId;

/// Progress of one mapping in watch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// Relevant files changed; a rebuild follows
    Update {
        mapping: MappingId,
        files: Vec<(PathBuf, ChangeKind)>,
    },
    /// Build finished
    Log {
        mapping: MappingId,
        output: PathBuf,
        entry: BundleLogEntry,
    },
    /// Build failed; the previous output is untouched
    Error { mapping: MappingId, message: String },
}

impl BuildEvent {
    pub fn mapping(&self) -> MappingId {
        match self {
            Self::Update { mapping, .. } | Self::Log { mapping, .. } | Self::Error { mapping, .. } => {
                *mapping
            }
        }
    }
}
