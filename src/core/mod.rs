//! Core types shared across the pipeline.

mod mode;
mod state;

pub use mode::{BuildMode, WatchScope};
pub use state::{setup_shutdown_handler, take_shutdown_receiver};
