//! Watch mode actors.
//!
//! One watch actor per selected mapping, one reporter for all of them:
//!
//! ```text
//! WatchActor (styles[0]) ─┐
//! WatchActor (scripts[0]) ├─BuildEvent─► Reporter (terminal)
//! WatchActor (scripts[1]) ┘
//! ```
//!
//! # Module Structure
//!
//! - `messages` - BuildEvent published by watch actors
//! - `watch` - per-mapping watcher, debouncer and compile loop
//! - `reporter` - prints the event stream
//! - `coordinator` - wires up and runs actors

pub mod coordinator;
pub mod messages;
pub mod reporter;
pub mod watch;

pub use coordinator::Coordinator;
