//! Asset path mapping, minification and the minify-only pass.

pub mod minify;
mod process;
mod route;

// Types
pub use route::OutputPaths;

// Processing (side effects)
pub use process::minify_asset;
