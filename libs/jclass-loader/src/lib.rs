//! Batch loading of class files.
//!
//! A [`ClassfileLoader`] walks a list of [`ClassSource`]s, one group per source, parses every
//! entry and reports progress to a [`LoadListener`]. A file that fails to load is recorded in the
//! [`LoadReport`] and the load carries on with the next one.

mod config;
mod event;
mod index;
mod loader;
mod report;
mod source;

pub use config::*;
pub use event::*;
pub use index::*;
pub use loader::*;
pub use report::*;
pub use source::*;
