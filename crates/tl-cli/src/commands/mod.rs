//! CLI subcommand implementations.

pub mod entry;
pub mod export;
pub mod slice;
pub mod summary;
pub mod util;
