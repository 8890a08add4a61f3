//! Utility functions for rust-dist-sync
pub(crate) mod toml_utils;
#[allow(clippy::module_inception)]
pub mod utils;
