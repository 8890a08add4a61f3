//! The rust-dist-sync command line

pub mod common;
pub mod log;
pub mod sync_mode;
