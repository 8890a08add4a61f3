//! Reading a Rust distribution server

pub mod channel;
#[allow(clippy::module_inception)]
pub mod dist;
pub mod manifest;
pub mod nightly;
pub(crate) mod triple;

pub use crate::dist::dist::{Channel, DistError, Profile, TargetTriple};
