use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// The targets that get a full record in the nightly data: every component
/// of the `complete` profile plus one entry per profile.
pub static PRIMARY_TARGETS: &[&str] = &[
    "aarch64-apple-darwin",
    "aarch64-unknown-linux-gnu",
    "i686-unknown-linux-gnu",
    "x86_64-apple-darwin",
    "x86_64-unknown-linux-gnu",
];

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetTriple(String);

impl TargetTriple {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn primary() -> impl Iterator<Item = TargetTriple> {
        PRIMARY_TARGETS.iter().map(|t| Self::new(t))
    }

    pub fn is_primary(&self) -> bool {
        PRIMARY_TARGETS.contains(&&*self.0)
    }
}

impl Deref for TargetTriple {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
