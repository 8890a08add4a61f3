use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::info;

use crate::dist::manifest::Manifest;
pub use crate::dist::triple::{PRIMARY_TARGETS, TargetTriple};
use crate::download;
use crate::errors::SyncError;

pub static DEFAULT_DIST_ROOT: &str = "https://static.rust-lang.org/dist";

/// The components a profile may lack and still be recorded.
pub(crate) static OPTIONAL_PROFILE_COMPONENTS: &[&str] = &["rustc-docs"];

fn incomplete_msg(missing: &[(TargetTriple, Profile)]) -> String {
    missing
        .iter()
        .map(|(target, profile)| format!("'{profile}' for '{target}'"))
        .join(", ")
}

#[derive(Debug, ThisError)]
pub enum DistError {
    #[error("no release found for '{0}'")]
    MissingRelease(String),
    #[error(
        "gave up looking for a complete nightly at {oldest} ({limit} days back); \
         still incomplete: {}",
        incomplete_msg(.missing)
    )]
    BacktrackLimitExceeded {
        oldest: NaiveDate,
        limit: u32,
        missing: Vec<(TargetTriple, Profile)>,
    },
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Channel {
    Nightly,
    Beta,
    Stable,
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "nightly" => Ok(Self::Nightly),
            "beta" => Ok(Self::Beta),
            "stable" => Ok(Self::Stable),
            _ => Err(anyhow!(format!(
                "invalid channel name: '{name}'; valid names are: {}",
                Self::names().iter().map(|s| format!("'{s}'")).join(", ")
            ))),
        }
    }
}

impl Channel {
    pub fn names() -> &'static [&'static str] {
        &["nightly", "beta", "stable"]
    }

    /// Name of the data file this channel is written to.
    pub fn file_name(self) -> String {
        format!("{self}.json")
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Nightly => write!(f, "nightly"),
            Self::Beta => write!(f, "beta"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Minimal,
    Default,
    Complete,
}

impl FromStr for Profile {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "minimal" => Ok(Self::Minimal),
            "default" => Ok(Self::Default),
            "complete" => Ok(Self::Complete),
            _ => Err(anyhow!(format!(
                "invalid profile name: '{name}'; valid names are: {}",
                valid_profile_names()
            ))),
        }
    }
}

impl Profile {
    pub fn names() -> &'static [&'static str] {
        &["minimal", "default", "complete"]
    }

    pub fn all() -> [Self; 3] {
        [Self::Minimal, Self::Default, Self::Complete]
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Minimal => write!(f, "minimal"),
            Self::Default => write!(f, "default"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

pub fn valid_profile_names() -> String {
    Profile::names()
        .iter()
        .map(|s| format!("'{s}'"))
        .join(", ")
}

// A channel manifest on the dist server: the channel's current release when
// `date` is empty, otherwise the archived release of that day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDesc {
    pub channel: Channel,
    pub date: Option<NaiveDate>,
}

impl ManifestDesc {
    pub fn new(channel: Channel, date: Option<NaiveDate>) -> Self {
        Self { channel, date }
    }

    pub fn manifest_url(&self, dist_root: &str) -> String {
        let dist_root = dist_root.trim_end_matches('/');
        match self.date {
            None => format!("{}/channel-rust-{}.toml", dist_root, self.channel),
            Some(date) => format!("{}/{}/channel-rust-{}.toml", dist_root, date, self.channel),
        }
    }

    /// Either "$channel" or "$channel-$date"
    pub fn manifest_name(&self) -> String {
        match self.date {
            None => self.channel.to_string(),
            Some(date) => format!("{}-{}", self.channel, date),
        }
    }
}

impl fmt::Display for ManifestDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.manifest_name())
    }
}

pub(crate) fn parse_manifest_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Downloads and parses the manifest described by `desc`.
///
/// A manifest the server does not have is reported as
/// [`DistError::MissingRelease`] so that callers walking back through
/// archived dates can tell it apart from a real failure.
pub fn dl_manifest(dist_root: &str, desc: &ManifestDesc) -> Result<Manifest> {
    let manifest_url = desc.manifest_url(dist_root);
    let url = url::Url::parse(&manifest_url)
        .with_context(|| format!("failed to parse url: {manifest_url}"))?;

    info!(manifest = %desc, "downloading manifest");
    let data = match download::download_string(&url) {
        Ok(data) => data,
        Err(e) => match e.downcast_ref::<SyncError>() {
            Some(SyncError::DownloadNotExists { .. }) => {
                bail!(DistError::MissingRelease(desc.manifest_name()));
            }
            _ => {
                return Err(e)
                    .with_context(|| format!("failed to download manifest for '{desc}'"));
            }
        },
    };

    let manifest = Manifest::parse(&data)
        .with_context(|| format!("failed to parse manifest for '{desc}'"))?;
    info!(manifest = %desc, date = %manifest.date, "downloaded manifest");
    Ok(manifest)
}
