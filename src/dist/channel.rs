//! Filtered mirrors of the stable and beta channel manifests.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dist::dist::{Channel, ManifestDesc, dl_manifest};
use crate::dist::manifest::Manifest;

/// A channel manifest with everything unavailable stripped out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub date: NaiveDate,
    pub pkg: BTreeMap<String, PackageRecord>,
    pub profiles: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub target: BTreeMap<String, TargetEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub available: bool,
    pub url: String,
    pub hash: String,
}

impl ChannelRecord {
    /// Keeps every available target of every package, keyed as the manifest
    /// spells it. Packages left with no targets are dropped.
    pub fn mirror(manifest: &Manifest) -> Self {
        let mut pkg = BTreeMap::new();
        for (name, package) in &manifest.packages {
            let target: BTreeMap<_, _> = package
                .targets
                .entries()
                .filter_map(|(triple, tpkg)| {
                    let bin = tpkg.bin.as_ref()?;
                    Some((
                        triple.to_owned(),
                        TargetEntry {
                            available: true,
                            url: bin.url.clone(),
                            hash: bin.hash.clone(),
                        },
                    ))
                })
                .collect();

            if target.is_empty() {
                debug!(package = %name, "dropping package with no available targets");
                continue;
            }
            pkg.insert(name.clone(), PackageRecord { target });
        }

        Self {
            date: manifest.date,
            pkg,
            profiles: manifest.profiles().clone(),
        }
    }
}

/// Downloads the current manifest of `channel` and mirrors it.
pub fn fetch_channel(dist_root: &str, channel: Channel) -> Result<ChannelRecord> {
    let manifest = dl_manifest(dist_root, &ManifestDesc::new(channel, None))?;
    let record = ChannelRecord::mirror(&manifest);
    info!(%channel, date = %record.date, packages = record.pkg.len(), "mirrored channel");
    Ok(record)
}
