//! Reduction of nightly manifests into per-target records.
//!
//! The newest nightly frequently lacks a component on some target, so the
//! record is assembled by walking back one day at a time: the newest
//! manifest decides `latest`, and each profile is taken from the newest
//! manifest in which all of its components were built.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dist::dist::{
    Channel, DistError, ManifestDesc, OPTIONAL_PROFILE_COMPONENTS, Profile, TargetTriple,
    dl_manifest,
};
use crate::dist::manifest::{Availability, Manifest};

/// The reduced nightly data: one record per target triple.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NightlyRecord {
    pub targets: BTreeMap<TargetTriple, TargetRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub latest: Latest,
    #[serde(flatten)]
    pub profiles: BTreeMap<Profile, ProfileRecord>,
}

/// The newest build of every component, each with the date it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latest {
    pub date: NaiveDate,
    pub components: BTreeMap<String, DatedArtifact>,
}

/// A profile whose components all come from the same nightly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub date: NaiveDate,
    pub components: BTreeMap<String, Artifact>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedArtifact {
    pub date: NaiveDate,
    pub url: String,
    pub sha256: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub url: String,
    pub sha256: String,
}

impl NightlyRecord {
    /// Targets outside the primary set that ship at least `rust-std`.
    pub fn cross_targets(&self) -> impl Iterator<Item = &TargetTriple> {
        self.targets
            .iter()
            .filter(|(target, record)| {
                !target.is_primary() && record.latest.components.contains_key("rust-std")
            })
            .map(|(target, _)| target)
    }
}

impl TargetRecord {
    fn new(date: NaiveDate) -> Self {
        Self {
            latest: Latest {
                date,
                components: BTreeMap::new(),
            },
            profiles: BTreeMap::new(),
        }
    }
}

/// Accumulates manifests, newest first, into a [`NightlyRecord`].
#[derive(Debug, Default)]
pub struct NightlyReducer {
    record: NightlyRecord,
    seen_manifest: bool,
}

impl NightlyReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in a manifest older than every manifest applied so far.
    pub fn apply(&mut self, manifest: &Manifest) {
        let date = manifest.date;
        if !self.seen_manifest {
            self.seen_manifest = true;
            for target in TargetTriple::primary() {
                self.record.targets.insert(target, TargetRecord::new(date));
            }
        }

        let complete = manifest.profile(Profile::Complete).unwrap_or_default();
        for target in TargetTriple::primary() {
            let record = self
                .record
                .targets
                .entry(target.clone())
                .or_insert_with(|| TargetRecord::new(date));

            for component in complete {
                if record.latest.components.contains_key(component) {
                    continue;
                }
                if let Availability::Available(bin) = manifest.availability(component, &target) {
                    debug!(%target, %component, %date, "recording latest component");
                    record.latest.components.insert(
                        component.clone(),
                        DatedArtifact {
                            date,
                            url: bin.url.clone(),
                            sha256: bin.hash.clone(),
                        },
                    );
                }
            }

            for profile in Profile::all() {
                if record.profiles.contains_key(&profile) {
                    continue;
                }
                if let Some(profile_record) = build_profile(manifest, profile, &target) {
                    debug!(%target, %profile, %date, "profile complete");
                    record.profiles.insert(profile, profile_record);
                }
            }
        }

        if let Some(rust_std) = manifest.get_package("rust-std") {
            for (target, tpkg) in rust_std.targets.entries() {
                let Some(bin) = &tpkg.bin else {
                    continue;
                };
                if target == "*" {
                    continue;
                }
                let record = self
                    .record
                    .targets
                    .entry(TargetTriple::new(target))
                    .or_insert_with(|| TargetRecord::new(date));
                record
                    .latest
                    .components
                    .entry("rust-std".to_owned())
                    .or_insert_with(|| DatedArtifact {
                        date,
                        url: bin.url.clone(),
                        sha256: bin.hash.clone(),
                    });
            }
        }
    }

    /// The primary target/profile pairs no applied manifest could complete.
    pub fn incomplete(&self) -> Vec<(TargetTriple, Profile)> {
        TargetTriple::primary()
            .flat_map(|target| Profile::all().map(|profile| (target.clone(), profile)))
            .filter(|(target, profile)| {
                self.record
                    .targets
                    .get(target)
                    .is_none_or(|r| !r.profiles.contains_key(profile))
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.incomplete().is_empty()
    }

    pub fn finish(self) -> NightlyRecord {
        self.record
    }
}

/// Collects `profile` for `target` from a single manifest, or `None` if a
/// component it requires was not built.
fn build_profile(
    manifest: &Manifest,
    profile: Profile,
    target: &TargetTriple,
) -> Option<ProfileRecord> {
    let Some(required) = manifest.profile(profile) else {
        warn!(%profile, date = %manifest.date, "manifest does not define profile");
        return None;
    };

    let mut components = BTreeMap::new();
    let mut complete = true;
    for component in required {
        match manifest.availability(component, target) {
            Availability::Available(bin) => {
                components.insert(
                    component.clone(),
                    Artifact {
                        url: bin.url.clone(),
                        sha256: bin.hash.clone(),
                    },
                );
            }
            Availability::NotShipped => {}
            Availability::Unavailable
                if OPTIONAL_PROFILE_COMPONENTS.contains(&component.as_str()) => {}
            Availability::Unavailable => {
                debug!(
                    %target, %profile, %component, date = %manifest.date,
                    "component unavailable"
                );
                complete = false;
            }
        }
    }

    complete.then_some(ProfileRecord {
        date: manifest.date,
        components,
    })
}

/// Builds the nightly record, starting at `start` (or the newest nightly)
/// and stepping back a day at a time until every primary target has every
/// profile.
///
/// Gives up with [`DistError::BacktrackLimitExceeded`] once the next date
/// would be more than `backtrack_limit` days older than the first date
/// tried. A missing newest nightly is fatal; a missing archived one is
/// skipped.
pub fn fetch_nightly(
    dist_root: &str,
    start: Option<NaiveDate>,
    backtrack_limit: u32,
) -> Result<NightlyRecord> {
    let mut reducer = NightlyReducer::new();
    let mut desc = ManifestDesc::new(Channel::Nightly, start);
    let mut first_date = start;

    loop {
        let tried = match dl_manifest(dist_root, &desc) {
            Ok(manifest) => {
                first_date.get_or_insert(manifest.date);
                reducer.apply(&manifest);
                if reducer.is_complete() {
                    info!(date = %manifest.date, "all profiles complete");
                    return Ok(reducer.finish());
                }
                warn!(
                    date = %manifest.date,
                    incomplete = reducer.incomplete().len(),
                    "skipping nightly which is missing components"
                );
                desc.date.unwrap_or(manifest.date)
            }
            Err(e) => {
                let Some(date) = desc.date else {
                    return Err(e);
                };
                match e.downcast_ref::<DistError>() {
                    Some(DistError::MissingRelease(..)) => {
                        // no need to even print anything for missing nightlies,
                        // since we don't really "skip" them
                        debug!(%date, "no nightly published");
                        date
                    }
                    _ => return Err(e),
                }
            }
        };

        let try_next = tried
            .pred_opt()
            .ok_or_else(|| anyhow!("no date precedes {tried}"))?;
        let anchor = first_date.unwrap_or(tried);
        if (anchor - try_next).num_days() > i64::from(backtrack_limit) {
            bail!(DistError::BacktrackLimitExceeded {
                oldest: tried,
                limit: backtrack_limit,
                missing: reducer.incomplete(),
            });
        }
        desc.date = Some(try_next);
    }
}
