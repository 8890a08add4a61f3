//! Rust distribution v2 manifests.
//!
//! This manifest describes the distributable artifacts for a single
//! release of Rust. They are toml files, typically downloaded from
//! e.g. static.rust-lang.org/dist/channel-rust-nightly.toml. They
//! describe where to download, for all platforms, each component of
//! the release, and which components make up each installation profile.
//!
//! Only the parts needed to mirror availability are modelled; everything
//! else in the document is ignored.
//!
//! See manifest/tests/channel-rust-nightly-example.toml for an example.
//!
//! Docs: <https://forge.rust-lang.org/infra/channel-layout.html>

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;

use crate::dist::dist::{Profile, TargetTriple, parse_manifest_date};
use crate::errors::SyncError;
use crate::utils::toml_utils::{
    get_bool, get_required_table, get_string, get_string_array, get_table,
};

pub(crate) const SUPPORTED_MANIFEST_VERSIONS: [&str; 1] = ["2"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Manifest {
    pub date: NaiveDate,
    pub packages: BTreeMap<String, Package>,
    profiles: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Package {
    pub version: String,
    pub targets: PackageTargets,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackageTargets {
    Wildcard(TargetedPackage),
    Targeted(BTreeMap<TargetTriple, TargetedPackage>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetedPackage {
    pub bin: Option<HashedBinary>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HashedBinary {
    pub url: String,
    pub hash: String,
}

/// What a manifest says about one component on one target.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Availability<'a> {
    Available(&'a HashedBinary),
    /// Shipped for the target, but not built for this release (or the
    /// package is absent from the manifest altogether).
    Unavailable,
    /// The package exists but is never shipped for the target.
    NotShipped,
}

impl Manifest {
    pub fn parse(data: &str) -> Result<Self> {
        let value = toml::from_str(data).context("error parsing manifest")?;
        Self::from_toml(value, "")
    }

    pub(crate) fn from_toml(mut table: toml::Table, path: &str) -> Result<Self> {
        let version = get_string(&mut table, "manifest-version", path)?;
        if !SUPPORTED_MANIFEST_VERSIONS.contains(&&*version) {
            bail!(SyncError::UnsupportedVersion(version));
        }
        let date = get_string(&mut table, "date", path)?;
        let Some(date) = parse_manifest_date(&date) else {
            bail!(SyncError::InvalidManifestDate(date));
        };
        Ok(Self {
            date,
            packages: Self::table_to_packages(&mut table, path)?,
            profiles: Self::table_to_profiles(&mut table, path)?,
        })
    }

    fn table_to_packages(
        table: &mut toml::Table,
        path: &str,
    ) -> Result<BTreeMap<String, Package>> {
        let mut result = BTreeMap::new();
        let pkg_table = get_required_table(table, "pkg", path)?;

        for (k, v) in pkg_table {
            if let toml::Value::Table(t) = v {
                let path = format!("{path}pkg.{k}.");
                result.insert(k, Package::from_toml(t, &path)?);
            }
        }

        Ok(result)
    }

    fn table_to_profiles(
        table: &mut toml::Table,
        path: &str,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let mut result = BTreeMap::new();
        let mut profile_table = get_table(table, "profiles", path)?;
        let names: Vec<String> = profile_table.keys().cloned().collect();

        for name in names {
            let components =
                get_string_array(&mut profile_table, &name, &format!("{path}profiles."))?;
            result.insert(name, components);
        }

        Ok(result)
    }

    pub fn get_package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// The components making up `profile`, in manifest order.
    pub fn profile(&self, profile: Profile) -> Option<&[String]> {
        self.profiles
            .get(&profile.to_string())
            .map(Vec::as_slice)
    }

    /// Every profile definition, including ones this crate has no name for.
    pub fn profiles(&self) -> &BTreeMap<String, Vec<String>> {
        &self.profiles
    }

    pub fn availability(&self, pkg: &str, target: &TargetTriple) -> Availability<'_> {
        let Some(package) = self.get_package(pkg) else {
            return Availability::Unavailable;
        };
        match package.targets.get(target) {
            None => Availability::NotShipped,
            Some(TargetedPackage { bin: Some(bin) }) => Availability::Available(bin),
            Some(TargetedPackage { bin: None }) => Availability::Unavailable,
        }
    }
}

impl Package {
    pub(crate) fn from_toml(mut table: toml::Table, path: &str) -> Result<Self> {
        Ok(Self {
            version: get_string(&mut table, "version", path)?,
            targets: Self::toml_to_targets(table, path)?,
        })
    }

    fn toml_to_targets(mut table: toml::Table, path: &str) -> Result<PackageTargets> {
        let mut target_table = get_table(&mut table, "target", path)?;

        if let Some(toml::Value::Table(t)) = target_table.remove("*") {
            Ok(PackageTargets::Wildcard(TargetedPackage::from_toml(
                t,
                &format!("{path}target.*."),
            )?))
        } else {
            let mut result = BTreeMap::new();
            for (k, v) in target_table {
                if let toml::Value::Table(t) = v {
                    let path = format!("{path}target.{k}.");
                    result.insert(TargetTriple::new(&k), TargetedPackage::from_toml(t, &path)?);
                }
            }
            Ok(PackageTargets::Targeted(result))
        }
    }
}

impl PackageTargets {
    pub(crate) fn get<'a>(&'a self, target: &TargetTriple) -> Option<&'a TargetedPackage> {
        match self {
            Self::Wildcard(tpkg) => Some(tpkg),
            Self::Targeted(tpkgs) => tpkgs.get(target),
        }
    }

    /// Every entry keyed the way the manifest spells it, `*` for a wildcard.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (&str, &TargetedPackage)> + '_> {
        match self {
            Self::Wildcard(tpkg) => Box::new(std::iter::once(("*", tpkg))),
            Self::Targeted(tpkgs) => Box::new(tpkgs.iter().map(|(k, v)| (&**k, v))),
        }
    }
}

impl TargetedPackage {
    pub(crate) fn from_toml(mut table: toml::Table, path: &str) -> Result<Self> {
        let bin = if get_bool(&mut table, "available", path)? {
            Some(HashedBinary {
                url: get_string(&mut table, "url", path)?,
                hash: get_string(&mut table, "hash", path)?,
            })
        } else {
            None
        };
        Ok(Self { bin })
    }

    pub fn available(&self) -> bool {
        self.bin.is_some()
    }
}
