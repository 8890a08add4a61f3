//! A mock Rust v2 distribution server laid out on the file system.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use rust_dist_sync::dist::dist::PRIMARY_TARGETS;
use tempfile::TempDir;
use url::Url;

// The manifest version created by this mock
pub const MOCK_MANIFEST_VERSION: &str = "2";

// Targets that only ship rust-std
pub const MOCK_CROSS_TARGETS: &[&str] = &["wasm32-unknown-unknown", "x86_64-unknown-linux-musl"];

// A mock distribution server. Create it and run `write` to write its
// structure to a directory.
#[derive(Debug)]
pub struct MockDistServer {
    // The local path to the dist server root
    pub path: PathBuf,
    pub channels: Vec<MockChannel>,
}

// A Rust distribution channel on one date
#[derive(Debug, Clone)]
pub struct MockChannel {
    // e.g. "nightly"
    pub name: &'static str,
    // YYYY-MM-DD
    pub date: String,
    // Also published as the undated current manifest
    pub latest: bool,
    pub packages: Vec<MockPackage>,
    pub profiles: Vec<(&'static str, Vec<&'static str>)>,
}

#[derive(Debug, Clone)]
pub struct MockPackage {
    pub name: &'static str,
    pub version: String,
    pub targets: Vec<MockTargetedPackage>,
}

#[derive(Debug, Clone)]
pub struct MockTargetedPackage {
    // Target triple, or "*"
    pub target: String,
    // Whether the artifact was built
    pub available: bool,
}

impl MockDistServer {
    pub fn new(tmp: &TempDir, channels: Vec<MockChannel>) -> Self {
        Self {
            path: tmp.path().join("dist"),
            channels,
        }
    }

    pub fn url(&self) -> String {
        Url::from_directory_path(&self.path)
            .expect("dist path is absolute")
            .to_string()
    }

    pub fn write(&self) {
        for channel in &self.channels {
            let manifest = channel.to_toml();
            let file_name = format!("channel-rust-{}.toml", channel.name);

            let dated = self.path.join(&channel.date);
            fs::create_dir_all(&dated).unwrap();
            fs::write(dated.join(&file_name), &manifest).unwrap();

            if channel.latest {
                fs::write(self.path.join(&file_name), &manifest).unwrap();
            }
        }
    }
}

impl MockChannel {
    pub fn to_toml(&self) -> String {
        let mut pkg = toml::Table::new();
        for package in &self.packages {
            let mut targets = toml::Table::new();
            for target in &package.targets {
                let mut tpkg = toml::Table::new();
                tpkg.insert("available".into(), target.available.into());
                if target.available {
                    let url = self.artifact_url(package.name, &target.target);
                    let hash = self.artifact_hash(package.name, &target.target);
                    tpkg.insert("url".into(), url.into());
                    tpkg.insert("hash".into(), hash.into());
                }
                targets.insert(target.target.clone(), tpkg.into());
            }

            let mut table = toml::Table::new();
            table.insert("version".into(), package.version.clone().into());
            table.insert("target".into(), targets.into());
            pkg.insert(package.name.into(), table.into());
        }

        let mut profiles = toml::Table::new();
        for (name, components) in &self.profiles {
            let components: Vec<toml::Value> = components.iter().map(|c| (*c).into()).collect();
            profiles.insert((*name).into(), components.into());
        }

        let mut manifest = toml::Table::new();
        manifest.insert("manifest-version".into(), MOCK_MANIFEST_VERSION.into());
        manifest.insert("date".into(), self.date.clone().into());
        manifest.insert("pkg".into(), pkg.into());
        manifest.insert("profiles".into(), profiles.into());
        toml::to_string(&manifest).unwrap()
    }

    pub fn artifact_url(&self, pkg: &str, target: &str) -> String {
        if target == "*" {
            format!(
                "https://static.rust-lang.org/dist/{}/{pkg}-{}.tar.xz",
                self.date, self.name
            )
        } else {
            format!(
                "https://static.rust-lang.org/dist/{}/{pkg}-{}-{target}.tar.xz",
                self.date, self.name
            )
        }
    }

    // Put the date in the hash so dates can be told apart
    pub fn artifact_hash(&self, pkg: &str, target: &str) -> String {
        format!("{pkg}:{target}:{}", self.date)
    }

    pub fn set_available(&mut self, pkg: &str, target: &str, available: bool) {
        let tpkg = self
            .packages
            .iter_mut()
            .find(|p| p.name == pkg)
            .and_then(|p| p.targets.iter_mut().find(|t| t.target == target))
            .unwrap_or_else(|| panic!("no {pkg} for {target} in mock channel"));
        tpkg.available = available;
    }

    pub fn set_latest(mut self, latest: bool) -> Self {
        self.latest = latest;
        self
    }
}

fn targeted(targets: &[&str]) -> Vec<MockTargetedPackage> {
    targets
        .iter()
        .map(|t| MockTargetedPackage {
            target: t.to_string(),
            available: true,
        })
        .collect()
}

fn package(name: &'static str, version: &str, targets: &[&str]) -> MockPackage {
    MockPackage {
        name,
        version: version.to_owned(),
        targets: targeted(targets),
    }
}

// A nightly in which everything was built
pub fn create_mock_nightly(date: &str) -> MockChannel {
    let version = format!("1.77.0-nightly ({date})");
    let std_targets: Vec<&str> = PRIMARY_TARGETS
        .iter()
        .chain(MOCK_CROSS_TARGETS)
        .copied()
        .collect();

    let mut packages = Vec::new();
    for name in ["rustc", "cargo", "rust-docs", "rustfmt", "clippy", "miri", "rustc-docs"] {
        packages.push(package(name, &version, PRIMARY_TARGETS));
    }
    packages.push(package("rust-std", &version, &std_targets));
    packages.push(package("rust-mingw", &version, &["x86_64-pc-windows-gnu"]));
    packages.push(package("rust-src", &version, &["*"]));

    let minimal = vec!["rustc", "cargo", "rust-std", "rust-mingw"];
    let mut default = minimal.clone();
    default.extend(["rust-docs", "rustfmt", "clippy"]);
    let mut complete = default.clone();
    complete.extend(["miri", "rust-src", "rustc-docs"]);

    MockChannel {
        name: "nightly",
        date: date.to_owned(),
        latest: false,
        packages,
        profiles: vec![
            ("minimal", minimal),
            ("default", default),
            ("complete", complete),
        ],
    }
}

pub fn create_mock_release(
    name: &'static str,
    date: &str,
    packages: Vec<MockPackage>,
) -> MockChannel {
    MockChannel {
        name,
        date: date.to_owned(),
        latest: true,
        packages,
        profiles: vec![("minimal", vec!["rustc", "foo"])],
    }
}

pub fn mock_package(name: &'static str, targets: &[(&str, bool)]) -> MockPackage {
    MockPackage {
        name,
        version: "1.75.0".to_owned(),
        targets: targets
            .iter()
            .map(|(target, available)| MockTargetedPackage {
                target: target.to_string(),
                available: *available,
            })
            .collect(),
    }
}
