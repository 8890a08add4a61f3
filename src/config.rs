use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::warn;

use crate::dist::Channel;
use crate::dist::dist::DEFAULT_DIST_ROOT;
use crate::process::Process;

pub const DIST_ROOT_ENV: &str = "DIST_SYNC_DIST_ROOT";
pub const DATA_DIR_ENV: &str = "DIST_SYNC_DATA_DIR";
pub const README_ENV: &str = "DIST_SYNC_README";
pub const BACKTRACK_LIMIT_ENV: &str = "DIST_SYNC_BACKTRACK_LIMIT";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_README: &str = "README.md";
pub const DEFAULT_BACKTRACK_LIMIT: u32 = 14;

/// Settings that may be given on the command line, each overriding its
/// environment variable.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct ConfigArgs {
    /// Distribution server to read manifests from [env: DIST_SYNC_DIST_ROOT]
    #[arg(long, global = true, value_name = "URL")]
    pub dist_root: Option<String>,

    /// Directory the channel JSON files are written to [env: DIST_SYNC_DATA_DIR]
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// README holding the cross target list [env: DIST_SYNC_README]
    #[arg(long, global = true, value_name = "PATH")]
    pub readme: Option<PathBuf>,

    /// How many days to look back for a complete nightly [env: DIST_SYNC_BACKTRACK_LIMIT]
    #[arg(long, global = true, value_name = "DAYS")]
    pub backtrack_limit: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncCfg {
    pub dist_root: String,
    pub data_dir: PathBuf,
    pub readme: PathBuf,
    pub backtrack_limit: u32,
}

impl SyncCfg {
    pub fn from_args(process: &Process, args: &ConfigArgs) -> Result<Self> {
        let dist_root = match &args.dist_root {
            Some(root) => root.clone(),
            None => non_empty_var(process, DIST_ROOT_ENV)
                .unwrap_or_else(|| DEFAULT_DIST_ROOT.to_owned()),
        };
        let dist_root = dist_root.trim_end_matches('/').to_owned();
        url::Url::parse(&dist_root)
            .with_context(|| format!("invalid dist root: '{dist_root}'"))?;

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| non_empty_var(process, DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let readme = args
            .readme
            .clone()
            .or_else(|| non_empty_var(process, README_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_README));

        let backtrack_limit = args
            .backtrack_limit
            .or_else(|| parsed_var(process, BACKTRACK_LIMIT_ENV))
            .unwrap_or(DEFAULT_BACKTRACK_LIMIT)
            .max(1);

        Ok(Self {
            dist_root,
            data_dir,
            readme,
            backtrack_limit,
        })
    }

    /// Where the data for `channel` is written, e.g. `data/nightly.json`.
    pub fn data_file(&self, channel: Channel) -> PathBuf {
        self.data_dir.join(channel.file_name())
    }

    pub fn readme(&self) -> &Path {
        &self.readme
    }
}

fn non_empty_var(process: &Process, key: &str) -> Option<String> {
    process.var(key).ok().filter(|s| !s.is_empty())
}

fn parsed_var<T: FromStr>(process: &Process, key: &str) -> Option<T> {
    let value = non_empty_var(process, key)?;
    match value.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, %value, "ignoring unparsable environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn process(vars: &[(&str, &str)]) -> Process {
        Process::with_vars(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn defaults() {
        let cfg = SyncCfg::from_args(&process(&[]), &ConfigArgs::default()).unwrap();
        assert_eq!(
            cfg,
            SyncCfg {
                dist_root: DEFAULT_DIST_ROOT.to_owned(),
                data_dir: PathBuf::from("data"),
                readme: PathBuf::from("README.md"),
                backtrack_limit: 14,
            }
        );
        assert_eq!(cfg.data_file(Channel::Stable), Path::new("data/stable.json"));
    }

    #[test]
    fn env_overrides_defaults() {
        let p = process(&[
            (DIST_ROOT_ENV, "https://dev-static.rust-lang.org/dist/"),
            (DATA_DIR_ENV, "/srv/toolchains"),
            (README_ENV, "docs/targets.md"),
            (BACKTRACK_LIMIT_ENV, "30"),
        ]);
        let cfg = SyncCfg::from_args(&p, &ConfigArgs::default()).unwrap();
        assert_eq!(cfg.dist_root, "https://dev-static.rust-lang.org/dist");
        assert_eq!(cfg.data_dir, Path::new("/srv/toolchains"));
        assert_eq!(cfg.readme(), Path::new("docs/targets.md"));
        assert_eq!(cfg.backtrack_limit, 30);
    }

    #[test]
    fn args_override_env() {
        let p = process(&[
            (DIST_ROOT_ENV, "https://dev-static.rust-lang.org/dist"),
            (BACKTRACK_LIMIT_ENV, "30"),
        ]);
        let args = ConfigArgs {
            dist_root: Some("file:///srv/mirror".to_owned()),
            backtrack_limit: Some(3),
            ..ConfigArgs::default()
        };
        let cfg = SyncCfg::from_args(&p, &args).unwrap();
        assert_eq!(cfg.dist_root, "file:///srv/mirror");
        assert_eq!(cfg.backtrack_limit, 3);
    }

    #[test]
    fn bad_backtrack_limits() {
        let p = process(&[(BACKTRACK_LIMIT_ENV, "fortnight")]);
        let cfg = SyncCfg::from_args(&p, &ConfigArgs::default()).unwrap();
        assert_eq!(cfg.backtrack_limit, DEFAULT_BACKTRACK_LIMIT);

        let p = process(&[(BACKTRACK_LIMIT_ENV, "0")]);
        let cfg = SyncCfg::from_args(&p, &ConfigArgs::default()).unwrap();
        assert_eq!(cfg.backtrack_limit, 1);
    }

    #[test]
    fn dist_root_must_be_a_url() {
        let args = ConfigArgs {
            dist_root: Some("static.rust-lang.org".to_owned()),
            ..ConfigArgs::default()
        };
        let err = SyncCfg::from_args(&process(&[]), &args).unwrap_err();
        assert_eq!(err.to_string(), "invalid dist root: 'static.rust-lang.org'");
    }
}
