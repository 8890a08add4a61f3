use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::config::{ConfigArgs, SyncCfg};
use crate::dist::Channel;
use crate::dist::channel::fetch_channel;
use crate::dist::dist::parse_manifest_date;
use crate::dist::nightly::{NightlyRecord, fetch_nightly};
use crate::errors::INVALID_DATE_MSG;
use crate::process::Process;
use crate::readme;
use crate::utils::utils;

/// Mirror Rust release channel manifests into compact JSON records
#[derive(Debug, Parser)]
#[command(name = "rust-dist-sync", version, about)]
pub struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub subcmd: Option<SyncSubcmd>,
}

#[derive(Debug, Subcommand)]
pub enum SyncSubcmd {
    /// Sync nightly, the README target list, stable and beta (the default)
    All {
        /// Newest nightly to consider, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Sync the nightly record and the README target list
    Nightly {
        /// Newest nightly to consider, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Mirror the current stable or beta manifest
    Channel {
        #[arg(value_enum)]
        channel: MirroredChannel,
    },

    /// Rewrite the README target list from the existing nightly record
    Readme,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MirroredChannel {
    Stable,
    Beta,
}

impl From<MirroredChannel> for Channel {
    fn from(channel: MirroredChannel) -> Self {
        match channel {
            MirroredChannel::Stable => Self::Stable,
            MirroredChannel::Beta => Self::Beta,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_manifest_date(s).ok_or_else(|| format!("invalid date '{s}'; {INVALID_DATE_MSG}"))
}

pub fn main(process: &Process, cli: &Cli) -> Result<()> {
    let cfg = SyncCfg::from_args(process, &cli.config)?;

    match cli.subcmd {
        None => all(&cfg, None),
        Some(SyncSubcmd::All { date }) => all(&cfg, date),
        Some(SyncSubcmd::Nightly { date }) => {
            let record = sync_nightly(&cfg, date)?;
            sync_readme(&cfg, &record)
        }
        Some(SyncSubcmd::Channel { channel }) => sync_channel(&cfg, channel.into()),
        Some(SyncSubcmd::Readme) => {
            let record = load_nightly(&cfg)?;
            sync_readme(&cfg, &record)
        }
    }
}

fn all(cfg: &SyncCfg, date: Option<NaiveDate>) -> Result<()> {
    let record = sync_nightly(cfg, date)?;
    sync_readme(cfg, &record)?;
    sync_channel(cfg, Channel::Stable)?;
    sync_channel(cfg, Channel::Beta)
}

pub fn sync_nightly(cfg: &SyncCfg, date: Option<NaiveDate>) -> Result<NightlyRecord> {
    let record = fetch_nightly(&cfg.dist_root, date, cfg.backtrack_limit)?;
    write_json(cfg, Channel::Nightly, &record)?;
    Ok(record)
}

pub fn sync_channel(cfg: &SyncCfg, channel: Channel) -> Result<()> {
    let record = fetch_channel(&cfg.dist_root, channel)?;
    write_json(cfg, channel, &record)?;
    Ok(())
}

pub fn sync_readme(cfg: &SyncCfg, record: &NightlyRecord) -> Result<()> {
    readme::update_readme_file(cfg.readme(), record.cross_targets())
}

fn load_nightly(cfg: &SyncCfg) -> Result<NightlyRecord> {
    let path = cfg.data_file(Channel::Nightly);
    let data = utils::read_file("nightly data", &path)?;
    serde_json::from_str(&data)
        .with_context(|| format!("could not parse nightly data: '{}'", path.display()))
}

fn write_json<T: Serialize>(cfg: &SyncCfg, channel: Channel, value: &T) -> Result<()> {
    utils::ensure_dir_exists("data", &cfg.data_dir)?;
    let path = cfg.data_file(channel);

    let mut json = serde_json::to_string_pretty(value)
        .with_context(|| format!("could not serialize {channel} data"))?;
    json.push('\n');
    utils::write_file("data", &path, &json)?;

    info!(%channel, path = %path.display(), "wrote channel data");
    Ok(())
}
