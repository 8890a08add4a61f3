#![allow(clippy::large_enum_variant)]

use std::path::PathBuf;

use thiserror::Error as ThisError;
use url::Url;

pub const INVALID_DATE_MSG: &str = "dates must be formatted as YYYY-MM-DD";

#[derive(ThisError, Debug)]
pub enum SyncError {
    #[error("could not create {name} directory: '{}'", .path.display())]
    CreatingDirectory { name: &'static str, path: PathBuf },
    #[error("could not download file from '{url}'")]
    DownloadingFile { url: Url },
    #[error("could not download nonexistent file '{url}'")]
    DownloadNotExists { url: Url },
    #[error("invalid manifest date '{0}'; {msg}", msg = INVALID_DATE_MSG)]
    InvalidManifestDate(String),
    #[error("could not read {name} file: '{}'", .path.display())]
    ReadingFile { name: &'static str, path: PathBuf },
    #[error("README does not contain the target list marker '{marker}' twice (found {found})")]
    ReadmeMarkerMissing { marker: &'static str, found: usize },
    #[error("manifest version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("could not write {name} file: '{}'", .path.display())]
    WritingFile { name: &'static str, path: PathBuf },
}
