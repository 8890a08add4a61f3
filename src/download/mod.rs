//! Fetching documents from the dist server

use std::fs;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, anyhow};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::{Proxy, StatusCode};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::errors::SyncError;


const USER_AGENT: &str = concat!("rust-dist-sync/", env!("CARGO_PKG_VERSION"));

/// Downloads `url` into memory as UTF-8 text.
///
/// Errors caused by the document not existing are reported as
/// [`SyncError::DownloadNotExists`]; every other failure is
/// [`SyncError::DownloadingFile`].
pub fn download_string(url: &Url) -> anyhow::Result<String> {
    match download_string_(url) {
        Ok(s) => Ok(s),
        Err(e) => {
            // The dist server's storage answers 403 for keys it does not have.
            let is_not_found = match e.downcast_ref::<DownloadError>() {
                Some(DownloadError::FileNotFound) => true,
                Some(DownloadError::HttpStatus(code)) => {
                    *code == StatusCode::NOT_FOUND || *code == StatusCode::FORBIDDEN
                }
                _ => false,
            };
            Err(e).with_context(|| {
                if is_not_found {
                    SyncError::DownloadNotExists { url: url.clone() }
                } else {
                    SyncError::DownloadingFile { url: url.clone() }
                }
            })
        }
    }
}

fn download_string_(url: &Url) -> anyhow::Result<String> {
    debug!(%url, "fetching");

    // Short-circuit the HTTP client for the "file:" URL scheme
    if url.scheme() == "file" {
        return download_from_file_url(url);
    }

    let client = CLIENT
        .as_ref()
        .map_err(|e| anyhow!("failed to build HTTP client: {e}"))?;
    let res = client
        .get(url.as_str())
        .send()
        .inspect_err(|error| error!(?error, "failed to download file"))
        .map_err(DownloadError::from)?;

    let status = res.status();
    if !status.is_success() {
        return Err(DownloadError::HttpStatus(status).into());
    }

    Ok(res.text().map_err(DownloadError::from)?)
}

fn download_from_file_url(url: &Url) -> anyhow::Result<String> {
    let src = url
        .to_file_path()
        .map_err(|_| DownloadError::Message(format!("bogus file url: '{url}'")))?;
    if !src.is_file() {
        // Make a missing local file look the same as a missing remote one,
        // a mirrored dist tree is expected to behave like the server.
        return Err(DownloadError::FileNotFound.into());
    }

    Ok(fs::read_to_string(&src).map_err(DownloadError::from)?)
}

fn client_generic() -> ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .proxy(Proxy::custom(env_proxy))
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(300))
}

static CLIENT: LazyLock<Result<Client, reqwest::Error>> =
    LazyLock::new(|| client_generic().build());

fn env_proxy(url: &Url) -> Option<Url> {
    env_proxy::for_url(url).to_url()
}

#[derive(Debug, Error)]
enum DownloadError {
    #[error("http request returned an unsuccessful status code: {0}")]
    HttpStatus(StatusCode),
    #[error("file not found")]
    FileNotFound,
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
