//! Keeping the cross-compilation target list in the README current.

use std::path::Path;

use anyhow::{Result, bail};
use tracing::info;

use crate::dist::TargetTriple;
use crate::errors::SyncError;
use crate::utils::utils;

/// Delimits the generated target list; it must appear twice.
pub const MARKER: &str = "<!-- cross-targets -->";

/// Replaces the text between the first two [`MARKER`]s with one bullet per
/// target.
pub fn update_readme_targets<'a>(
    readme: &str,
    targets: impl IntoIterator<Item = &'a TargetTriple>,
) -> Result<String> {
    let parts: Vec<&str> = readme.splitn(3, MARKER).collect();
    let [head, _, tail] = parts[..] else {
        bail!(SyncError::ReadmeMarkerMissing {
            marker: MARKER,
            found: readme.matches(MARKER).count(),
        });
    };

    let mut list = String::from("\n");
    for target in targets {
        list.push_str(&format!("- `{target}`\n"));
    }
    Ok(format!("{head}{MARKER}{list}{MARKER}{tail}"))
}

/// Rewrites the target list of the README at `path` in place.
pub fn update_readme_file<'a>(
    path: &Path,
    targets: impl IntoIterator<Item = &'a TargetTriple>,
) -> Result<()> {
    let readme = utils::read_file("README", path)?;
    let updated = update_readme_targets(&readme, targets)?;
    utils::write_file("README", path, &updated)?;
    info!(path = %path.display(), "updated cross target list");
    Ok(())
}
