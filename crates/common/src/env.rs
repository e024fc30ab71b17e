//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the directory holding `data_file` exists, creating it if needed.
pub async fn ensure_data_dir(data_file: &str) -> anyhow::Result<()> {
    let parent = match Path::new(data_file).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
    debug!(dir = %parent.display(), "data directory ready");
    Ok(())
}

/// Warn when an optional seed file is configured but missing.
pub async fn check_seed(seed_file: Option<&str>) {
    if let Some(seed) = seed_file {
        if tokio::fs::metadata(seed).await.is_err() {
            warn!(%seed, "seed file not found; a missing data file will start empty");
        }
    }
}
