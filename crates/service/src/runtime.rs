//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime` without depending directly on `common`.

/// Ensure the data directory exists and report a missing seed file.
pub async fn ensure_env(items_path: &str, seed_path: Option<&str>) -> anyhow::Result<()> {
    common::env::ensure_data_dir(items_path).await?;
    common::env::check_seed(seed_path).await;
    Ok(())
}
