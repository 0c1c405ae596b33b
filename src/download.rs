use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::LoopRecord;
use crate::config::AppConfig;

/// Producer tag archive, offered alongside the loops.
pub const TAG_FILE: &str = "tag.zip";

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("download request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Rewrite a catalog loop URL from the storage origin to the CDN. URLs that
/// don't carry the storage prefix pass through unchanged.
pub fn rewrite_url(url: &str, config: &AppConfig) -> String {
    url.replacen(&config.storage_prefix, &config.cdn_prefix, 1)
}

/// Local filename for a downloaded loop: `itsrighter-<title>.wav` with the
/// title's spaces replaced by hyphens.
pub fn local_filename(title: &str) -> String {
    format!("itsrighter-{}.wav", title.replace(' ', "-"))
}

/// URL of the producer tag archive on the CDN.
pub fn tag_url(config: &AppConfig) -> String {
    format!("{}{TAG_FILE}", config.cdn_prefix)
}

/// Download one loop through the CDN and save it under the destination
/// directory. Returns the path written.
pub fn save_loop(record: &LoopRecord, dest_dir: &Path, config: &AppConfig) -> Result<PathBuf> {
    let url = rewrite_url(&record.url, config);
    let path = dest_dir.join(local_filename(&record.title));
    fetch_to_file(&url, &path)?;
    Ok(path)
}

/// Download the producer tag archive.
pub fn save_tag(dest_dir: &Path, config: &AppConfig) -> Result<PathBuf> {
    let path = dest_dir.join(format!("itsrighter-{TAG_FILE}"));
    fetch_to_file(&tag_url(config), &path)?;
    Ok(path)
}

fn fetch_to_file(url: &str, path: &Path) -> Result<()> {
    log::debug!("Downloading {url}");
    let bytes = ureq::get(url).call()?.body_mut().read_to_vec()?;
    std::fs::write(path, &bytes)?;
    log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
