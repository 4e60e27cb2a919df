use std::path::{Path, PathBuf};
use crate::global::utils::get_global_cache_dir;
use crate::util::{format_hash, url_basename};
use anyhow::{anyhow, Context, Result};
use tracing::debug;

/// Downloaded artifacts, keyed by their declared digest and file name.
///
/// Entries are never trusted on their own: callers re-verify the bytes
/// before using them.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    /// Cache rooted in the per-user cache directory.
    pub fn global() -> Result<Self> {
        Ok(Self::at(get_global_cache_dir()?.join("downloads")))
    }

    pub fn at<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, url: &str, hash: &str) -> Result<PathBuf> {
        let file_name = url_basename(url).ok_or(anyhow!("Could not determine artifact name"))?;
        Ok(self.dir.join(format!("{}--{}", format_hash(hash), file_name)))
    }

    pub fn get(&self, url: &str, hash: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(url, hash)?;
        if !path.exists() {
            return Ok(None);
        }
        debug!(path = %path.display(), "cache hit");
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Could not read cache file {:?}", path))?;
        Ok(Some(bytes))
    }

    pub fn put(&self, url: &str, hash: &str, bytes: &[u8]) -> Result<PathBuf> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)
                .with_context(|| format!("Could not create cache dir {:?}", self.dir))?;
            debug!(dir = %self.dir.display(), "cache directory created");
        }
        let path = self.entry_path(url, hash)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Could not write cache file {:?}", path))?;
        Ok(path)
    }

    pub fn remove(&self, url: &str, hash: &str) -> Result<()> {
        let path = self.entry_path(url, hash)?;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn clean(&self) -> Result<()> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir)?;
        }
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}
