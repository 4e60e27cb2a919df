//! Downloading, verifying and staging formula artifacts.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use reqwest::Url;
use tracing::{debug, info, warn};
use crate::error::FormulaError;
use crate::formula::FormulaSpec;
use crate::global::cache::ArtifactCache;
use crate::util::{format_hash, is_archive, sha256_hex, url_basename};

const USER_AGENT: &str = concat!("suggest-formula/", env!("CARGO_PKG_VERSION"));

/// Fetches artifacts over HTTP(S) or from disk.
pub struct Fetcher {
    client: Client,
    cache: Option<ArtifactCache>,
}

impl Fetcher {
    pub fn new(cache: Option<ArtifactCache>) -> Result<Self, FormulaError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| FormulaError::Fetch {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, cache })
    }

    /// Returns the artifact bytes for `spec`, verified against its digest.
    ///
    /// Local sources are never cached. A cached entry that no longer
    /// verifies is dropped and downloaded again.
    pub fn fetch(&self, spec: &FormulaSpec) -> Result<Vec<u8>, FormulaError> {
        if let Some(path) = local_path(&spec.url) {
            debug!(path = %path.display(), "reading local artifact");
            let bytes = std::fs::read(&path).map_err(|e| FormulaError::Fetch {
                url: spec.url.clone(),
                reason: e.to_string(),
            })?;
            verify(&spec.url, &bytes, &spec.sha256)?;
            return Ok(bytes);
        }

        if let Some(cache) = &self.cache {
            if let Ok(Some(bytes)) = cache.get(&spec.url, &spec.sha256) {
                match verify(&spec.url, &bytes, &spec.sha256) {
                    Ok(()) => return Ok(bytes),
                    Err(e) => {
                        warn!("discarding cached artifact: {e}");
                        if let Err(e) = cache.remove(&spec.url, &spec.sha256) {
                            warn!("could not remove cached {}: {e:#}", spec.url);
                        }
                    }
                }
            }
        }

        let bytes = self.download(&spec.url)?;
        verify(&spec.url, &bytes, &spec.sha256)?;
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&spec.url, &spec.sha256, &bytes) {
                warn!("could not cache {}: {e:#}", spec.url);
            }
        }
        Ok(bytes)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FormulaError> {
        info!("Downloading {url}");
        let fetch_error = |reason: String| FormulaError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }
        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Resolves `file://` URLs and plain paths. `None` for remote URLs.
pub fn local_path(url: &str) -> Option<PathBuf> {
    let path = Path::new(url);
    // `C:\...` parses as a URL with a one-letter scheme.
    if cfg!(windows) && path.is_absolute() {
        return Some(path.to_path_buf());
    }
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed.to_file_path().ok(),
        Ok(_) => None,
        Err(_) => Some(path.to_path_buf()),
    }
}

/// Fails closed when `bytes` do not hash to `expected`.
pub fn verify(url: &str, bytes: &[u8], expected: &str) -> Result<(), FormulaError> {
    let expected = format_hash(expected);
    let actual = sha256_hex(bytes);
    if actual != expected {
        return Err(FormulaError::ChecksumMismatch {
            url: url.to_string(),
            expected,
            actual,
        });
    }
    debug!(sha256 = %actual, "checksum verified");
    Ok(())
}

/// Writes the artifact into `staging` under its URL basename and unpacks
/// it when it is a `.tar.gz`, `.tgz` or `.zip` archive.
pub fn stage(url: &str, bytes: &[u8], staging: &Path) -> Result<PathBuf, FormulaError> {
    let name = url_basename(url)
        .ok_or_else(|| FormulaError::Install(format!("cannot name artifact from {url}")))?;
    std::fs::create_dir_all(staging)?;
    let path = staging.join(name);
    std::fs::write(&path, bytes)?;

    if !is_archive(name) {
        return Ok(path);
    }
    if name.to_ascii_lowercase().ends_with(".zip") {
        debug!("unpacking zip {name}");
        zip::ZipArchive::new(Cursor::new(bytes))
            .and_then(|mut archive| archive.extract(staging))
            .map_err(|e| FormulaError::Install(format!("failed to unpack {name}: {e}")))?;
    } else {
        debug!("unpacking tarball {name}");
        tar::Archive::new(GzDecoder::new(Cursor::new(bytes)))
            .unpack(staging)
            .map_err(|e| FormulaError::Install(format!("failed to unpack {name}: {e}")))?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_verify_matches() {
        let hash = sha256_hex(b"suggest");
        verify("file:///x", b"suggest", &hash).unwrap();
        verify("file:///x", b"suggest", &format!("sha256:{}", hash.to_uppercase())).unwrap();
    }

    #[test]
    fn test_verify_fails_closed() {
        let err = verify("file:///x", b"tampered", &sha256_hex(b"suggest")).unwrap_err();
        assert!(matches!(err, FormulaError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_local_path() {
        assert!(local_path("https://github.com/sbsto/suggest").is_none());
        #[cfg(unix)]
        {
            assert_eq!(local_path("file:///tmp/suggest"), Some(PathBuf::from("/tmp/suggest")));
            assert_eq!(local_path("/tmp/suggest"), Some(PathBuf::from("/tmp/suggest")));
        }
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("suggest-linux");
        std::fs::write(&artifact, b"binary").unwrap();
        let spec = FormulaSpec::suggest()
            .with_source(artifact.to_str().unwrap(), &sha256_hex(b"binary"));

        let fetcher = Fetcher::new(None).unwrap();
        assert_eq!(fetcher.fetch(&spec).unwrap(), b"binary");

        let bad = spec.with_source(&spec.url, &sha256_hex(b"other"));
        assert!(fetcher.fetch(&bad).unwrap_err().is_fetch_error());
    }

    #[test]
    fn test_fetch_missing_local_file() {
        let spec = FormulaSpec::suggest()
            .with_source("/nonexistent/suggest", &sha256_hex(b"binary"));
        let err = Fetcher::new(None).unwrap().fetch(&spec).unwrap_err();
        assert!(matches!(err, FormulaError::Fetch { .. }));
    }

    const REMOTE: &str = "http://127.0.0.1:1/suggest-linux";

    #[test]
    fn test_fetch_uses_verified_cache_entry() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::at(dir.path());
        let hash = sha256_hex(b"cached binary");
        cache.put(REMOTE, &hash, b"cached binary").unwrap();

        let spec = FormulaSpec::suggest().with_source(REMOTE, &hash);
        let fetcher = Fetcher::new(Some(cache)).unwrap();
        assert_eq!(fetcher.fetch(&spec).unwrap(), b"cached binary");
    }

    #[test]
    fn test_fetch_discards_stale_cache_entry() {
        let dir = tempdir().unwrap();
        let cache = ArtifactCache::at(dir.path());
        let hash = sha256_hex(b"cached binary");
        cache.put(REMOTE, &hash, b"tampered").unwrap();

        let spec = FormulaSpec::suggest().with_source(REMOTE, &hash);
        let fetcher = Fetcher::new(Some(cache.clone())).unwrap();
        let err = fetcher.fetch(&spec).unwrap_err();

        assert!(matches!(err, FormulaError::Fetch { .. }));
        assert!(cache.get(REMOTE, &hash).unwrap().is_none());
    }

    #[test]
    fn test_stage_raw_binary() {
        let dir = tempdir().unwrap();
        let path = stage("https://x.io/v1/suggest-darwin-universal", b"bin", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("suggest-darwin-universal"));
        assert_eq!(std::fs::read(path).unwrap(), b"bin");
    }

    #[test]
    fn test_stage_unpacks_tarball() {
        let mut tar_bytes = Vec::new();
        {
            let encoder = flate2::write::GzEncoder::new(&mut tar_bytes, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(3);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, "suggest-1.0.0/suggest", &b"bin"[..]).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }
        let dir = tempdir().unwrap();
        stage("https://x.io/suggest-1.0.0.tar.gz", &tar_bytes, dir.path()).unwrap();
        assert!(dir.path().join("suggest-1.0.0").join("suggest").is_file());
    }

    #[test]
    fn test_stage_unpacks_zip() {
        let mut zip_bytes = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut zip_bytes));
            writer
                .start_file("suggest.exe", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"bin").unwrap();
            writer.finish().unwrap();
        }
        let dir = tempdir().unwrap();
        stage("https://x.io/suggest-windows.zip", &zip_bytes, dir.path()).unwrap();
        assert!(dir.path().join("suggest.exe").is_file());
    }
}
