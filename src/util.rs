use std::path::{Path, PathBuf};
use anyhow::{bail, Result};
use semver::Version;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Strips the `sha256:` prefix from a hash if present and lowercases it.
/// This is useful for comparing hashes uniformly.
pub fn format_hash(hash: &str) -> String {
    hash.strip_prefix("sha256:")
        .unwrap_or(hash)
        .trim()
        .to_ascii_lowercase()
}

/// Returns the lowercase hex SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Checks that `hash` is a 64 digit hex string (after [`format_hash`]).
pub fn is_valid_sha256(hash: &str) -> bool {
    let hash = format_hash(hash);
    hash.len() == 64 && hex::decode(&hash).is_ok()
}

/// Validates whether a version string is a valid SemVer version.
/// Ignores a leading `v`.
pub fn is_valid_version(version: &str) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);
    Version::parse(version).is_ok()
}

/// Human name of the host operating system, as shown to the model.
pub fn os_name() -> String {
    match std::env::consts::OS {
        "macos" => "macOS".to_string(),
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        other => other.to_string(),
    }
}

/// Returns the last path segment of a URL or path, ignoring any query string.
pub fn url_basename(url: &str) -> Option<&str> {
    let url = url.split(['?', '#']).next()?;
    url.trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

/// True for artifact names the host unpacks before install.
pub fn is_archive(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".tar.gz") || lower.ends_with(".tgz") || lower.ends_with(".zip")
}

/// Searches `root` recursively for a regular file called `name`.
/// A direct child wins over nested matches.
pub fn find_file(root: &Path, name: &str) -> Result<Option<PathBuf>> {
    let direct = root.join(name);
    if direct.is_file() {
        return Ok(Some(direct));
    }
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == name {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}

/// Marks a file as executable (`0o755`). No-op on Windows.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Checks if a given path is an executable file on Unix.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Checks if a given path has a Windows executable extension (.exe, .bat, .cmd).
#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_ascii_lowercase();
        matches!(ext.as_str(), "exe" | "bat" | "cmd")
    } else {
        false
    }
}

/// Ensures `<prefix>/bin` exists and returns it.
pub fn ensure_bin_dir<P: AsRef<Path>>(prefix: P) -> Result<PathBuf> {
    let bin = prefix.as_ref().join("bin");
    if bin.exists() && !bin.is_dir() {
        bail!("{} exists and is not a directory", bin.display());
    }
    std::fs::create_dir_all(&bin)?;
    Ok(bin)
}
