use std::path::PathBuf;
use tempfile::TempDir;
use suggest::util::sha256_hex;
use suggest::FormulaSpec;

/// The freshly built `suggest` binary, used as a local release artifact.
fn built_suggest() -> PathBuf {
    assert_cmd::cargo::cargo_bin("suggest")
}

fn setup_tests() -> (TempDir, FormulaSpec) {
    let prefix = TempDir::new().unwrap();
    let artifact = built_suggest();
    let bytes = std::fs::read(&artifact).unwrap();
    let spec = FormulaSpec::suggest().with_source(artifact.to_str().unwrap(), &sha256_hex(&bytes));
    (prefix, spec)
}

/// Packs the built binary as `suggest-1.0.0/suggest` into a `.tar.gz`
/// release archive inside `dir`.
fn packed_suggest(dir: &std::path::Path) -> PathBuf {
    let bytes = std::fs::read(built_suggest()).unwrap();
    let archive = dir.join("suggest-1.0.0.tar.gz");
    let file = std::fs::File::create(&archive).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, "suggest-1.0.0/suggest", bytes.as_slice()).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
    archive
}

#[cfg(test)]
mod tests {
    use suggest::installer::{install_formula, test_formula, InstallOptions};
    use suggest::util::sha256_hex;
    use suggest::{FormulaError, FormulaSpec};
    use crate::{packed_suggest, setup_tests};

    fn no_cache() -> InstallOptions {
        InstallOptions { no_cache: true, ..Default::default() }
    }

    #[test]
    fn test_setup() {
        let (prefix, spec) = setup_tests();
        assert!(prefix.path().exists());
        spec.validate().unwrap();
        assert_eq!(spec.bin_name(), "suggest");
    }

    #[test]
    fn test_install_places_exactly_one_binary() {
        let (prefix, spec) = setup_tests();
        let installed = install_formula(&spec, prefix.path(), &no_cache()).unwrap();

        assert_eq!(installed, prefix.path().join("bin").join("suggest"));
        let entries: Vec<_> = std::fs::read_dir(prefix.path().join("bin")).unwrap().collect();
        assert_eq!(entries.len(), 1);
        #[cfg(unix)]
        assert!(suggest::util::is_executable(&installed));
    }

    #[test]
    fn test_installed_binary_passes_test() {
        let (prefix, spec) = setup_tests();
        install_formula(&spec, prefix.path(), &no_cache()).unwrap();
        test_formula(&spec, prefix.path()).unwrap();
        // unchanged install, same verdict
        test_formula(&spec, prefix.path()).unwrap();
    }

    #[test]
    fn test_install_from_tarball() {
        let prefix = tempfile::tempdir().unwrap();
        let dist = tempfile::tempdir().unwrap();
        let archive = packed_suggest(dist.path());
        let hash = sha256_hex(&std::fs::read(&archive).unwrap());
        let spec = FormulaSpec::suggest().with_source(archive.to_str().unwrap(), &hash);

        let installed = install_formula(&spec, prefix.path(), &no_cache()).unwrap();
        assert_eq!(installed, prefix.path().join("bin").join("suggest"));
        let magic = std::fs::read(&installed).unwrap();
        assert_ne!(&magic[..2], &[0x1f, 0x8b]);
        test_formula(&spec, prefix.path()).unwrap();
    }

    #[test]
    fn test_checksum_mismatch_installs_nothing() {
        let (prefix, spec) = setup_tests();
        let tampered = spec.with_source(&spec.url, &sha256_hex(b"not the binary"));

        let err = install_formula(&tampered, prefix.path(), &no_cache()).unwrap_err();
        assert!(matches!(err, FormulaError::ChecksumMismatch { .. }));
        assert!(!prefix.path().join("bin").exists());
    }

    #[test]
    fn test_test_fails_without_install() {
        let (prefix, spec) = setup_tests();
        let err = test_formula(&spec, prefix.path()).unwrap_err();
        assert!(matches!(err, FormulaError::TestFailed(_)));
    }

    #[test]
    fn test_test_fails_on_changed_help_text() {
        let (prefix, spec) = setup_tests();
        install_formula(&spec, prefix.path(), &no_cache()).unwrap();
        let mut other = spec.clone();
        other.test.expect = "Something else entirely".to_string();
        assert!(test_formula(&other, prefix.path()).is_err());
    }

    #[test]
    fn test_cache_is_filled_for_remote_only() {
        let (prefix, spec) = setup_tests();
        let cache = tempfile::tempdir().unwrap();
        let options = InstallOptions {
            no_cache: false,
            cache_dir: Some(cache.path().to_path_buf()),
        };
        install_formula(&spec, prefix.path(), &options).unwrap();
        assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_builtin_formula_scenario() {
        let spec = FormulaSpec::suggest();
        assert_eq!(spec.version, "1.0.0");
        assert!(spec.url.ends_with("suggest-darwin-universal"));
        assert!(spec.sha256.starts_with("8fbb") && spec.sha256.ends_with("234"));
        assert_eq!(spec.test.expect, "Get CLI command suggestions using AI");
    }
}
