use std::path::Path;
use anyhow::Result;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use crate::error::FormulaError;
use crate::installer::{InstallContext, TestContext};
use crate::util::{format_hash, is_archive, is_valid_sha256, is_valid_version, url_basename};

/// Help text fragment the installed `suggest` binary must print.
pub const SUGGEST_HELP_TEXT: &str = "Get CLI command suggestions using AI";

/// The two behaviours a host expects from a formula.
///
/// A host fetches and verifies [`FormulaSpec::url`] against
/// [`FormulaSpec::sha256`] before calling [`Formula::install`], then calls
/// [`Formula::test`] against the installed prefix.
pub trait Formula {
    /// Identity metadata of the package.
    fn spec(&self) -> &FormulaSpec;
    /// Place the staged artifact under the install prefix.
    fn install(&self, ctx: &InstallContext) -> Result<(), FormulaError>;
    /// Smoke-test the installed files.
    fn test(&self, ctx: &TestContext) -> Result<(), FormulaError>;
}

/// A declarative recipe for one prebuilt binary.
///
/// Serialized as TOML, see `Formula/suggest.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FormulaSpec {
    /// Package name, unique within a registry.
    pub name: String,
    /// Human readable description.
    pub desc: String,
    /// Project homepage.
    pub homepage: String,
    /// Location of the prebuilt artifact.
    pub url: String,
    /// Package version (semantic versioning).
    pub version: String,
    /// SHA-256 digest of the artifact, hex encoded.
    pub sha256: String,
    #[serde(default)]
    pub install: InstallSpec,
    #[serde(default)]
    pub test: TestSpec,
}

/// What `install` copies and under which name.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct InstallSpec {
    /// Staged file to install. Defaults to the artifact's file name, or to
    /// the install name when the artifact is an archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    /// Installed name under `bin/`. Defaults to the formula name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

/// How `test` exercises the installed binary.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TestSpec {
    #[serde(default = "default_test_args")]
    pub args: Vec<String>,
    /// Literal text that must appear on stdout.
    pub expect: String,
}

fn default_test_args() -> Vec<String> {
    vec!["--help".to_string()]
}

impl Default for TestSpec {
    fn default() -> Self {
        Self {
            args: default_test_args(),
            expect: String::new(),
        }
    }
}

impl FormulaSpec {
    /// The released `suggest` 1.0.0 universal macOS binary.
    pub fn suggest() -> FormulaSpec {
        FormulaSpec {
            name: "suggest".to_string(),
            desc: "CLI tool that suggests shell commands using AI APIs".to_string(),
            homepage: "https://github.com/sbsto/suggest".to_string(),
            url: "https://github.com/sbsto/suggest/releases/download/v1.0.0/suggest-darwin-universal".to_string(),
            version: "1.0.0".to_string(),
            sha256: "8fbb634a17022d01a2bb5d2fc9e10896e7656942875c898f5a2166c1ad22a234".to_string(),
            install: InstallSpec {
                bin: Some("suggest-darwin-universal".to_string()),
                rename: Some("suggest".to_string()),
            },
            test: TestSpec {
                args: default_test_args(),
                expect: SUGGEST_HELP_TEXT.to_string(),
            },
        }
    }

    /// Same recipe, different artifact. The staged file name follows the
    /// new URL (or the install name, for archives); the installed name does
    /// not change.
    pub fn with_source(&self, url: &str, sha256: &str) -> FormulaSpec {
        let mut spec = self.clone();
        spec.url = url.to_string();
        spec.sha256 = format_hash(sha256);
        spec.install.bin = None;
        spec.install.rename = Some(self.bin_name().to_string());
        spec
    }

    /// Loads a `FormulaSpec` from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<FormulaSpec> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| e.into())
    }

    /// Saves the `FormulaSpec` to the given file path in pretty TOML format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Name of the staged file `install` picks up.
    ///
    /// Defaults to the artifact's file name, or to [`Self::bin_name`] when
    /// the artifact is an archive that gets unpacked.
    pub fn staged_name(&self) -> Option<&str> {
        if let Some(bin) = self.install.bin.as_deref() {
            return Some(bin);
        }
        let artifact = url_basename(&self.url)?;
        if is_archive(artifact) {
            Some(self.bin_name())
        } else {
            Some(artifact)
        }
    }

    /// Name the binary is installed under.
    pub fn bin_name(&self) -> &str {
        self.install.rename.as_deref().unwrap_or(&self.name)
    }

    /// Checks every field invariant.
    pub fn validate(&self) -> Result<(), FormulaError> {
        let invalid = |reason: String| FormulaError::InvalidFormula {
            name: self.name.clone(),
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if !self.name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._+-".contains(c)) {
            return Err(invalid(format!("name `{}` has invalid characters", self.name)));
        }
        if self.desc.trim().is_empty() {
            return Err(invalid("desc is empty".to_string()));
        }
        if Url::parse(&self.homepage).is_err() {
            return Err(invalid(format!("homepage `{}` is not a URL", self.homepage)));
        }
        if !is_source(&self.url) {
            return Err(invalid(format!("url `{}` is not a fetchable location", self.url)));
        }
        if !is_valid_version(&self.version) {
            return Err(invalid(format!("version `{}` is not semantic", self.version)));
        }
        if !is_valid_sha256(&self.sha256) {
            return Err(invalid("sha256 must be 64 hex digits".to_string()));
        }
        if self.staged_name().is_none() {
            return Err(invalid("cannot determine the staged file name".to_string()));
        }
        let bin = self.bin_name();
        if bin.is_empty() || bin.contains(['/', '\\']) {
            return Err(invalid(format!("install name `{bin}` is not a plain file name")));
        }
        if self.test.expect.is_empty() {
            return Err(invalid("test.expect is empty".to_string()));
        }
        Ok(())
    }
}

/// `http(s)` and `file` URLs, or a plain filesystem path.
fn is_source(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https" | "file"),
        Err(_) => !url.is_empty() && url_basename(url).is_some(),
    }
}

impl Formula for FormulaSpec {
    fn spec(&self) -> &FormulaSpec {
        self
    }

    fn install(&self, ctx: &InstallContext) -> Result<(), FormulaError> {
        let staged = self
            .staged_name()
            .ok_or_else(|| FormulaError::Install("no staged file name".to_string()))?;
        ctx.bin_install(staged, self.bin_name())?;
        Ok(())
    }

    fn test(&self, ctx: &TestContext) -> Result<(), FormulaError> {
        let bin = ctx.bin().join(self.bin_name());
        let output = ctx.shell_output(&bin, &self.test.args)?;
        ctx.assert_match(&self.test.expect, &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_is_valid() {
        let spec = FormulaSpec::suggest();
        spec.validate().unwrap();
        assert_eq!(spec.version, "1.0.0");
        assert!(spec.url.ends_with("suggest-darwin-universal"));
        assert!(spec.sha256.starts_with("8fbb") && spec.sha256.ends_with("234"));
        assert_eq!(spec.staged_name(), Some("suggest-darwin-universal"));
        assert_eq!(spec.bin_name(), "suggest");
        assert_eq!(spec.test.args, vec!["--help"]);
        assert_eq!(spec.test.expect, SUGGEST_HELP_TEXT);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut spec = FormulaSpec::suggest();
        spec.name = String::new();
        assert!(spec.validate().is_err());

        let mut spec = FormulaSpec::suggest();
        spec.homepage = "not a url".to_string();
        assert!(spec.validate().is_err());

        let mut spec = FormulaSpec::suggest();
        spec.sha256 = "8fbb...234".to_string();
        let err = spec.validate().unwrap_err();
        assert!(err.is_fetch_error());

        let mut spec = FormulaSpec::suggest();
        spec.version = String::new();
        assert!(spec.validate().is_err());

        let mut spec = FormulaSpec::suggest();
        spec.install.rename = Some("bin/suggest".to_string());
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_with_source_keeps_install_name() {
        let spec = FormulaSpec::suggest();
        let local = spec.with_source("/tmp/build/suggest-linux", "SHA256:AB");
        assert_eq!(local.staged_name(), Some("suggest-linux"));
        assert_eq!(local.bin_name(), "suggest");
        assert_eq!(local.sha256, "ab");
        assert_eq!(spec, FormulaSpec::suggest());
    }

    #[test]
    fn test_archive_source_stages_install_name() {
        let local = FormulaSpec::suggest().with_source("/tmp/dist/suggest-1.0.0.tar.gz", "ab");
        assert_eq!(local.staged_name(), Some("suggest"));

        let zipped = FormulaSpec::suggest().with_source("https://x.io/suggest-windows.zip", "ab");
        assert_eq!(zipped.staged_name(), Some("suggest"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("suggest.toml");
        FormulaSpec::suggest().save(&path).unwrap();
        let loaded = FormulaSpec::load(&path).unwrap();
        assert_eq!(loaded, FormulaSpec::suggest());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let toml = r#"
            name = "tool"
            desc = "A tool"
            homepage = "https://example.com"
            url = "https://example.com/tool-1.2.3"
            version = "1.2.3"
            sha256 = "8fbb634a17022d01a2bb5d2fc9e10896e7656942875c898f5a2166c1ad22a234"

            [test]
            expect = "usage"
        "#;
        let spec: FormulaSpec = toml::from_str(toml).unwrap();
        spec.validate().unwrap();
        assert_eq!(spec.staged_name(), Some("tool-1.2.3"));
        assert_eq!(spec.bin_name(), "tool");
        assert_eq!(spec.test.args, vec!["--help"]);
    }

    #[test]
    fn test_shipped_formula_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Formula").join("suggest.toml");
        assert_eq!(FormulaSpec::load(path).unwrap(), FormulaSpec::suggest());
    }
}
