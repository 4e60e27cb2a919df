use std::path::{Path, PathBuf};
use std::process::Command;
use regex::Regex;
use tracing::{debug, info};
use crate::error::FormulaError;
use crate::fetch::{stage, Fetcher};
use crate::formula::Formula;
use crate::global::cache::ArtifactCache;
use crate::util::{ensure_bin_dir, find_file, make_executable};

/// What a formula's `install` step can see: the staged download and the
/// prefix it installs into.
#[derive(Debug)]
pub struct InstallContext {
    staging: PathBuf,
    prefix: PathBuf,
}

impl InstallContext {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(staging: P, prefix: Q) -> Self {
        Self {
            staging: staging.as_ref().to_path_buf(),
            prefix: prefix.as_ref().to_path_buf(),
        }
    }

    /// `<prefix>/bin`
    pub fn bin(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// Copies the staged file `source` to `<prefix>/bin/<target>` and marks
    /// it executable. Returns the installed path.
    pub fn bin_install(&self, source: &str, target: &str) -> Result<PathBuf, FormulaError> {
        let staged = find_file(&self.staging, source)
            .map_err(|e| FormulaError::Install(e.to_string()))?
            .ok_or_else(|| FormulaError::MissingArtifact(self.staging.join(source)))?;
        let bin = ensure_bin_dir(&self.prefix)
            .map_err(|e| FormulaError::Install(format!("{e:#}")))?;
        let dest = bin.join(target);
        debug!(from = %staged.display(), to = %dest.display(), "bin install");
        std::fs::copy(&staged, &dest).map_err(|e| {
            FormulaError::Install(format!("could not write {}: {e}", dest.display()))
        })?;
        make_executable(&dest).map_err(|e| FormulaError::Install(format!("{e:#}")))?;
        Ok(dest)
    }
}

/// What a formula's `test` step can see: the installed prefix.
#[derive(Debug)]
pub struct TestContext {
    prefix: PathBuf,
}

impl TestContext {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Self {
        Self { prefix: prefix.as_ref().to_path_buf() }
    }

    /// `<prefix>/bin`
    pub fn bin(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// Runs `program` with `args` and returns its stdout. Spawn failures
    /// and non-zero exits are test failures.
    pub fn shell_output(&self, program: &Path, args: &[String]) -> Result<String, FormulaError> {
        debug!(program = %program.display(), ?args, "running test command");
        let output = Command::new(program).args(args).output().map_err(|e| {
            FormulaError::TestFailed(format!("could not run {}: {e}", program.display()))
        })?;
        if !output.status.success() {
            return Err(FormulaError::TestFailed(format!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Fails unless `output` contains `expected` literally.
    pub fn assert_match(&self, expected: &str, output: &str) -> Result<(), FormulaError> {
        let re = Regex::new(&regex::escape(expected))
            .map_err(|e| FormulaError::TestFailed(e.to_string()))?;
        if re.is_match(output) {
            Ok(())
        } else {
            Err(FormulaError::TestFailed(format!(
                "expected output to contain {expected:?}"
            )))
        }
    }
}

/// Knobs for [`install_formula`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Skip the artifact cache entirely.
    pub no_cache: bool,
    /// Use this cache instead of the per-user one.
    pub cache_dir: Option<PathBuf>,
}

impl InstallOptions {
    fn cache(&self) -> Option<ArtifactCache> {
        if self.no_cache {
            return None;
        }
        match &self.cache_dir {
            Some(dir) => Some(ArtifactCache::at(dir)),
            None => ArtifactCache::global().ok(),
        }
    }
}

/// Fetches and verifies the artifact without installing it.
pub fn fetch_formula<F: Formula>(formula: &F, options: &InstallOptions) -> Result<Vec<u8>, FormulaError> {
    let spec = formula.spec();
    spec.validate()?;
    Fetcher::new(options.cache())?.fetch(spec)
}

/// Fetch, verify, stage, then run the formula's `install` into `prefix`.
///
/// Nothing under `prefix` is touched unless the digest matches. Returns the
/// installed binary path.
pub fn install_formula<F: Formula, P: AsRef<Path>>(
    formula: &F,
    prefix: P,
    options: &InstallOptions,
) -> Result<PathBuf, FormulaError> {
    let spec = formula.spec();
    let bytes = fetch_formula(formula, options)?;

    let staging = tempfile::tempdir()?;
    stage(&spec.url, &bytes, staging.path())?;

    let ctx = InstallContext::new(staging.path(), prefix.as_ref());
    formula.install(&ctx)?;

    let installed = ctx.bin().join(spec.bin_name());
    if !installed.is_file() {
        return Err(FormulaError::Install(format!(
            "{} was not installed",
            installed.display()
        )));
    }
    info!("Installed {} {} to {}", spec.name, spec.version, installed.display());
    Ok(installed)
}

/// Runs the formula's `test` against an installed prefix.
pub fn test_formula<F: Formula, P: AsRef<Path>>(formula: &F, prefix: P) -> Result<(), FormulaError> {
    let ctx = TestContext::new(prefix);
    formula.test(&ctx)?;
    info!("{} passed its test", formula.spec().name);
    Ok(())
}
