//! Host for the `suggest` formula: fetch, verify, install into a prefix and
//! smoke-test the prebuilt binary.

use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use suggest::global::cache::ArtifactCache;
use suggest::ui::{error_style, success_style};
use suggest::{fetch_formula, install_formula, logging, test_formula, FormulaSpec, InstallOptions};

#[derive(Debug, Parser, Clone)]
#[clap(name = "suggest-formula", author, version, about = "Install and verify the suggest formula", long_about = None)]
struct CLI {
    /// Formula file to use instead of the built-in one
    #[clap(long, global = true)]
    formula: Option<PathBuf>,
    /// More log output on stderr (repeatable)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: FormulaCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
enum FormulaCommand {
    /// Print the formula descriptor
    Info,
    /// Download and verify the artifact without installing it
    Fetch {
        /// Do not read or write the download cache
        #[clap(long)]
        no_cache: bool,
    },
    /// Install into `<prefix>/bin`, then run the formula's test
    Install {
        #[clap(long)]
        prefix: PathBuf,
        /// Install this artifact instead (URL or path); requires `--sha256`
        #[clap(long, requires = "sha256")]
        url: Option<String>,
        /// Digest of the `--url` artifact
        #[clap(long, requires = "url")]
        sha256: Option<String>,
        /// Do not read or write the download cache
        #[clap(long)]
        no_cache: bool,
        /// Skip the smoke test after installing
        #[clap(long)]
        skip_test: bool,
    },
    /// Run the formula's test against an existing install
    Test {
        #[clap(long)]
        prefix: PathBuf,
    },
    /// Empty the download cache
    CleanCache,
}

fn main() {
    let cli = CLI::parse();
    logging::init(cli.verbose);
    if let Err(e) = execute(cli) {
        eprintln!("{}", error_style(&format!("Error: {e:#}")));
        std::process::exit(1);
    }
}

fn load_formula(path: Option<&PathBuf>) -> Result<FormulaSpec> {
    let spec = match path {
        Some(path) => FormulaSpec::load(path)
            .with_context(|| format!("could not load formula {}", path.display()))?,
        None => FormulaSpec::suggest(),
    };
    spec.validate()?;
    Ok(spec)
}

fn execute(cli: CLI) -> Result<()> {
    match cli.command {
        FormulaCommand::CleanCache => execute_clean_cache(&ArtifactCache::global()?),
        command => execute_formula(load_formula(cli.formula.as_ref())?, command),
    }
}

fn execute_formula(spec: FormulaSpec, command: FormulaCommand) -> Result<()> {
    match command {
        FormulaCommand::Info => execute_info(&spec),
        FormulaCommand::Fetch { no_cache } => {
            let options = InstallOptions { no_cache, ..Default::default() };
            let bytes = fetch_formula(&spec, &options)?;
            println!("{}", success_style(&format!("Verified {} ({} bytes)", spec.url, bytes.len())));
            Ok(())
        }
        FormulaCommand::Install { prefix, url, sha256, no_cache, skip_test } => {
            let spec = match (url, sha256) {
                (Some(url), Some(sha256)) => spec.with_source(&url, &sha256),
                (None, None) => spec,
                _ => bail!("--url and --sha256 must be given together"),
            };
            let options = InstallOptions { no_cache, ..Default::default() };
            let installed = install_formula(&spec, &prefix, &options)?;
            println!("{}", success_style(&format!("Installed {}", installed.display())));
            if !skip_test {
                test_formula(&spec, &prefix)?;
                println!("{}", success_style("Test passed"));
            }
            Ok(())
        }
        FormulaCommand::Test { prefix } => {
            test_formula(&spec, &prefix)?;
            println!("{}", success_style("Test passed"));
            Ok(())
        }
        FormulaCommand::CleanCache => execute_clean_cache(&ArtifactCache::global()?),
    }
}

fn execute_clean_cache(cache: &ArtifactCache) -> Result<()> {
    cache.clean()?;
    println!("{}", success_style(&format!("Cleaned {}", cache.dir().display())));
    Ok(())
}

fn execute_info(spec: &FormulaSpec) -> Result<()> {
    println!("{}: {}", spec.name, spec.version);
    println!("  {}", spec.desc);
    println!("  homepage: {}", spec.homepage);
    println!("  source: {}", spec.url);
    println!("  # sha256: {}", spec.sha256);
    println!(
        "  installs: {} -> bin/{}",
        spec.staged_name().unwrap_or("?"),
        spec.bin_name()
    );
    println!("  test: {} {}", spec.bin_name(), spec.test.args.join(" "));
    Ok(())
}
