//! # Suggest Core Library
//!
//! This crate contains the logic behind `suggest`, a CLI that asks an LLM for
//! a single shell command matching a plain-language description, and behind
//! `suggest-formula`, the small package host that installs and smoke-tests a
//! prebuilt `suggest` binary from its formula.
//!
//! ## Modules Overview
//! - [`formula`] – The `FormulaSpec` descriptor and the `Formula` trait (`install`, `test`)
//! - [`installer`] – Install/test contexts and the host operations that drive a formula
//! - [`fetch`] – Downloading, SHA-256 verification and staging of artifacts
//! - [`llm`] – Gemini, OpenAI and Anthropic clients plus provider selection
//! - [`suggestion`] – Parsing the model's reply into a command
//! - [`runner`] – Running a suggested command
//! - [`ui`] – Colours, spinner, prompts and clipboard
//! - [`config`] – `config.toml` and environment overrides
//! - [`global`] – Per-user directories and the artifact cache
//! - [`util`] – Shared helpers (hashing, versions, paths)

pub mod config;
pub mod error;
pub mod fetch;
pub mod formula;
pub mod global;
pub mod installer;
pub mod llm;
pub mod logging;
pub mod runner;
pub mod suggestion;
pub mod ui;
pub mod util;

pub use config::Config;
pub use error::FormulaError;
pub use formula::{Formula, FormulaSpec, SUGGEST_HELP_TEXT};
pub use installer::{fetch_formula, install_formula, test_formula, InstallContext, InstallOptions, TestContext};
pub use llm::{select_provider, LlmError, Provider, ProviderKind};
pub use suggestion::Suggestion;
