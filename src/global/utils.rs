use std::path::PathBuf;
use anyhow::{anyhow, Result};
use directories::ProjectDirs;

pub fn get_global_config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn get_global_cache_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.cache_dir().to_path_buf())
}

/// Path of `config.toml`, honouring `SUGGEST_CONFIG` when it is set.
pub fn get_global_config_file() -> Result<PathBuf> {
    match std::env::var_os("SUGGEST_CONFIG") {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(get_global_config_dir()?.join("config.toml")),
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "sbsto", "suggest")
        .ok_or_else(|| anyhow!("Could not get project directories"))
}
