use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use langcap_config::{AppConfig, ENV_DATA_DIR};
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "dev";
const APP_ORG: &str = "langcap";
const APP_NAME: &str = "LangCapture";

pub const MAIN_PROFILE: &str = "main";

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: AppConfig,
}

/// Where a loaded profile lives, kept so it can be reloaded
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLocation {
    pub data_dir: PathBuf,
    pub name: String,
}

impl ProfileLocation {
    pub fn load(&self) -> anyhow::Result<AppConfig> {
        load_user_profile(&self.data_dir, &self.name)
    }
}

/// Data directory: explicit override, then `LANGCAP_DATA_DIR`, then the
/// platform data dir
pub fn data_root(cli_override: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = cli_override {
        return Ok(dir);
    }

    if let Some(dir) = std::env::var_os(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .context("Could not determine a data directory; pass --data-dir")
}

pub fn profiles_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("profiles")
}

fn profile_path(data_dir: &Path, name: &str) -> PathBuf {
    profiles_dir(data_dir).join(format!("{name}.json"))
}

fn read_profile(path: &Path) -> anyhow::Result<AppConfig> {
    let data = fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("Invalid profile file {}", path.display()))?;
    Ok(profile.value)
}

fn write_profile(path: &Path, profile: &Profile) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(profile)?)?;
    Ok(())
}

/// Create the profiles folder and the main profile if missing
pub fn init_user_config(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(profiles_dir(data_dir))?;

    let main_profile = profile_path(data_dir, MAIN_PROFILE);
    if !main_profile.exists() {
        let profile = Profile {
            name: MAIN_PROFILE.into(),
            value: AppConfig::default(),
        };
        write_profile(&main_profile, &profile)?;
        tracing::info!("Created main profile at {:?}", main_profile);
    }

    Ok(())
}

/// Load a profile by name, falling back to main, then to defaults
pub fn load_user_profile(data_dir: &Path, name: &str) -> anyhow::Result<AppConfig> {
    let profile_file = profile_path(data_dir, name);
    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile");
    let main_file = profile_path(data_dir, MAIN_PROFILE);
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(AppConfig::default())
    }
}

/// Add a new profile cloned from main
pub fn add_profile_from_default(data_dir: &Path, new_name: &str) -> anyhow::Result<PathBuf> {
    let profile = Profile {
        name: new_name.into(),
        value: load_user_profile(data_dir, MAIN_PROFILE)?,
    };
    let file = profile_path(data_dir, new_name);
    write_profile(&file, &profile)?;
    tracing::info!("Created new profile: {new_name}");
    Ok(file)
}
