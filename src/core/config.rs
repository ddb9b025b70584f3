use crate::error::{Blupd8Error, Result};
use crate::utils::fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_RELEASES_URL: &str = "https://download.blender.org/release/";
pub const DEFAULT_PROJECT: &str = "blender";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Listing page whose folders are the published releases.
    pub releases_url: String,
    /// Lowercase project prefix as it appears in the release folder names.
    pub project: String,
    pub install_root: PathBuf,
    pub scratch_dir: PathBuf,
    /// Substring a package name must contain.
    pub platform: String,
    /// Suffix a package name must end with.
    pub package_type: String,
    pub user_agent: String,
    pub keep_downloads: bool,
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = get_blupd8_dir().unwrap_or_else(|_| PathBuf::from(".blupd8"));
        Self::with_base_dir(&base_dir)
    }
}

impl Config {
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Config {
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            install_root: base_dir.join("versions"),
            scratch_dir: base_dir.join("downloads"),
            platform: default_platform().to_string(),
            package_type: default_package_type().to_string(),
            user_agent: format!("blupd8/{}", env!("CARGO_PKG_VERSION")),
            keep_downloads: false,
        }
    }

    /// Reads `~/.blupd8/config.json`, writing the defaults on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::ensure_dir_exists(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.releases_url.ends_with('/') {
            return Err(Blupd8Error::config_error(format!(
                "releases_url must end with '/': {}",
                self.releases_url
            )));
        }
        if self.project.is_empty() || self.project != self.project.to_lowercase() {
            return Err(Blupd8Error::config_error(format!(
                "project must be a non-empty lowercase name: '{}'",
                self.project
            )));
        }
        if self.package_type.trim_start_matches('.').is_empty() {
            return Err(Blupd8Error::config_error("package_type must not be empty"));
        }
        Ok(())
    }

    /// Fixed scratch file for one version, e.g. `downloads/blender-2.80.zip`.
    pub fn download_path(&self, version: &str) -> PathBuf {
        let extension = self.package_type.trim_start_matches('.');
        self.scratch_dir
            .join(format!("{}-{version}.{extension}", self.project))
    }
}

fn default_platform() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "macos"
    } else {
        "linux"
    }
}

fn default_package_type() -> &'static str {
    if cfg!(target_os = "linux") {
        "tar.bz2"
    } else {
        "zip"
    }
}

fn get_blupd8_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".blupd8"))
        .ok_or(Blupd8Error::HomeDirectoryNotFound)
}

fn get_config_path() -> Result<PathBuf> {
    Ok(get_blupd8_dir()?.join("config.json"))
}
