use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default JPEG quality used when re-encoding rotated images.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Configuration for the orientation normalizer.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_orient::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.jpeg_quality = 95;
/// config.dry_run = true;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quality (1–100) for re-encoded JPEGs.
    pub jpeg_quality: u8,
    /// Descend into subdirectories of the root.
    pub recursive: bool,
    /// Report what would change without writing any file.
    pub dry_run: bool,
    /// Carry the original ICC colour profile into rewritten files.
    pub keep_icc_profile: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            recursive: false,
            dry_run: false,
            keep_icc_profile: true,
        }
    }
}

impl Config {
    /// Resolve the config file path — same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::debug!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            anyhow::bail!("jpeg_quality must be between 1 and 100, got {}", self.jpeg_quality);
        }
        Ok(())
    }
}
