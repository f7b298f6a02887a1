use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use serde::Deserialize;
use tokio::fs;

/// Overrides the location of the settings file.
pub(crate) const CONFIG_ENV: &str = "JUJU_REMOVE_CONFIG";

/// User settings, read from `config.toml` in the platform config directory.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Controller to use when `--controller` is not given
    pub controller: Option<String>,
    /// Model to use when `--model` is not given
    pub model: Option<String>,
    pub juju: JujuSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct JujuSettings {
    /// Path to the `juju` client
    pub binary: PathBuf,
    /// Pass `--no-prompt` to removals that would otherwise ask for confirmation
    pub no_prompt: bool,
}

impl Default for JujuSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("juju"),
            no_prompt: true,
        }
    }
}

impl Settings {
    pub(crate) fn path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("com.github", "timClicks", env!("CARGO_PKG_NAME"))
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load settings from the default location. A missing file gives the defaults.
    pub(crate) async fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::from_file(path).await,
            None => {
                tracing::debug!("no config directory, using default settings");
                Ok(Self::default())
            }
        }
    }

    pub(crate) async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using default settings");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).wrap_err(format!("Failed to read {}", path.display()));
            }
        };

        tracing::debug!(path = %path.display(), "loading settings");
        toml::from_str(&contents).wrap_err(format!("Invalid settings in {}", path.display()))
    }
}
