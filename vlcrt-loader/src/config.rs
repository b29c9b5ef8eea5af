//! Loader configuration and library location resolution
//!
//! Settings are resolved in priority order:
//! 1. Explicit overrides from the caller (command-line arguments)
//! 2. Environment variables (`VLCRT_LIBVLC_DIR`, `VLCRT_VERSION_CHECK`)
//! 3. TOML config file
//! 4. OS-dependent compiled default
//!
//! A missing config file is never an error. A malformed one is reported
//! when it was named explicitly and skipped with a warning otherwise.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::library::LibrarySearch;
use crate::platform::PlatformInfo;
use crate::version::VersionCheckMode;
use crate::{Error, Result};

/// Directory holding `libvlc` and `libvlccore`
pub const ENV_LIBVLC_DIR: &str = "VLCRT_LIBVLC_DIR";

/// `on` / `off` switch for the major version check
pub const ENV_VERSION_CHECK: &str = "VLCRT_VERSION_CHECK";

/// Effective loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderConfig {
    pub search: LibrarySearch,
    pub version_check: VersionCheckMode,
}

impl LoaderConfig {
    /// Compiled defaults for a platform
    pub fn for_platform(info: &PlatformInfo) -> Self {
        Self {
            search: LibrarySearch::default_for(info),
            version_check: VersionCheckMode::default_for(info),
        }
    }

    /// Resolve configuration for the running process
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        Self::resolve_for(&PlatformInfo::current(), overrides)
    }

    /// Resolve configuration as if running on `info`
    pub fn resolve_for(info: &PlatformInfo, overrides: &ConfigOverrides) -> Result<Self> {
        let defaults = Self::for_platform(info);
        let file = match &overrides.config_file {
            Some(path) => Some(load_toml_config(path)?),
            None => find_config_file().and_then(|path| match load_toml_config(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    None
                }
            }),
        };
        let file = file.unwrap_or_default();

        // Priority 1: caller, 2: environment, 3: file, 4: compiled default
        let search = match overrides.search.clone() {
            Some(search) => search,
            None => match std::env::var_os(ENV_LIBVLC_DIR) {
                Some(dir) if !dir.is_empty() => LibrarySearch::Directory(PathBuf::from(dir)),
                _ => file.library_search()?.unwrap_or(defaults.search),
            },
        };

        let version_check = match overrides.version_check {
            Some(mode) => mode,
            None => match env_version_check()? {
                Some(mode) => mode,
                None => file
                    .version_check
                    .map(VersionCheckMode::from_bool)
                    .unwrap_or(defaults.version_check),
            },
        };

        debug!("Library search: {}, version check: {:?}", search, version_check);
        Ok(Self {
            search,
            version_check,
        })
    }
}

/// Values supplied directly by the caller, taking precedence over everything
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub search: Option<LibrarySearch>,
    pub version_check: Option<VersionCheckMode>,
    /// Read this file instead of the default locations
    pub config_file: Option<PathBuf>,
}

/// Search strategy names accepted in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    System,
    Application,
    Directory,
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory holding the LibVLC libraries
    #[serde(default)]
    pub libvlc_dir: Option<PathBuf>,

    /// Search strategy; `libvlc_dir` alone implies `directory`
    #[serde(default)]
    pub search: Option<SearchKind>,

    #[serde(default)]
    pub version_check: Option<bool>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Search strategy described by the file, if any
    pub fn library_search(&self) -> Result<Option<LibrarySearch>> {
        let search = match (self.search, &self.libvlc_dir) {
            (Some(SearchKind::System), _) => Some(LibrarySearch::SystemDefault),
            (Some(SearchKind::Application), _) => Some(LibrarySearch::ApplicationRelative),
            (Some(SearchKind::Directory), Some(dir)) | (None, Some(dir)) => {
                Some(LibrarySearch::Directory(dir.clone()))
            }
            (Some(SearchKind::Directory), None) => {
                return Err(Error::Config(
                    "search = \"directory\" requires libvlc_dir".to_string(),
                ))
            }
            (None, None) => None,
        };
        Ok(search)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
}

/// First existing config file in the platform's default locations
pub fn find_config_file() -> Option<PathBuf> {
    default_config_paths().into_iter().find(|path| path.exists())
}

/// Candidate config file locations, most specific first
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = dirs::config_dir()
        .map(|d| d.join("vlcrt").join("config.toml"))
        .into_iter()
        .collect();
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/etc/vlcrt/config.toml"));
    }
    paths
}

fn env_version_check() -> Result<Option<VersionCheckMode>> {
    let Ok(value) = std::env::var(ENV_VERSION_CHECK) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "on" | "true" | "yes" => Ok(Some(VersionCheckMode::Enabled)),
        "0" | "off" | "false" | "no" => Ok(Some(VersionCheckMode::Disabled)),
        other => Err(Error::Config(format!(
            "{} must be on or off, got {:?}",
            ENV_VERSION_CHECK, other
        ))),
    }
}
