//! TOML configuration, read once at startup from the platform config dir.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How the config was obtained; logged at startup.
#[derive(Debug, Clone)]
pub enum ConfigLoadStatus {
    /// Read from an existing file.
    Loaded,
    /// No file yet; defaults written out (first run).
    Created,
    /// File unreadable or malformed; running on defaults.
    /// The string shows up in the Debug log line.
    #[allow(dead_code)]
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Columns per tab stop when rendering the buffer.
    pub tab_width: u8,
    /// Whether the gutter shows line numbers.
    pub show_line_numbers: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            show_line_numbers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Clamp values that would break rendering. Run after deserialization.
    pub fn normalize(&mut self) {
        self.editor.tab_width = self.editor.tab_width.clamp(1, 16);
    }
}

/// [`load_config`] result: the config plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub status: ConfigLoadStatus,
}

fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "pysnip", "pysnip")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config file, creating it with defaults on first run.
///
/// Never fails: any problem degrades to defaults with the reason kept in
/// `status`. `PYSNIP_LOG` is applied on top of whatever was read.
pub fn load_config() -> LoadedConfig {
    let Some(config_path) = config_file_path() else {
        warn!("Could not determine config directory, using defaults");
        return LoadedConfig {
            config: apply_env_overrides(Config::default()),
            config_path: PathBuf::from("config.toml"),
            status: ConfigLoadStatus::Error("Could not determine config directory".to_string()),
        };
    };

    debug!("Config path: {:?}", config_path);
    let (config, status) = read_or_init(&config_path);

    LoadedConfig {
        config: apply_env_overrides(config),
        config_path,
        status,
    }
}

/// Read and parse the file; a missing file is seeded with defaults.
fn read_or_init(path: &Path) -> (Config, ConfigLoadStatus) {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return write_default(path),
        Err(e) => {
            warn!("Error reading config at {:?}: {}. Using defaults.", path, e);
            return (
                Config::default(),
                ConfigLoadStatus::Error(format!("Read error: {}", e)),
            );
        }
    };

    match toml::from_str::<Config>(&contents) {
        Ok(mut config) => {
            config.normalize();
            info!("Loaded config from {:?}", path);
            (config, ConfigLoadStatus::Loaded)
        }
        Err(e) => {
            warn!("Config file malformed at {:?}: {}. Using defaults.", path, e);
            (
                Config::default(),
                ConfigLoadStatus::Error(format!("Malformed TOML: {}", e)),
            )
        }
    }
}

/// Write the default config for the user to edit later.
///
/// A failure here is not fatal; the session just runs without a file.
fn write_default(path: &Path) -> (Config, ConfigLoadStatus) {
    let config = Config::default();

    let serialized = match toml::to_string_pretty(&config) {
        Ok(s) => s,
        Err(e) => {
            warn!("Could not serialize default config: {}", e);
            return (
                config,
                ConfigLoadStatus::Error(format!("Serialization error: {}", e)),
            );
        }
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!(
            "Could not create config directory {:?}: {}. Continuing without file.",
            parent, e
        );
        return (
            config,
            ConfigLoadStatus::Error(format!("Could not create config directory: {}", e)),
        );
    }

    match fs::write(path, &serialized) {
        Ok(()) => {
            info!("Created default config at {:?}", path);
            (config, ConfigLoadStatus::Created)
        }
        Err(e) => {
            warn!(
                "Could not write default config to {:?}: {}. Continuing without file.",
                path, e
            );
            (config, ConfigLoadStatus::Error(format!("Write error: {}", e)))
        }
    }
}

/// `PYSNIP_LOG` beats the file's `[logging] level`.
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(level) = env::var("PYSNIP_LOG") {
        debug!("Overriding logging.level from PYSNIP_LOG");
        config.logging.level = level;
    }
    config
}
