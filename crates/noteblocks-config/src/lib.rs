use noteblocks_engine::EditorOptions;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,
    #[serde(default)]
    pub editor: EditorSettings,
}

/// The `[editor]` table. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Typing pauses longer than this start a new undo step.
    pub typing_debounce_ms: u64,
    pub history_limit: usize,
    pub link_search_limit: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let options = EditorOptions::default();
        Self {
            typing_debounce_ms: options.typing_debounce.as_millis() as u64,
            history_limit: options.history_limit,
            link_search_limit: options.link_search_limit,
        }
    }
}

impl EditorSettings {
    /// Engine options, with zero limits raised to one.
    pub fn to_options(&self) -> EditorOptions {
        EditorOptions {
            typing_debounce: Duration::from_millis(self.typing_debounce_ms),
            history_limit: self.history_limit.max(1),
            link_search_limit: self.link_search_limit.max(1),
        }
    }
}

const CONFIG_DIR: &str = "~/.config/noteblocks";
const CONFIG_FILE: &str = "config.toml";

impl Config {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
            editor: EditorSettings::default(),
        }
    }

    pub fn editor_options(&self) -> EditorOptions {
        self.editor.to_options()
    }

    /// Parse config text read from `config_path`, expanding `notes_path`.
    pub fn parse(content: &str, config_path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config =
            toml::from_str(content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.notes_path = expand_path(&config.notes_path);
        Ok(config)
    }

    /// `Ok(None)` when there is no file at `config_path`.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        match fs::read_to_string(config_path) {
            Ok(content) => Self::parse(&content, config_path).map(Some),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    /// Write the config, `[editor]` table included, creating parent folders.
    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let content = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(config_path, content)
            .with_context(|| format!("writing {}", config_path.display()))
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        expand_path(Path::new(CONFIG_DIR)).join(CONFIG_FILE)
    }
}

/// Expand `~` and `$VAR`. A path that cannot be expanded is kept as written.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw).map_or_else(
        |_| path.to_path_buf(),
        |expanded| PathBuf::from(expanded.as_ref()),
    )
}
