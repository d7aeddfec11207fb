use crate::error::{Result, ShellError};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Filesystem locations used by the assistant, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub config_file: PathBuf,
    /// Holds the single pending command for the shell keybinding.
    pub buffer_file: PathBuf,
    /// Directory of saved interactive sessions.
    pub history_dir: PathBuf,
    /// Line history of the interactive prompt.
    pub command_history_file: PathBuf,
    /// Shell startup file the integration snippet is appended to.
    pub shell_rc: PathBuf,
}

impl Paths {
    pub fn under_home(home: &Path) -> Self {
        Self {
            config_file: home.join(".ai_shell").join("config.toml"),
            buffer_file: home.join(".ai_shell_buffer"),
            history_dir: home.join(".ai_shell_history"),
            command_history_file: home.join(".ai_shell_command_history"),
            shell_rc: home.join(".zshrc"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub use_mock: bool,
    pub shell_rc: Option<PathBuf>,
    #[serde(skip)]
    pub paths: Option<Paths>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            use_mock: false,
            shell_rc: None,
            paths: None,
        }
    }
}

impl Config {
    /// Load configuration for the current user: config file first, then
    /// environment variables on top.
    pub fn load() -> Result<Self> {
        let home = home_dir()
            .ok_or_else(|| ShellError::Configuration("Could not find home directory".to_string()))?;
        let mut config = Self::load_from_home(&home);
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load the config file under `home` without consulting the environment.
    pub fn load_from_home(home: &Path) -> Self {
        let mut paths = Paths::under_home(home);
        let mut config = Self::load_from_file(&paths.config_file).unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        if let Some(shell_rc) = &config.shell_rc {
            paths.shell_rc = shell_rc.clone();
        }
        config.paths = Some(paths);
        config
    }

    fn load_from_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str::<Config>(&content) {
            Ok(config) => {
                info!("Loaded config from: {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring malformed config file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Environment variables override values from the config file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.anthropic_api_key = Some(api_key);
        }
        if let Some(model) = lookup("AI_SHELL_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        if lookup("AI_SHELL_USE_MOCK").is_some() {
            self.use_mock = true;
        }
    }

    pub fn paths(&self) -> Result<&Paths> {
        self.paths
            .as_ref()
            .ok_or_else(|| ShellError::Configuration("Paths have not been resolved".to_string()))
    }

    pub fn get_api_key(&self) -> Option<&String> {
        self.anthropic_api_key.as_ref()
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }
}
