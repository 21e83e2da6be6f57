//! ken-analyst configuration management
//! YAML file with environment overrides for secrets

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parser::client::DEFAULT_PARSE_URL;

/// Config file path override
pub const CONFIG_ENV: &str = "KEN_ANALYST_CONFIG";
/// Bearer secret override
pub const API_SECRET_ENV: &str = "API_SECRET";
/// Parser credential override
pub const PARSER_API_KEY_ENV: &str = "PARSER_API_KEY";

/// ken-analyst configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database path
    #[serde(default = "default_db_path")]
    pub database_path: String,

    /// Folder holding one sub-folder per workspace
    #[serde(default = "default_data_root")]
    pub data_root: String,

    /// Listed symbols dataset (`symbol,name,ETF`)
    #[serde(default = "default_listed_path")]
    pub listed_path: String,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Secret whose SHA-256 hex digest is the bearer token
    #[serde(default)]
    pub api_secret: Option<String>,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub edgar: EdgarConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

fn default_db_path() -> String {
    "~/.ken-analyst/ken-analyst.db".to_string()
}

fn default_data_root() -> String {
    "~/.ken-analyst/data".to_string()
}

fn default_listed_path() -> String {
    "~/.ken-analyst/listed.csv".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            data_root: default_data_root(),
            listed_path: default_listed_path(),
            server: ServerConfig::default(),
            api_secret: None,
            parser: ParserConfig::default(),
            edgar: EdgarConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Document parser API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Parsing is skipped when unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_parse_url")]
    pub url: String,
}

fn default_parse_url() -> String {
    DEFAULT_PARSE_URL.to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: default_parse_url(),
        }
    }
}

/// SEC EDGAR access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgarConfig {
    /// SEC requires a descriptive User-Agent with a contact address
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    "ken-analyst admin@example.com".to_string()
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Agent runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Claude Code CLI, resolved on PATH
    #[serde(default = "default_agent_command")]
    pub command: String,
}

fn default_agent_command() -> String {
    "claude".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
        }
    }
}

impl Config {
    /// Load config from the default location or specified path, then apply
    /// environment overrides
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = Self::config_path(path)?;

        let mut config = if config_path.exists() {
            let raw = fs::read_to_string(&config_path).context("Failed to read config file")?;
            let config: Config =
                serde_yaml::from_str(&raw).context("Failed to parse config file")?;
            debug!("Loaded config from {:?}", config_path);
            config
        } else {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Config::default();
            config.save(path)?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self, path: Option<&str>) -> Result<()> {
        let config_path = Self::config_path(path)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(&self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Get the config file path
    fn config_path(path: Option<&str>) -> Result<PathBuf> {
        // Check env override first
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(env_path));
        }

        if let Some(p) = path {
            return Ok(PathBuf::from(p));
        }

        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(home.join(".ken-analyst").join("config.yml"))
    }

    fn apply_env(&mut self) {
        if let Some(secret) = non_empty_env(API_SECRET_ENV) {
            self.api_secret = Some(secret);
        }
        if let Some(key) = non_empty_env(PARSER_API_KEY_ENV) {
            self.parser.api_key = Some(key);
        }
    }

    /// Resolve database path (expand ~)
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        expand_path(&self.database_path)
    }

    pub fn resolve_data_root(&self) -> Result<PathBuf> {
        expand_path(&self.data_root)
    }

    pub fn resolve_listed_path(&self) -> Result<PathBuf> {
        expand_path(&self.listed_path)
    }

    /// Parser credential, ignoring empty strings
    pub fn parser_api_key(&self) -> Option<&str> {
        self.parser.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn api_secret(&self) -> Option<&str> {
        self.api_secret.as_deref().filter(|s| !s.is_empty())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Expand a leading `~` to the home directory
pub fn expand_path(path: &str) -> Result<PathBuf> {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir().context("Cannot find home directory")?;
            Ok(home.join(rest.trim_start_matches('/')))
        }
        None => Ok(PathBuf::from(path)),
    }
}
