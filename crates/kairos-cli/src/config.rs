//! Configuration file and environment support

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use kairos_agent::{RunConfig, SessionConfig};
use serde::Deserialize;

const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:2024";
const DEFAULT_ASSISTANT_ID: &str = "agent";
const DEFAULT_ARCADE_BASE_URL: &str = "https://api.arcade.dev";
const DEFAULT_TOOLKIT: &str = "GoogleCalendar";
const DEFAULT_TOOL_LIMIT: u32 = 100;
const DEFAULT_MAX_RESUMES: usize = 32;

/// Configuration for kairos, as read from the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity the agent acts on behalf of
    pub user_id: Option<String>,
    /// Model the agent server should use
    pub model: Option<String>,
    /// Base URL of the agent server
    pub agent_url: Option<String>,
    /// Graph to run on the agent server
    pub assistant_id: Option<String>,
    /// API key for the agent server
    pub agent_api_key: Option<String>,
    /// API key for the authorization service
    pub arcade_api_key: Option<String>,
    /// Base URL of the authorization service
    pub arcade_base_url: Option<String>,
    /// Fixed session id (a fresh one is generated otherwise)
    pub session_id: Option<String>,
    /// Custom system prompt file path
    pub system_prompt_file: Option<String>,
    /// Toolkits the agent may use
    pub toolkits: Option<Vec<String>>,
    /// Individual tools the agent may use
    pub tools: Option<Vec<String>>,
    /// Upper bound on the number of tools offered to the model
    pub tool_limit: Option<u32>,
    /// Give up waiting for an authorization after this many seconds
    pub auth_timeout_secs: Option<u64>,
    /// Resume rounds allowed for one line
    pub max_resumes: Option<usize>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kairos")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("KAIROS_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. A missing or unreadable file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }
}

/// Setup errors that stop kairos before the session starts
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} is not set. Export {env} or set `{field}` in {path}")]
    Missing {
        field: &'static str,
        env: &'static str,
        path: String,
    },

    #[error("Failed to read system prompt file {path}: {source}")]
    SystemPrompt {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fully resolved settings: config file values overridden by the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub user_id: String,
    pub model: String,
    pub agent_url: String,
    pub assistant_id: String,
    pub agent_api_key: Option<String>,
    pub arcade_api_key: Option<String>,
    pub arcade_base_url: String,
    pub session_id: Option<String>,
    pub system_prompt_file: Option<String>,
    pub toolkits: Vec<String>,
    pub tools: Vec<String>,
    pub tool_limit: u32,
    pub auth_timeout: Option<Duration>,
    pub max_resumes: usize,
}

impl Settings {
    /// Merge `config` with environment lookups from `env`.
    ///
    /// Environment values win over the file. Empty values count as unset.
    pub fn resolve<F>(config: Config, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str, fallback: Option<String>| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .or(fallback.filter(|v| !v.trim().is_empty()))
        };
        let required = |field: &'static str, key: &'static str, fallback: Option<String>| {
            lookup(key, fallback).ok_or_else(|| ConfigError::Missing {
                field,
                env: key,
                path: Config::config_path().display().to_string(),
            })
        };

        Ok(Self {
            user_id: required("user_id", "ARCADE_USER_ID", config.user_id)?,
            model: required("model", "OPENAI_MODEL", config.model)?,
            agent_url: lookup("KAIROS_AGENT_URL", config.agent_url)
                .unwrap_or_else(|| DEFAULT_AGENT_URL.to_string()),
            assistant_id: lookup("KAIROS_ASSISTANT_ID", config.assistant_id)
                .unwrap_or_else(|| DEFAULT_ASSISTANT_ID.to_string()),
            agent_api_key: lookup("LANGSMITH_API_KEY", config.agent_api_key),
            arcade_api_key: lookup("ARCADE_API_KEY", config.arcade_api_key),
            arcade_base_url: lookup("ARCADE_BASE_URL", config.arcade_base_url)
                .unwrap_or_else(|| DEFAULT_ARCADE_BASE_URL.to_string()),
            session_id: lookup("KAIROS_SESSION_ID", config.session_id),
            system_prompt_file: config.system_prompt_file,
            toolkits: config
                .toolkits
                .unwrap_or_else(|| vec![DEFAULT_TOOLKIT.to_string()]),
            tools: config.tools.unwrap_or_default(),
            tool_limit: config.tool_limit.unwrap_or(DEFAULT_TOOL_LIMIT),
            auth_timeout: config.auth_timeout_secs.map(Duration::from_secs),
            max_resumes: config.max_resumes.unwrap_or(DEFAULT_MAX_RESUMES),
        })
    }

    /// Build the session config the loop runs with
    pub fn session_config(&self, system_prompt: String) -> SessionConfig {
        let mut run = RunConfig::new(&self.user_id, &self.model)
            .with_system_prompt(system_prompt)
            .with_toolkits(self.toolkits.clone())
            .with_tools(self.tools.clone(), self.tool_limit);
        if let Some(ref id) = self.session_id {
            run = run.with_thread_id(id);
        }
        SessionConfig::new(run).with_max_resumes(self.max_resumes)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# kairos configuration file
# Place at ~/.config/kairos/config.toml (Linux/Mac) or %APPDATA%\kairos\config.toml (Windows)
# Every value can also come from the environment variable noted beside it.

# Identity the agent acts for (ARCADE_USER_ID)
user_id = "me@example.com"

# Model used by the agent server (OPENAI_MODEL)
model = "gpt-4o-mini"

# Agent server (KAIROS_AGENT_URL, KAIROS_ASSISTANT_ID, LANGSMITH_API_KEY)
# agent_url = "http://127.0.0.1:2024"
# assistant_id = "agent"
# agent_api_key = "..."

# Authorization service (ARCADE_API_KEY, ARCADE_BASE_URL)
# arcade_api_key = "arc_..."
# arcade_base_url = "https://api.arcade.dev"

# toolkits = ["GoogleCalendar"]
# tools = []
# tool_limit = 100
# auth_timeout_secs = 300
# max_resumes = 32
# system_prompt_file = "~/.config/kairos/system_prompt.md"
"#
}
