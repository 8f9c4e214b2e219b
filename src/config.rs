use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::lifecycle::LifecycleSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Operator name prefilled on the login screen, empty by default
    #[serde(default)]
    pub username: String,

    /// Seconds every message lives before it self-destructs
    #[serde(default = "default_lifespan_secs")]
    pub lifespan_secs: u32,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Delay between a countdown hitting zero and removal
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,

    #[serde(default = "default_delivered_delay_ms")]
    pub delivered_delay_ms: u64,

    #[serde(default = "default_seen_delay_ms")]
    pub seen_delay_ms: u64,

    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,

    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Countdown value at which messages switch to the alert style
    #[serde(default = "default_glitch_threshold_secs")]
    pub glitch_threshold_secs: u32,

    #[serde(default = "default_auth_delay_ms")]
    pub auth_delay_ms: u64,

    #[serde(default = "default_unlock_delay_ms")]
    pub unlock_delay_ms: u64,

    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,

    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    #[serde(default = "default_peer_reply")]
    pub peer_reply: String,

    /// Where the session flag lives, defaults to next to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_path: Option<PathBuf>,
}

fn default_lifespan_secs() -> u32 {
    10
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_grace_delay_ms() -> u64 {
    500
}

fn default_delivered_delay_ms() -> u64 {
    500
}

fn default_seen_delay_ms() -> u64 {
    1000
}

fn default_typing_delay_ms() -> u64 {
    1500
}

fn default_reply_delay_ms() -> u64 {
    3000
}

fn default_glitch_threshold_secs() -> u32 {
    3
}

fn default_auth_delay_ms() -> u64 {
    1000
}

fn default_unlock_delay_ms() -> u64 {
    800
}

fn default_toast_secs() -> u64 {
    3
}

fn default_welcome_message() -> String {
    "Secure channel established. All messages will self-destruct in {lifespan} seconds."
        .to_string()
}

fn default_peer_reply() -> String {
    "Message received. Proceeding with tactical response.".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            lifespan_secs: default_lifespan_secs(),
            tick_interval_ms: default_tick_interval_ms(),
            grace_delay_ms: default_grace_delay_ms(),
            delivered_delay_ms: default_delivered_delay_ms(),
            seen_delay_ms: default_seen_delay_ms(),
            typing_delay_ms: default_typing_delay_ms(),
            reply_delay_ms: default_reply_delay_ms(),
            glitch_threshold_secs: default_glitch_threshold_secs(),
            auth_delay_ms: default_auth_delay_ms(),
            unlock_delay_ms: default_unlock_delay_ms(),
            toast_secs: default_toast_secs(),
            welcome_message: default_welcome_message(),
            peer_reply: default_peer_reply(),
            session_path: None,
        }
    }
}

impl Config {
    /// Get the default config directory: ~/.config/vanish
    pub fn default_config_dir() -> Result<PathBuf> {
        let home_dir = std::env::home_dir().context("Could not determine home directory")?;

        Ok(home_dir.join(".config").join("vanish"))
    }

    /// Get the default config file path: ~/.config/vanish/config.toml
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::default_config_dir()?.join("config.toml"))
    }

    /// Load config from a file path, creating default config if file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            Ok(config)
        } else {
            let config = Config::default();
            config.save_to_path(path)?;
            Ok(config)
        }
    }

    /// Load config from default location or provided override.
    /// Returns the config together with the path it was read from.
    pub fn load(config_path_override: Option<PathBuf>) -> Result<(Self, PathBuf)> {
        let config_path = match config_path_override {
            Some(path) => path,
            None => Self::default_config_path()
                .unwrap_or_else(|_| PathBuf::from("vanish.toml")),
        };

        let config = Self::load_from_path(&config_path)?;
        Ok((config, config_path))
    }

    /// Save config to a file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Resolve the session flag location relative to the config file
    pub fn session_path(&self, config_path: &Path) -> PathBuf {
        match &self.session_path {
            Some(path) => path.clone(),
            None => config_path
                .parent()
                .map(|dir| dir.join("session.json"))
                .unwrap_or_else(|| PathBuf::from("session.json")),
        }
    }

    pub fn lifecycle_settings(&self) -> LifecycleSettings {
        LifecycleSettings {
            lifespan_secs: self.lifespan(),
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            grace_delay: Duration::from_millis(self.grace_delay_ms),
            delivered_delay: Duration::from_millis(self.delivered_delay_ms),
            seen_delay: Duration::from_millis(self.seen_delay_ms),
            typing_delay: Duration::from_millis(self.typing_delay_ms),
            reply_delay: Duration::from_millis(self.reply_delay_ms),
            peer_reply_text: self.peer_reply.clone(),
        }
    }

    /// Message lifespan, never below one second
    pub fn lifespan(&self) -> u32 {
        self.lifespan_secs.max(1)
    }

    /// Greeting for a new channel with `{lifespan}` filled in
    pub fn welcome_text(&self) -> String {
        self.welcome_message
            .replace("{lifespan}", &self.lifespan().to_string())
    }

    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }

    pub fn unlock_delay(&self) -> Duration {
        Duration::from_millis(self.unlock_delay_ms)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }
}
