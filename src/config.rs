use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Working state directory (drafts, logs)
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Idle time after the last edit before a draft is autosaved
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,
    /// How long the "saved" indicator stays visible
    #[serde(default = "default_saved_indicator_ms")]
    pub saved_indicator_ms: u64,
}

fn default_debounce_secs() -> u64 {
    30
}

fn default_saved_indicator_ms() -> u64 {
    2000
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_secs: default_debounce_secs(),
            saved_indicator_ms: default_saved_indicator_ms(),
        }
    }
}

/// Settings for the stand-in submission call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "default_simulated_delay_ms")]
    pub simulated_delay_ms: u64,
}

fn default_simulated_delay_ms() -> u64 {
    1500
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: default_simulated_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Revisions kept for undo
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    50
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

/// Publishing context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishingConfig {
    /// Brand editions offers can be published under. With more than one, every
    /// offer must pick a brand.
    #[serde(default)]
    pub brands: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to `<state>/logs` instead of stderr
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    false
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project config file, relative to the working directory
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".offer-wizard/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Embedded defaults so the wizard works without any config file
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/offer-wizard/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("offer-wizard").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables, e.g. OFFER_WIZARD__AUTOSAVE__DEBOUNCE_SECS=10
        builder = builder.add_source(
            config::Environment::with_prefix("OFFER_WIZARD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("publishing.brands"),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to the project config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::project_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(&config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Directory holding one JSON file per stored draft
    pub fn drafts_path(&self) -> PathBuf {
        self.state_path().join("drafts")
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                state: ".offer-wizard".to_string(), // Relative to cwd
            },
            autosave: AutosaveConfig::default(),
            publish: PublishConfig::default(),
            wizard: WizardConfig::default(),
            publishing: PublishingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
