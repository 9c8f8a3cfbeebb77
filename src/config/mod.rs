use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote media service settings
    pub service: ServiceConfig,

    /// Fixed generation parameters sent with every audio request
    pub generation: GenerationConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base origin every endpoint and returned URL is resolved against
    pub base_url: String,

    /// Per-request timeout in seconds (unbounded if not set)
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Template identifier for generated audio
    pub template: String,

    /// Voice of the first speaker
    pub speaker1_voice: String,

    /// Voice of the second speaker
    pub speaker2_voice: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory artifacts are written to (current directory if not set)
    pub output_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            template: "podcast".to_string(),
            speaker1_voice: "aura-asteria-en".to_string(),
            speaker2_voice: "aura-arcas-en".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config = Self::from_yaml(&content)?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(config_path)
    }

    /// Write a default configuration file without reading the current one.
    ///
    /// An existing file is only replaced when `force` is set.
    pub async fn init(force: bool) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        if config_path.exists() && !force {
            anyhow::bail!(
                "Config file {} already exists; pass --force to overwrite it",
                config_path.display()
            );
        }

        Self::default().save().await
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("mediaflow").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        crate::utils::validate_and_normalize_url(&self.service.base_url)
            .context("Invalid service.base_url")?;

        if self.service.timeout_secs == Some(0) {
            anyhow::bail!("service.timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Parsed base origin
    pub fn base_url(&self) -> crate::Result<Url> {
        Url::parse(&self.service.base_url).map_err(|e| {
            crate::WorkflowError::InvalidUrl(format!("{}: {}", self.service.base_url, e))
        })
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.service.timeout_secs.map(Duration::from_secs)
    }

    /// Directory artifacts are written to
    pub fn output_dir(&self) -> PathBuf {
        self.app
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Service URL: {}", self.service.base_url);
        match self.service.timeout_secs {
            Some(secs) => println!("  Timeout: {}", crate::utils::format_duration(secs as f64)),
            None => println!("  Timeout: none"),
        }
        println!("  Template: {}", self.generation.template);
        println!("  Speaker 1 Voice: {}", self.generation.speaker1_voice);
        println!("  Speaker 2 Voice: {}", self.generation.speaker2_voice);
        println!("  Output Directory: {}", self.output_dir().display());
    }
}
