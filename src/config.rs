use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for projects-automation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutomationConfig {
    /// GitHub configuration
    pub github: GitHubConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// GitHub API token (can be set via env var)
    pub token: Option<String>,
    /// The bot's own login; webhooks it triggers are ignored to avoid
    /// feedback loops
    pub bot_login: String,
    /// Name of the project the automation prefers for card placement
    pub automation_project: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig {
                token: None, // Read from env var or config file
                bot_login: "projects-automation[bot]".to_string(),
                automation_project: "Cards Automation".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
            },
        }
    }
}

impl AutomationConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (projects-automation.toml, .projects-automation-rc)
    /// 3. Environment variables (prefixed with PROJECTS_AUTOMATION_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&AutomationConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("projects-automation.toml").exists() {
            builder = builder.add_source(File::with_name("projects-automation"));
        }

        if Path::new(".projects-automation-rc").exists() {
            builder = builder.add_source(File::with_name(".projects-automation-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("PROJECTS_AUTOMATION")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut automation_config: AutomationConfig = config.try_deserialize()?;

        // Token can come from the plain GITHUB_TOKEN as well
        if automation_config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                automation_config.github.token = Some(token);
            } else if let Ok(token) = std::env::var("PROJECTS_AUTOMATION_GITHUB_TOKEN") {
                automation_config.github.token = Some(token);
            }
        }

        Ok(automation_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
