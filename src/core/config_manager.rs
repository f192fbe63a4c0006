// src/core/config_manager.rs
//! Configuration: `config.yaml` per environment, secrets from the process
//! environment

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub address: String,
    pub port: u16,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/jobchat.db"),
            log_path: None,
            address: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub jsearch_base_url: String,
    pub jsearch_host: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub timeout_seconds: u64,
    pub default_country: String,
    #[serde(skip)]
    pub jsearch_api_key: Option<String>,
    #[serde(skip)]
    pub gemini_api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jsearch_base_url: "https://jsearch.p.rapidapi.com".to_string(),
            jsearch_host: "jsearch.p.rapidapi.com".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model: "gemini-2.5-flash".to_string(),
            timeout_seconds: 60,
            default_country: "us".to_string(),
            jsearch_api_key: None,
            gemini_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EnvironmentSection {
    #[serde(flatten)]
    environment: EnvironmentConfig,
    #[serde(default)]
    service: ServiceConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentSection,
    #[serde(default)]
    production: EnvironmentSection,
}

impl ConfigManager {
    /// Load `config.yaml` from the working directory (defaults when absent)
    /// and overlay environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let section = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::parse_section(&content, &environment)?
        } else {
            info!("{} not found, using default configuration", path.display());
            EnvironmentSection::default()
        };

        let mut config = Self {
            environment: section.environment,
            service: section.service,
        };
        config.apply_env_overrides()?;
        config.environment.database_path = resolve_path(&config.environment.database_path)?;
        if let Some(log_path) = &config.environment.log_path {
            config.environment.log_path = Some(resolve_path(log_path)?);
        }

        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("JOBCHAT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn parse_section(content: &str, environment: &str) -> Result<EnvironmentSection> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.environment.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?;
        }
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.environment.database_path = PathBuf::from(path);
        }

        self.service.jsearch_api_key = non_empty_env("RAPIDAPI_KEY")
            .or_else(|| non_empty_env("JSEARCH_API_KEY"));
        self.service.gemini_api_key = non_empty_env("GEMINI_API_KEY");
        Ok(())
    }

    /// Ensure the database directory (and log directory) exist
    pub async fn ensure_directories(&self) -> Result<()> {
        let mut dirs = Vec::new();
        if let Some(parent) = self.environment.database_path.parent() {
            dirs.push(parent.to_path_buf());
        }
        if let Some(parent) = self.environment.log_path.as_ref().and_then(|p| p.parent()) {
            dirs.push(parent.to_path_buf());
        }

        for dir in dirs.iter().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        info!("All configured directories ensured to exist");
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
local:
  database_path: data/local.db
  port: 8080
  service:
    gemini_model: gemini-test
production:
  database_path: /app/data/jobchat.db
  log_path: /var/log/jobchat.log
"#;

    #[test]
    fn test_parse_local_section() {
        let section = ConfigManager::parse_section(SAMPLE, "local").unwrap();
        assert_eq!(section.environment.port, 8080);
        assert_eq!(section.environment.database_path, PathBuf::from("data/local.db"));
        assert_eq!(section.service.gemini_model, "gemini-test");
        assert_eq!(section.service.jsearch_host, "jsearch.p.rapidapi.com");
    }

    #[test]
    fn test_parse_production_section_uses_defaults() {
        let section = ConfigManager::parse_section(SAMPLE, "production").unwrap();
        assert_eq!(section.environment.port, 8000);
        assert_eq!(
            section.environment.log_path,
            Some(PathBuf::from("/var/log/jobchat.log"))
        );
        assert_eq!(section.service.timeout_seconds, 60);
    }

    #[test]
    fn test_unknown_environment_falls_back_to_local() {
        let section = ConfigManager::parse_section(SAMPLE, "staging").unwrap();
        assert_eq!(section.environment.port, 8080);
    }

    #[test]
    fn test_resolve_relative_path() {
        let resolved = resolve_path(Path::new("data/x.db")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("data/x.db"));
    }
}
