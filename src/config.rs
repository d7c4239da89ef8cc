// Portal configuration
//
// Layering (later wins):
//   1. built-in defaults
//   2. TOML file: `$PORTAL_CONFIG`, else `portal.toml` in the working directory (optional)
//   3. environment: PORTAL__API__BASE_URL, PORTAL__SESSION__BRAND_ID, ...

use crate::autosave::{AutosaveConfig, DEFAULT_DEBOUNCE_MS, DEFAULT_SAVED_RESET_MS};
use crate::contract::fields::Role;
use crate::models::state::Session;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "PORTAL_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub autosave: AutosaveSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default)]
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutosaveSettings {
    pub debounce_ms: u64,
    pub saved_reset_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub role: String,
    #[serde(default)]
    pub brand_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub folder: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Some(&path), Some("PORTAL"))
    }

    /// `file` is optional on disk; `env_prefix` of `None` skips the environment layer.
    pub fn load_from(file: Option<&str>, env_prefix: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api.base_url", "http://localhost:8080/api/")?
            .set_default("api.timeout_secs", 15)?
            .set_default("autosave.debounce_ms", DEFAULT_DEBOUNCE_MS)?
            .set_default("autosave.saved_reset_ms", DEFAULT_SAVED_RESET_MS)?
            .set_default("session.role", "influencer")?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__"),
            );
        }

        let settings: Settings = builder
            .build()
            .context("Failed to read portal configuration")?
            .try_deserialize()
            .context("Invalid portal configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url is required.");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be a positive number.");
        }
        if self.autosave.debounce_ms == 0 {
            anyhow::bail!("autosave.debounce_ms must be a positive number.");
        }
        self.role()?;
        Ok(())
    }

    pub fn role(&self) -> Result<Role> {
        Role::parse(&self.session.role).ok_or_else(|| {
            anyhow::anyhow!(
                "session.role must be 'influencer' or 'brand' (got '{}')",
                self.session.role
            )
        })
    }

    pub fn session(&self) -> Result<Session> {
        Ok(Session::new(self.role()?, self.session.brand_id.clone()))
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn autosave_config(&self) -> AutosaveConfig {
        AutosaveConfig {
            debounce: Duration::from_millis(self.autosave.debounce_ms),
            saved_reset: Duration::from_millis(self.autosave.saved_reset_ms),
        }
    }

    /// Configured export folder, else the user's download folder, else the working directory.
    pub fn export_folder(&self) -> PathBuf {
        self.export
            .folder
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
