//! Harness configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables. CLI flags are applied last by the binary.

use crate::error::{HarnessError, HarnessResult};
use engine::{EngineConfig, PollPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "case-e2e.toml";

/// Environment keys recognised by [`HarnessConfig::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    EngineUrl,
    TokenUrl,
    TimeoutSeconds,
    PlatformAdmin,
}

impl HarnessEnv {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EngineUrl => "CASE_E2E_ENGINE_URL",
            Self::TokenUrl => "CASE_E2E_TOKEN_URL",
            Self::TimeoutSeconds => "CASE_E2E_TIMEOUT_SEC",
            Self::PlatformAdmin => "CASE_E2E_PLATFORM_ADMIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub engine: EngineConfig,
    pub poll: PollPolicy,
    /// User allowed to create and remove tenants.
    pub platform_admin: String,
    /// Prefix for the tenants scenarios create.
    pub tenant_prefix: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            poll: PollPolicy::default(),
            platform_admin: "admin".to_string(),
            tenant_prefix: "e2e".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Loads `path` if given, otherwise [`DEFAULT_CONFIG_FILE`] when present,
    /// and applies environment overrides.
    pub fn load(path: Option<&Path>) -> HarnessResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        debug!("Reading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> HarnessResult<Self> {
        toml::from_str(raw).map_err(|e| HarnessError::Config {
            message: e.to_string(),
        })
    }

    pub fn with_env_overrides(mut self) -> HarnessResult<Self> {
        if let Some(url) = read_env_nonempty(HarnessEnv::EngineUrl)? {
            self.engine.base_url = url;
        }
        if let Some(url) = read_env_nonempty(HarnessEnv::TokenUrl)? {
            self.engine.token_url = url;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::TimeoutSeconds)? {
            self.engine.timeout = parse_timeout_seconds(HarnessEnv::TimeoutSeconds, &raw)?;
        }
        if let Some(admin) = read_env_nonempty(HarnessEnv::PlatformAdmin)? {
            self.platform_admin = admin;
        }
        Ok(self)
    }

    pub fn with_engine_url(mut self, url: impl Into<String>) -> Self {
        self.engine.base_url = url.into();
        self
    }

    pub fn validate(&self) -> HarnessResult<()> {
        let invalid = |message: String| HarnessError::Config { message };

        self.engine.validate().map_err(invalid)?;
        self.poll.validate().map_err(invalid)?;

        if self.platform_admin.trim().is_empty() {
            return Err(invalid("Platform admin cannot be empty".to_string()));
        }
        if self.tenant_prefix.trim().is_empty() {
            return Err(invalid("Tenant prefix cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn read_env_nonempty(key: HarnessEnv) -> HarnessResult<Option<String>> {
    let name = key.as_str();
    match std::env::var_os(name) {
        None => Ok(None),
        Some(raw) => {
            let value = raw.into_string().map_err(|_| HarnessError::Config {
                message: format!("{} must be valid UTF-8", name),
            })?;
            let value = value.trim();
            if value.is_empty() {
                return Err(HarnessError::Config {
                    message: format!("{} must not be empty", name),
                });
            }
            Ok(Some(value.to_string()))
        }
    }
}

fn parse_timeout_seconds(key: HarnessEnv, raw: &str) -> HarnessResult<Duration> {
    let secs: u64 = raw.parse().map_err(|_| HarnessError::Config {
        message: format!("{} must be a positive integer number of seconds", key.as_str()),
    })?;
    if secs == 0 {
        return Err(HarnessError::Config {
            message: format!("{} must be greater than zero", key.as_str()),
        });
    }
    Ok(Duration::from_secs(secs))
}
