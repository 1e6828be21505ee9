use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub base_url: String,
    pub token_url: String,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2027".to_string(),
            token_url: "http://localhost:2377".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_url("Base URL", &self.base_url)?;
        validate_url("Token URL", &self.token_url)?;

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

fn validate_url(label: &str, url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err(format!("{} cannot be empty", label));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("{} must start with http:// or https://", label));
    }

    Ok(())
}

/// Retry settings for operations that wait on the engine's eventually
/// consistent query side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    pub attempts: u32,
    #[serde(with = "duration_millis")]
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 20,
            interval: Duration::from_millis(500),
        }
    }
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.attempts == 0 {
            return Err("Poll attempts must be greater than 0".to_string());
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.base_url, "http://localhost:2027");
        assert_eq!(config.token_url, "http://localhost:2377");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::new()
            .with_base_url("https://engine.example.com")
            .with_token_url("https://idp.example.com")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.base_url, "https://engine.example.com");
        assert_eq!(config.token_url, "https://idp.example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();

        config.base_url = "".to_string();
        assert!(config.validate().is_err());

        config.base_url = "localhost:2027".to_string();
        assert!(config.validate().is_err());

        config.base_url = "http://localhost:2027".to_string();
        config.token_url = "ftp://idp".to_string();
        assert!(config.validate().is_err());

        config.token_url = "http://localhost:2377".to_string();
        config.timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig::default().with_timeout(Duration::from_secs(12));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"timeout\":12"));
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_poll_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.attempts, 20);
        assert!(policy.validate().is_ok());

        let policy = policy.with_attempts(0);
        assert!(policy.validate().is_err());

        let policy = PollPolicy::new(3, Duration::from_millis(5));
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"attempts":3,"interval":5}"#);
    }
}
