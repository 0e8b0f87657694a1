use std::env;
use std::time::Duration;

use ontbridge_explorer::{
    DEFAULT_EXPLORER_URL, DEFAULT_NODE_URL, DEFAULT_REQUEST_ATTEMPTS, DEFAULT_TIMEOUT_MS,
    ExplorerClient, ExplorerClientConfig,
};
use thiserror::Error;

use crate::DapiError;
use crate::notify::{NotifyPoller, PollPolicy};
use crate::platform::Platform;
use crate::provider::mobile::{DEFAULT_DAPP_NAME, DappDescriptor};

#[derive(Debug, Clone)]
pub struct DapiConfig {
    pub platform: Platform,
    pub explorer: ExplorerClientConfig,
    pub poll: PollPolicy,
    pub dapp: DappDescriptor,
}

impl Default for DapiConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Desktop,
            explorer: ExplorerClientConfig::default(),
            poll: PollPolicy::default(),
            dapp: DappDescriptor::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid ONTBRIDGE_PLATFORM: {0}")]
    InvalidPlatform(String),
    #[error("invalid ONTBRIDGE_HTTP_TIMEOUT_MS: {0}")]
    InvalidHttpTimeoutMs(String),
    #[error("invalid ONTBRIDGE_HTTP_ATTEMPTS: {0}")]
    InvalidHttpAttempts(String),
    #[error("invalid ONTBRIDGE_POLL_INTERVAL_MS: {0}")]
    InvalidPollIntervalMs(String),
    #[error("invalid ONTBRIDGE_POLL_TIMEOUT_SECS: {0}")]
    InvalidPollTimeoutSecs(String),
    #[error("invalid ONTBRIDGE_POLL_MAX_ATTEMPTS: {0}")]
    InvalidPollMaxAttempts(String),
}

impl DapiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        parse_config_from_env(|key| env::var(key).ok())
    }

    pub fn explorer_client(&self) -> Result<ExplorerClient, DapiError> {
        Ok(ExplorerClient::new(self.explorer.clone())?)
    }

    pub fn notify_poller(&self) -> Result<NotifyPoller, DapiError> {
        Ok(NotifyPoller::new(self.explorer_client()?, self.poll))
    }
}

/// Builds a [`DapiConfig`] from `ONTBRIDGE_*` variables read through `lookup`.
///
/// The platform comes from `ONTBRIDGE_PLATFORM` when set. Otherwise it is
/// detected from `ONTBRIDGE_USER_AGENT`, and defaults to desktop.
pub fn parse_config_from_env<F>(lookup: F) -> Result<DapiConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let platform = match read("ONTBRIDGE_PLATFORM") {
        Some(value) => value
            .parse::<Platform>()
            .map_err(|error| ConfigError::InvalidPlatform(error.to_string()))?,
        None => read("ONTBRIDGE_USER_AGENT")
            .map(|user_agent| Platform::detect(&user_agent))
            .unwrap_or_default(),
    };

    let mut explorer = ExplorerClientConfig::new(
        read("ONTBRIDGE_NODE_URL").unwrap_or_else(|| DEFAULT_NODE_URL.to_string()),
        read("ONTBRIDGE_EXPLORER_URL").unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string()),
    );
    explorer.timeout_ms = read("ONTBRIDGE_HTTP_TIMEOUT_MS")
        .unwrap_or_else(|| DEFAULT_TIMEOUT_MS.to_string())
        .parse::<u64>()
        .map_err(|error| ConfigError::InvalidHttpTimeoutMs(error.to_string()))?;
    explorer.request_attempts = read("ONTBRIDGE_HTTP_ATTEMPTS")
        .unwrap_or_else(|| DEFAULT_REQUEST_ATTEMPTS.to_string())
        .parse::<usize>()
        .map_err(|error| ConfigError::InvalidHttpAttempts(error.to_string()))?;

    let interval_ms = match read("ONTBRIDGE_POLL_INTERVAL_MS") {
        Some(value) => value
            .parse::<u64>()
            .map_err(|error| ConfigError::InvalidPollIntervalMs(error.to_string()))?,
        None => PollPolicy::default().interval.as_millis() as u64,
    };
    if interval_ms == 0 {
        return Err(ConfigError::InvalidPollIntervalMs(
            "must be greater than zero".to_string(),
        ));
    }
    let timeout = read("ONTBRIDGE_POLL_TIMEOUT_SECS")
        .map(|value| value.parse::<u64>())
        .transpose()
        .map_err(|error| ConfigError::InvalidPollTimeoutSecs(error.to_string()))?
        .map(Duration::from_secs);
    let max_attempts = read("ONTBRIDGE_POLL_MAX_ATTEMPTS")
        .map(|value| value.parse::<u32>())
        .transpose()
        .map_err(|error| ConfigError::InvalidPollMaxAttempts(error.to_string()))?;
    if max_attempts == Some(0) {
        return Err(ConfigError::InvalidPollMaxAttempts(
            "must be greater than zero".to_string(),
        ));
    }

    let dapp = DappDescriptor {
        name: read("ONTBRIDGE_DAPP_NAME").unwrap_or_else(|| DEFAULT_DAPP_NAME.to_string()),
        icon: read("ONTBRIDGE_DAPP_ICON").unwrap_or_default(),
    };

    Ok(DapiConfig {
        platform,
        explorer,
        poll: PollPolicy {
            interval: Duration::from_millis(interval_ms),
            timeout,
            max_attempts,
        },
        dapp,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{ConfigError, DapiConfig, parse_config_from_env};
    use crate::platform::Platform;

    fn parse(values: &[(&str, &str)]) -> Result<DapiConfig, ConfigError> {
        let values: HashMap<&str, &str> = values.iter().copied().collect();
        parse_config_from_env(|key| values.get(key).map(ToString::to_string))
    }

    #[test]
    fn defaults_match_the_public_endpoints() -> anyhow::Result<()> {
        let config = parse(&[])?;
        assert_eq!(config.platform, Platform::Desktop);
        assert_eq!(config.explorer.node_url, "https://dappnode1.ont.io:10334");
        assert_eq!(config.explorer.explorer_url, "https://explorer.ont.io");
        assert_eq!(config.poll.interval, Duration::from_secs(3));
        assert_eq!(config.poll.timeout, None);
        assert_eq!(config.poll.max_attempts, None);
        assert_eq!(config.dapp.name, "My dapp");
        assert_eq!(config.dapp.icon, "");
        Ok(())
    }

    #[test]
    fn explicit_platform_wins_over_user_agent() -> anyhow::Result<()> {
        let config = parse(&[
            ("ONTBRIDGE_PLATFORM", "desktop"),
            ("ONTBRIDGE_USER_AGENT", "Mozilla/5.0 (iPhone)"),
        ])?;
        assert_eq!(config.platform, Platform::Desktop);

        let sniffed = parse(&[("ONTBRIDGE_USER_AGENT", "Mozilla/5.0 (iPhone)")])?;
        assert_eq!(sniffed.platform, Platform::Mobile);
        Ok(())
    }

    #[test]
    fn overrides_are_applied() -> anyhow::Result<()> {
        let config = parse(&[
            ("ONTBRIDGE_PLATFORM", "Mobile"),
            ("ONTBRIDGE_NODE_URL", "http://127.0.0.1:20334"),
            ("ONTBRIDGE_EXPLORER_URL", "http://127.0.0.1:8080"),
            ("ONTBRIDGE_HTTP_TIMEOUT_MS", "900"),
            ("ONTBRIDGE_HTTP_ATTEMPTS", "4"),
            ("ONTBRIDGE_POLL_INTERVAL_MS", "250"),
            ("ONTBRIDGE_POLL_TIMEOUT_SECS", "60"),
            ("ONTBRIDGE_POLL_MAX_ATTEMPTS", "12"),
            ("ONTBRIDGE_DAPP_NAME", "Ledger Game"),
            ("ONTBRIDGE_DAPP_ICON", "https://example.com/icon.png"),
        ])?;
        assert_eq!(config.platform, Platform::Mobile);
        assert_eq!(config.explorer.node_url, "http://127.0.0.1:20334");
        assert_eq!(config.explorer.explorer_url, "http://127.0.0.1:8080");
        assert_eq!(config.explorer.timeout_ms, 900);
        assert_eq!(config.explorer.request_attempts, 4);
        assert_eq!(config.poll.interval, Duration::from_millis(250));
        assert_eq!(config.poll.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.poll.max_attempts, Some(12));
        assert_eq!(config.dapp.name, "Ledger Game");
        assert_eq!(config.dapp.icon, "https://example.com/icon.png");
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let error = parse(&[("ONTBRIDGE_PLATFORM", "tablet")]);
        assert!(matches!(error, Err(ConfigError::InvalidPlatform(_))));

        let error = parse(&[("ONTBRIDGE_POLL_INTERVAL_MS", "0")]);
        assert!(matches!(error, Err(ConfigError::InvalidPollIntervalMs(_))));

        let error = parse(&[("ONTBRIDGE_POLL_MAX_ATTEMPTS", "many")]).err();
        assert!(matches!(error, Some(ConfigError::InvalidPollMaxAttempts(_))));
        assert!(error.is_some_and(|error| {
            error
                .to_string()
                .starts_with("invalid ONTBRIDGE_POLL_MAX_ATTEMPTS")
        }));
    }
}
