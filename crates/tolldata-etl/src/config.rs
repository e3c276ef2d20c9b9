//! Pipeline configuration
//!
//! Values come from the environment (optionally a `.env` file) with the
//! defaults below, and can be overridden by CLI flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tolldata_common::{EtlError, Result};

use crate::dag::RetryPolicy;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default location of the toll data archive.
pub const DEFAULT_SOURCE_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBM-DB0250EN-SkillsNetwork/labs/Final%20Assignment/tolldata.tgz";

/// Default staging directory.
pub const DEFAULT_STAGING_DIR: &str = "/tmp/ETL_toll_data_staging";

/// Default number of retries after a failed task attempt.
pub const DEFAULT_RETRIES: u32 = 1;

/// Default delay between task attempts (5 minutes).
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 300;

/// Default HTTP request timeout for the archive download.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// How the consolidator aligns rows of the three extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// Align by ordinal position, truncating to the shortest extract
    #[default]
    Positional,
    /// Refuse to join extracts with different row counts
    Strict,
}

impl std::str::FromStr for JoinMode {
    type Err = EtlError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positional" => Ok(JoinMode::Positional),
            "strict" => Ok(JoinMode::Strict),
            _ => Err(EtlError::Config(format!("Invalid join mode: {}", s))),
        }
    }
}

impl std::fmt::Display for JoinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinMode::Positional => write!(f, "positional"),
            JoinMode::Strict => write!(f, "strict"),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Where the archive is fetched from
    pub source_url: String,
    /// Root of the run's staging area
    pub staging_dir: PathBuf,
    /// Retries after the first failed attempt of a task
    pub retries: u32,
    pub retry_delay_secs: u64,
    pub http_timeout_secs: u64,
    pub join_mode: JoinMode,
    /// Draw a download progress bar
    pub show_progress: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            retries: DEFAULT_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            join_mode: JoinMode::Positional,
            show_progress: false,
        }
    }
}

impl EtlConfig {
    /// Load configuration from environment variables and `.env`
    ///
    /// - `TOLLDATA_SOURCE_URL`
    /// - `TOLLDATA_STAGING_DIR`
    /// - `TOLLDATA_RETRIES`
    /// - `TOLLDATA_RETRY_DELAY_SECS`
    /// - `TOLLDATA_HTTP_TIMEOUT_SECS`
    /// - `TOLLDATA_JOIN_MODE` (positional, strict)
    /// - `TOLLDATA_SHOW_PROGRESS` (true/false)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let join_mode = match lookup("TOLLDATA_JOIN_MODE") {
            Some(mode) => mode.parse()?,
            None => defaults.join_mode,
        };

        let config = Self {
            source_url: lookup("TOLLDATA_SOURCE_URL").unwrap_or(defaults.source_url),
            staging_dir: lookup("TOLLDATA_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_dir),
            retries: lookup("TOLLDATA_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retries),
            retry_delay_secs: lookup("TOLLDATA_RETRY_DELAY_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retry_delay_secs),
            http_timeout_secs: lookup("TOLLDATA_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
            join_mode,
            show_progress: lookup("TOLLDATA_SHOW_PROGRESS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.show_progress),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.source_url).map_err(|e| {
            EtlError::Config(format!("Invalid source URL '{}': {}", self.source_url, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(EtlError::Config(format!(
                "Source URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.staging_dir.as_os_str().is_empty() {
            return Err(EtlError::Config("Staging directory cannot be empty".to_string()));
        }

        if self.http_timeout_secs == 0 {
            return Err(EtlError::Config(
                "TOLLDATA_HTTP_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = EtlConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
        assert_eq!(config.staging_dir, PathBuf::from(DEFAULT_STAGING_DIR));
        assert_eq!(config.retries, 1);
        assert_eq!(config.retry_policy().delay, Duration::from_secs(300));
        assert_eq!(config.join_mode, JoinMode::Positional);
    }

    #[test]
    fn test_overrides() {
        let config = EtlConfig::from_lookup(lookup_from(&[
            ("TOLLDATA_SOURCE_URL", "http://localhost:9000/tolldata.tgz"),
            ("TOLLDATA_STAGING_DIR", "/srv/staging/run-7"),
            ("TOLLDATA_RETRIES", "3"),
            ("TOLLDATA_RETRY_DELAY_SECS", "0"),
            ("TOLLDATA_JOIN_MODE", "STRICT"),
        ]))
        .unwrap();

        assert_eq!(config.source_url, "http://localhost:9000/tolldata.tgz");
        assert_eq!(config.staging_dir, PathBuf::from("/srv/staging/run-7"));
        assert_eq!(config.retry_policy().max_retries, 3);
        assert_eq!(config.retry_policy().delay, Duration::ZERO);
        assert_eq!(config.join_mode, JoinMode::Strict);
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        let config =
            EtlConfig::from_lookup(lookup_from(&[("TOLLDATA_RETRIES", "lots")])).unwrap();
        assert_eq!(config.retries, DEFAULT_RETRIES);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = EtlConfig::from_lookup(lookup_from(&[("TOLLDATA_JOIN_MODE", "keyed")]))
            .unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));

        let err = EtlConfig::from_lookup(lookup_from(&[(
            "TOLLDATA_SOURCE_URL",
            "ftp://example.com/tolldata.tgz",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("http or https"));

        let err =
            EtlConfig::from_lookup(lookup_from(&[("TOLLDATA_HTTP_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, EtlError::Config(_)));
    }
}
