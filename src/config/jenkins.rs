//! Jenkins connection settings.
//!
//! Sources in increasing precedence: `JENKINS_*` environment variables, editor
//! settings files, then explicit [`JenkinsOverrides`].

use std::env;
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use super::{parse_bool, EditorSettingsLoader};
use crate::error::{BridgeError, Result};

// == Limits ==
const TIMEOUT_RANGE: RangeInclusive<u64> = 5..=300;
const CONNECT_TIMEOUT_RANGE: RangeInclusive<u64> = 2..=60;
const READ_TIMEOUT_RANGE: RangeInclusive<u64> = 5..=300;
const MAX_RETRIES_RANGE: RangeInclusive<u32> = 0..=10;
const CONSOLE_MAX_LINES_RANGE: RangeInclusive<usize> = 10..=50_000;

// == Jenkins Config ==
/// Everything needed to reach one Jenkins server.
#[derive(Clone, PartialEq)]
pub struct JenkinsConfig {
    /// Base URL without trailing slash
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// API token, preferred over the password
    pub token: Option<String>,
    /// Overall request timeout in seconds (primary path)
    pub timeout: u64,
    /// Connect timeout in seconds (secondary path)
    pub connect_timeout: u64,
    /// Read timeout in seconds (secondary path)
    pub read_timeout: u64,
    pub max_retries: u32,
    /// Default console line limit
    pub console_max_lines: usize,
    pub verify_ssl: bool,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            token: None,
            timeout: 30,
            connect_timeout: 10,
            read_timeout: 30,
            max_retries: 3,
            console_max_lines: 1000,
            verify_ssl: true,
        }
    }
}

// Secrets stay out of Debug output
impl fmt::Debug for JenkinsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JenkinsConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("auth_method", &self.auth_method())
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("max_retries", &self.max_retries)
            .field("console_max_lines", &self.console_max_lines)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

impl JenkinsConfig {
    /// Merges all sources: environment, then editor settings (when enabled),
    /// then `overrides`.
    pub fn load(load_editor_settings: bool, overrides: JenkinsOverrides) -> Self {
        let mut config = Self::default().with(JenkinsOverrides::from_env());

        if load_editor_settings {
            if let Some(editor) = EditorSettingsLoader::standard().load() {
                config = config.with(editor);
            }
        }

        config.with(overrides)
    }

    /// Applies every field that is set in `overrides`.
    pub fn with(mut self, overrides: JenkinsOverrides) -> Self {
        if let Some(url) = overrides.url {
            self.url = Some(url);
        }
        if overrides.username.is_some() {
            self.username = overrides.username;
        }
        if overrides.password.is_some() {
            self.password = overrides.password;
        }
        if overrides.token.is_some() {
            self.token = overrides.token;
        }
        self.timeout = overrides.timeout.unwrap_or(self.timeout);
        self.connect_timeout = overrides.connect_timeout.unwrap_or(self.connect_timeout);
        self.read_timeout = overrides.read_timeout.unwrap_or(self.read_timeout);
        self.max_retries = overrides.max_retries.unwrap_or(self.max_retries);
        self.console_max_lines = overrides.console_max_lines.unwrap_or(self.console_max_lines);
        self.verify_ssl = overrides.verify_ssl.unwrap_or(self.verify_ssl);

        self.url = self
            .url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        self
    }

    /// Rejects values outside their accepted ranges.
    pub fn validate(&self) -> Result<()> {
        check_range("timeout", self.timeout, TIMEOUT_RANGE)?;
        check_range("connect_timeout", self.connect_timeout, CONNECT_TIMEOUT_RANGE)?;
        check_range("read_timeout", self.read_timeout, READ_TIMEOUT_RANGE)?;
        check_range("max_retries", self.max_retries, MAX_RETRIES_RANGE)?;
        check_range("console_max_lines", self.console_max_lines, CONSOLE_MAX_LINES_RANGE)?;

        if let Some(url) = &self.url {
            url::Url::parse(url).map_err(|e| {
                BridgeError::Configuration(format!("Invalid Jenkins URL '{}': {}", url, e))
            })?;
        }
        Ok(())
    }

    /// URL, username and a token or password are all present.
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
            && self.username.is_some()
            && (self.token.is_some() || self.password.is_some())
    }

    /// `(username, secret)` with the token preferred over the password.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref()?;
        let secret = self.token.as_deref().or(self.password.as_deref())?;
        Some((username, secret))
    }

    pub fn auth_method(&self) -> &'static str {
        if self.token.is_some() {
            "API Token"
        } else if self.password.is_some() {
            "Password"
        } else {
            "None"
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    /// Logs the effective settings without secrets.
    pub fn log_config(&self) {
        info!("Jenkins configuration:");
        info!("  URL: {}", self.url.as_deref().unwrap_or("Not configured"));
        info!(
            "  Username: {}",
            self.username.as_deref().unwrap_or("Not configured")
        );
        info!("  Authentication: {}", self.auth_method());
        info!(
            "  Timeouts: overall={}s connect={}s read={}s",
            self.timeout, self.connect_timeout, self.read_timeout
        );
        info!("  Console max lines: {}", self.console_max_lines);
        info!("  Verify SSL: {}", self.verify_ssl);
    }
}

fn check_range<T>(name: &str, value: T, range: RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + fmt::Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(BridgeError::Configuration(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

// == Overrides ==
/// A partial [`JenkinsConfig`]; unset fields leave the lower source in place.
///
/// Also the shape of the Jenkins block inside editor settings files.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JenkinsOverrides {
    #[serde(alias = "jenkins_url")]
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
    pub read_timeout: Option<u64>,
    pub max_retries: Option<u32>,
    pub console_max_lines: Option<usize>,
    pub verify_ssl: Option<bool>,
}

impl JenkinsOverrides {
    /// Reads the `JENKINS_*` variables. Unparseable numbers are ignored.
    pub fn from_env() -> Self {
        Self {
            url: env_string("JENKINS_URL"),
            username: env_string("JENKINS_USERNAME"),
            password: env_string("JENKINS_PASSWORD"),
            token: env_string("JENKINS_TOKEN"),
            timeout: env_string("JENKINS_TIMEOUT").and_then(|v| v.parse().ok()),
            connect_timeout: env_string("JENKINS_CONNECT_TIMEOUT").and_then(|v| v.parse().ok()),
            read_timeout: env_string("JENKINS_READ_TIMEOUT").and_then(|v| v.parse().ok()),
            max_retries: env_string("JENKINS_MAX_RETRIES").and_then(|v| v.parse().ok()),
            console_max_lines: env_string("JENKINS_CONSOLE_MAX_LINES")
                .and_then(|v| v.parse().ok()),
            verify_ssl: env_string("JENKINS_VERIFY_SSL").and_then(|v| parse_bool(&v)),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
