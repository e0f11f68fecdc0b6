use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SEASON: i32 = 2026;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/f1pronos.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.jolpi.ca/ergast/f1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing environment variable `{var}`")]
    Missing { var: &'static str },

    #[error("invalid value `{value}` for environment variable `{var}`")]
    Invalid { var: &'static str, value: String },
}

/// Runtime configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub auth_secret: String,
    pub owner_id: String,
    pub admin_role_id: Option<String>,
    pub season: i32,
    pub database_url: String,
    pub bind_address: String,
    pub provider_base_url: String,
    pub announce_webhook_urls: Vec<String>,
    pub lock_check_interval: Duration,
    pub results_check_interval: Duration,
    pub reminder_check_interval: Duration,
    pub reminder_lookahead: Duration,
    pub wizard_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        Ok(Self {
            auth_secret: vars.required("AUTH_SECRET")?,
            owner_id: vars.required("OWNER_ID")?,
            admin_role_id: vars.optional("ADMIN_ROLE_ID"),
            season: vars.parsed("F1_SEASON", DEFAULT_SEASON)?,
            database_url: vars
                .optional("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_address: vars
                .optional("BIND_ADDRESS")
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            provider_base_url: vars
                .optional("PROVIDER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string()),
            announce_webhook_urls: vars
                .optional("ANNOUNCE_WEBHOOK_URLS")
                .map(|urls| split_list(&urls))
                .unwrap_or_default(),
            lock_check_interval: Duration::from_secs(
                vars.parsed("LOCK_CHECK_INTERVAL_SECS", 5 * 60)?,
            ),
            results_check_interval: Duration::from_secs(
                vars.parsed("RESULTS_CHECK_INTERVAL_SECS", 30 * 60)?,
            ),
            reminder_check_interval: Duration::from_secs(
                vars.parsed("REMINDER_CHECK_INTERVAL_SECS", 5 * 60)?,
            ),
            reminder_lookahead: Duration::from_secs(
                vars.parsed::<u64>("REMINDER_LOOKAHEAD_MINUTES", 60)? * 60,
            ),
            wizard_timeout: Duration::from_secs(vars.parsed("WIZARD_TIMEOUT_SECS", 5 * 60)?),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, var: &'static str) -> Option<String> {
        (self.lookup)(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing { var })
    }

    fn parsed<T: FromStr>(&self, var: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(var) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { var, value }),
            None => Ok(default),
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
