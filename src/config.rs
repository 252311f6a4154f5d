use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_pool_size: u32,
    /// no cache when unset
    pub redis_url: Option<String>,
    pub cache_ttl_secs: usize,
    pub bind_addr: String,
    pub port: u16,
    pub default_batch_size: usize,
    pub max_batch_size: usize,
    pub session_cookie_name: String,
    pub session_age_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "random_food.sqlite3".to_string(),
            database_pool_size: 8,
            redis_url: None,
            cache_ttl_secs: 60,
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            default_batch_size: 10,
            max_batch_size: 50,
            session_cookie_name: "sessionid".to_string(),
            // two weeks
            session_age_secs: 1_209_600,
        }
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_pool_size: parse(&var, "DATABASE_POOL_SIZE", defaults.database_pool_size)?,
            redis_url: var("REDIS_URL"),
            cache_ttl_secs: parse(&var, "CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse(&var, "PORT", defaults.port)?,
            default_batch_size: parse(&var, "DEFAULT_BATCH_SIZE", defaults.default_batch_size)?,
            max_batch_size: parse(&var, "MAX_BATCH_SIZE", defaults.max_batch_size)?,
            session_cookie_name: var("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie_name),
            session_age_secs: parse(&var, "SESSION_AGE_SECS", defaults.session_age_secs)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key, value: &dyn Display, reason: &str| ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if self.database_pool_size == 0 {
            return Err(invalid("DATABASE_POOL_SIZE", &0, "must be at least 1"));
        }
        if self.max_batch_size == 0 {
            return Err(invalid("MAX_BATCH_SIZE", &0, "must be at least 1"));
        }
        if self.default_batch_size == 0 || self.default_batch_size > self.max_batch_size {
            return Err(invalid(
                "DEFAULT_BATCH_SIZE",
                &self.default_batch_size,
                "must be between 1 and MAX_BATCH_SIZE",
            ));
        }
        if self.session_age_secs <= 0 {
            return Err(invalid("SESSION_AGE_SECS", &self.session_age_secs, "must be positive"));
        }
        Ok(())
    }
}

fn parse<T, F>(var: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        },
    }
}
