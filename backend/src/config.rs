use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration, read once at startup. Every value has a default
/// suitable for local development.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// How long an unclaimed job record survives in the cache.
    pub job_ttl: Duration,
    pub job_capacity: u64,
    pub tracking_base_url: String,
    pub storage_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or("PAY_HOST", "127.0.0.1"),
            port: parse_or("PAY_PORT", 8080),
            job_ttl: Duration::from_secs(parse_or("PAY_JOB_TTL_SECONDS", 3600)),
            job_capacity: parse_or("PAY_JOB_CAPACITY", 10_000),
            tracking_base_url: env_or("PAY_TRACKING_URL", "http://127.0.0.1:3001"),
            storage_root: PathBuf::from(env_or("PAY_STORAGE_ROOT", "./storage")),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_fall_back_to_defaults() {
        assert_eq!(env_or("PAY_TEST_UNSET_KEY", "fallback"), "fallback");
        assert_eq!(parse_or("PAY_TEST_UNSET_KEY", 42u16), 42);
    }
}
