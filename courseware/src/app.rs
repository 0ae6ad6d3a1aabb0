use std::path::Path;
use std::sync::Arc;
use std::{env, fs};

use scylla::client::caching_session::CachingSession;
use serde::Deserialize;

use crate::constants::{DEFAULT_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_COMMIT_TIME_SECS};
use crate::errors::CourseError;
use crate::ordering::ContentService;
use crate::resources::cache_invalidator::RedisCacheInvalidator;
use crate::resources::resource::{RedisPool, Resource};
use crate::transaction::executor::RetryPolicy;
use crate::transaction::scylla_store::ScyllaStore;

#[derive(Debug, Clone, Deserialize)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub max_commit_time_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: DEFAULT_BACKOFF_MS,
            max_commit_time_secs: DEFAULT_MAX_COMMIT_TIME_SECS,
        }
    }
}

fn default_cache_size() -> usize {
    1000
}

fn default_pool_size() -> usize {
    16
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scylla: ScyllaConfig,
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub transaction: TransactionConfig,
}

impl Config {
    /// Loads `config.{ENV}.toml`, `.env` is read first when present.
    pub fn load() -> Result<Self, CourseError> {
        dotenv::dotenv().ok();

        let env = env::var("ENV").map_err(|_| CourseError::ConfigError("ENV must be set".to_string()))?;

        Self::from_file(format!("config.{}.toml", env))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CourseError> {
        let contents = fs::read_to_string(path)?;

        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, CourseError> {
        let config = toml::from_str::<Config>(contents)?;

        if config.scylla.hosts.is_empty() {
            return Err(CourseError::ConfigError("Missing scylla hosts".to_string()));
        }

        Ok(config)
    }
}

/// Long-lived clients shared by every request.
#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub db_session: Arc<CachingSession>,
    pub redis_pool: Option<RedisPool>,
}

impl App {
    pub async fn new() -> Result<Self, CourseError> {
        let config = Config::load()?;

        Self::from_config(config).await
    }

    pub async fn from_config(config: Config) -> Result<Self, CourseError> {
        let db_session = CachingSession::init_resource(&config.scylla).await?;

        let redis_pool = match &config.redis {
            Some(redis) => Some(RedisPool::init_resource(redis).await?),
            None => None,
        };

        Ok(Self {
            config,
            db_session: Arc::new(db_session),
            redis_pool,
        })
    }

    pub fn content_service(&self) -> ContentService<ScyllaStore> {
        let store = ScyllaStore::new(self.db_session.clone());
        let service = ContentService::new(store, RetryPolicy::from(&self.config.transaction));

        match &self.redis_pool {
            Some(pool) => service.with_invalidator(Arc::new(RedisCacheInvalidator::new(pool.clone()))),
            None => service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use std::time::Duration;

    use crate::transaction::executor::RetryPolicy;

    #[test]
    fn parses_full_config() {
        let config = Config::parse(
            r#"
            [scylla]
            hosts = ["127.0.0.1:9042"]
            keyspace = "courseware"

            [redis]
            url = "redis://127.0.0.1/"

            [transaction]
            max_attempts = 3
            backoff_ms = 50
            max_commit_time_secs = 10
            "#,
        )
        .unwrap();

        let policy = RetryPolicy::from(&config.transaction);

        assert_eq!(config.scylla.keyspace, "courseware");
        assert_eq!(config.scylla.cache_size, 1000);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(50));
        assert_eq!(policy.max_commit_time, Duration::from_secs(10));
    }

    #[test]
    fn transaction_section_falls_back_to_defaults() {
        let config = Config::parse(
            r#"
            [scylla]
            hosts = ["127.0.0.1:9042"]
            keyspace = "courseware"
            "#,
        )
        .unwrap();

        assert!(config.redis.is_none());
        assert_eq!(RetryPolicy::from(&config.transaction), RetryPolicy::default());
    }

    #[test]
    fn rejects_missing_hosts() {
        let result = Config::parse(
            r#"
            [scylla]
            hosts = []
            keyspace = "courseware"
            "#,
        );

        assert!(result.is_err());
    }
}
