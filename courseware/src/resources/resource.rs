use std::time::Duration;

use deadpool::managed::{Manager, Metrics, Pool, RecycleResult};
use redis::aio::MultiplexedConnection;
use scylla::client::caching_session::CachingSession;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;

use crate::app::{RedisConfig, ScyllaConfig};
use crate::errors::CourseError;

pub type RedisPool = Pool<RedisManager>;

/// Resource's should be alive during application runtime.
/// It's usually related to external services like db clients or redis.
pub trait Resource<'a>: Sized {
    type Cfg;

    #[allow(async_fn_in_trait)]
    async fn init_resource(config: Self::Cfg) -> Result<Self, CourseError>;
}

impl<'a> Resource<'a> for CachingSession {
    type Cfg = &'a ScyllaConfig;

    async fn init_resource(config: Self::Cfg) -> Result<Self, CourseError> {
        let db_session: Session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .connection_timeout(Duration::from_secs(3))
            .use_keyspace(&config.keyspace, false)
            .build()
            .await
            .map_err(|e| {
                CourseError::Connection(format!(
                    "Unable to connect to scylla hosts: {:?}. \nError: {}",
                    config.hosts, e
                ))
            })?;

        Ok(CachingSession::from(db_session, config.cache_size))
    }
}

/// Hands out multiplexed redis connections, recycled with a `PING`.
pub struct RedisManager {
    client: redis::Client,
}

impl RedisManager {
    pub fn new(url: &str) -> Result<Self, CourseError> {
        let client = redis::Client::open(url)?;

        Ok(Self { client })
    }
}

impl Manager for RedisManager {
    type Type = MultiplexedConnection;
    type Error = redis::RedisError;

    async fn create(&self) -> Result<MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn recycle(&self, connection: &mut MultiplexedConnection, _: &Metrics) -> RecycleResult<redis::RedisError> {
        redis::cmd("PING").query_async::<()>(connection).await?;

        Ok(())
    }
}

impl<'a> Resource<'a> for RedisPool {
    type Cfg = &'a RedisConfig;

    async fn init_resource(config: Self::Cfg) -> Result<Self, CourseError> {
        let manager = RedisManager::new(&config.url)?;

        Pool::builder(manager)
            .max_size(config.pool_size)
            .build()
            .map_err(|e| CourseError::ConfigError(format!("Failed to create redis pool: {}", e)))
    }
}
