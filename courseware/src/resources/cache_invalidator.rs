use async_trait::async_trait;

use crate::errors::CourseError;
use crate::resources::resource::RedisPool;

/// Drops cached summaries after a committed change. Which keys to drop is decided by the
/// caller, failures are only reported.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, keys: &[String]) -> Result<(), CourseError>;
}

pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn invalidate(&self, _keys: &[String]) -> Result<(), CourseError> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct RedisCacheInvalidator {
    pool: RedisPool,
}

impl RedisCacheInvalidator {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn invalidate(&self, keys: &[String]) -> Result<(), CourseError> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut connection = self.pool.get().await?;

        let mut command = redis::cmd("DEL");
        for key in keys {
            command.arg(key.as_str());
        }

        command.query_async::<()>(&mut *connection).await?;

        Ok(())
    }
}
