use charybdis::errors::CharybdisError;
use std::error::Error;
use std::fmt;

/// Storage failures whose message carries one of these markers are worth another attempt.
const TRANSIENT_MARKERS: [&str; 7] = [
    "timeout",
    "timed out",
    "connection",
    "broken pipe",
    "unavailable",
    "overloaded",
    "write conflict",
];

#[derive(Debug)]
pub enum RedisError {
    PoolError(deadpool::managed::PoolError<redis::RedisError>),
    RedisError(redis::RedisError),
}

impl fmt::Display for RedisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedisError::PoolError(e) => write!(f, "Pool Error: {}", e),
            RedisError::RedisError(e) => write!(f, "Redis Error: {}", e),
        }
    }
}

impl Error for RedisError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RedisError::PoolError(e) => Some(e),
            RedisError::RedisError(e) => Some(e),
        }
    }
}

#[derive(Debug)]
pub enum CourseError {
    // caller errors
    NotFound(String),
    // transient
    WriteConflict(String),
    TransactionTimeout(String),
    Connection(String),
    // storage
    CharybdisError(CharybdisError),
    Database(String),
    // 500
    SerdeError(serde_json::Error),
    RedisError(RedisError),
    ConfigError(String),
    InternalError(String),
}

impl CourseError {
    /// Retry classification used by the transaction executor. `NotFound` and every
    /// deterministic failure are returned to the caller unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            CourseError::WriteConflict(_) | CourseError::TransactionTimeout(_) | CourseError::Connection(_) => true,
            CourseError::CharybdisError(CharybdisError::NotFoundError(_)) => false,
            CourseError::CharybdisError(e) => has_transient_marker(&e.to_string()),
            CourseError::Database(e) => has_transient_marker(e),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CourseError::NotFound(_) | CourseError::CharybdisError(CharybdisError::NotFoundError(_))
        )
    }
}

fn has_transient_marker(message: &str) -> bool {
    let message = message.to_lowercase();

    TRANSIENT_MARKERS.iter().any(|marker| message.contains(marker))
}

impl fmt::Display for CourseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseError::NotFound(e) => write!(f, "Not Found: {}", e),
            CourseError::WriteConflict(e) => write!(f, "Write Conflict: {}", e),
            CourseError::TransactionTimeout(e) => write!(f, "Transaction Timeout: {}", e),
            CourseError::Connection(e) => write!(f, "Connection Error: {}", e),
            CourseError::CharybdisError(e) => write!(f, "Charybdis Error: \n{}", e),
            CourseError::Database(e) => write!(f, "Database Error: {}", e),
            CourseError::SerdeError(e) => write!(f, "Serde Error: \n{}", e),
            CourseError::RedisError(e) => write!(f, "Redis Error: \n{}", e),
            CourseError::ConfigError(e) => write!(f, "Config Error: {}", e),
            CourseError::InternalError(e) => write!(f, "Internal Error: \n{}", e),
        }
    }
}

impl Error for CourseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CourseError::CharybdisError(e) => Some(e),
            CourseError::SerdeError(e) => Some(e),
            CourseError::RedisError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CharybdisError> for CourseError {
    fn from(e: CharybdisError) -> Self {
        CourseError::CharybdisError(e)
    }
}

impl From<serde_json::Error> for CourseError {
    fn from(e: serde_json::Error) -> Self {
        CourseError::SerdeError(e)
    }
}

impl From<deadpool::managed::PoolError<redis::RedisError>> for CourseError {
    fn from(e: deadpool::managed::PoolError<redis::RedisError>) -> Self {
        CourseError::RedisError(RedisError::PoolError(e))
    }
}

impl From<redis::RedisError> for CourseError {
    fn from(e: redis::RedisError) -> Self {
        CourseError::RedisError(RedisError::RedisError(e))
    }
}

impl From<toml::de::Error> for CourseError {
    fn from(e: toml::de::Error) -> Self {
        CourseError::ConfigError(e.to_string())
    }
}

impl From<std::io::Error> for CourseError {
    fn from(e: std::io::Error) -> Self {
        CourseError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CourseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CourseError::InternalError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::CourseError;

    #[test]
    fn classifies_transient_errors() {
        assert!(CourseError::WriteConflict("chapter".to_string()).is_transient());
        assert!(CourseError::TransactionTimeout("120s".to_string()).is_transient());
        assert!(CourseError::Database("Connection broken".to_string()).is_transient());
        assert!(CourseError::Database("Request timed out".to_string()).is_transient());
    }

    #[test]
    fn classifies_fatal_errors() {
        assert!(!CourseError::NotFound("lecture".to_string()).is_transient());
        assert!(!CourseError::Database("Invalid column name".to_string()).is_transient());
        assert!(!CourseError::InternalError("poisoned".to_string()).is_transient());
    }
}
