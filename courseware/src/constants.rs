use charybdis::types::Int;

pub const BATCH_CHUNK_SIZE: usize = 100;

/// Order given to an item created at an explicit position before it is folded into a reorder.
pub const SENTINEL_ORDER: Int = Int::MAX;

pub const CHAPTER_CACHE_PREFIX: &str = "chapter";
pub const COURSE_CACHE_PREFIX: &str = "course";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF_MS: u64 = 100;
pub const DEFAULT_MAX_COMMIT_TIME_SECS: u64 = 120;

/// How long a committing transaction may hold a container fence while flushing. Readers
/// ignore a fence whose lease ran out.
pub const FENCE_LEASE_SECS: i64 = 30;
