use charybdis::macros::charybdis_model;
use charybdis::operations::Find;
use charybdis::options::Consistency;
use charybdis::types::{BigInt, Timestamp, Uuid};
use scylla::client::caching_session::CachingSession;
use serde::{Deserialize, Serialize};

use crate::errors::CourseError;

/// Write fence of one container.
///
/// A committing transaction moves `version` forward and sets `pending_until` with one
/// lightweight transaction, flushes its writes, then clears `pending_until`. While the lease
/// is live the container's rows may be half written and readers must back off. An expired
/// lease belongs to a writer that died mid-flush and is ignored.
#[charybdis_model(
    table_name = container_versions,
    partition_keys = [container_id],
    clustering_keys = [],
)]
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct ContainerVersion {
    pub container_id: Uuid,
    pub version: BigInt,
    pub pending_until: Option<Timestamp>,
}

impl ContainerVersion {
    pub const INSERT_IF_NOT_EXISTS: &'static str =
        "INSERT INTO container_versions (container_id, version, pending_until) VALUES (?, ?, ?) IF NOT EXISTS";

    pub const UPDATE_IF_VERSION: &'static str =
        "UPDATE container_versions SET version = ?, pending_until = ? WHERE container_id = ? IF version = ?";

    pub const RELEASE_IF_VERSION: &'static str =
        "UPDATE container_versions SET pending_until = null WHERE container_id = ? IF version = ?";

    /// Serial read so the observed row reflects every applied fence.
    pub async fn observe(db_session: &CachingSession, container_id: Uuid) -> Result<Option<Self>, CourseError> {
        let container_version = ContainerVersion::maybe_find_by_primary_key_value((container_id,))
            .consistency(Consistency::Serial)
            .execute(db_session)
            .await?;

        Ok(container_version)
    }

    pub fn is_pending(&self, now: Timestamp) -> bool {
        matches!(self.pending_until, Some(pending_until) if pending_until > now)
    }
}

#[cfg(test)]
mod tests {
    use super::ContainerVersion;
    use charybdis::types::Uuid;
    use chrono::{Duration, Utc};

    #[test]
    fn lease_is_pending_until_it_expires() {
        let now = Utc::now();
        let fence = ContainerVersion {
            container_id: Uuid::new_v4(),
            version: 3,
            pending_until: Some(now + Duration::seconds(30)),
        };

        assert!(fence.is_pending(now));
        assert!(!fence.is_pending(now + Duration::seconds(31)));
    }

    #[test]
    fn released_fence_is_not_pending() {
        let fence = ContainerVersion {
            container_id: Uuid::new_v4(),
            version: 3,
            pending_until: None,
        };

        assert!(!fence.is_pending(Utc::now()));
    }
}
