use std::collections::BTreeMap;

use charybdis::types::{BigInt, Timestamp, Uuid};
use chrono::Duration;
use scylla::client::caching_session::CachingSession;
use scylla::value::{CqlValue, Row};

use crate::constants::FENCE_LEASE_SECS;
use crate::errors::CourseError;
use crate::models::ContainerVersion;

/// Version a transaction reads a container at. A live lease means another transaction is
/// flushing into the container, so its rows can't be read consistently yet.
pub(super) fn observed_version(
    container_id: Uuid,
    fence: Option<&ContainerVersion>,
    now: Timestamp,
) -> Result<Option<BigInt>, CourseError> {
    match fence {
        Some(fence) if fence.is_pending(now) => Err(CourseError::WriteConflict(format!(
            "container {} is being written by a concurrent transaction",
            container_id
        ))),
        Some(fence) => Ok(Some(fence.version)),
        None => Ok(None),
    }
}

/// Takes the fence of every container the transaction read, in id order, moving each to the
/// next version under a lease. Fences already taken are released when a later one is lost.
///
/// Returns the versions held, to be passed to [`release`] once the writes are flushed.
pub(super) async fn acquire(
    db_session: &CachingSession,
    fences: &BTreeMap<Uuid, Option<BigInt>>,
    now: Timestamp,
) -> Result<Vec<(Uuid, BigInt)>, CourseError> {
    let pending_until = now + Duration::seconds(FENCE_LEASE_SECS);
    let mut acquired = Vec::with_capacity(fences.len());

    for (container_id, observed) in fences {
        let result = match observed {
            Some(version) => {
                let values = (version + 1, pending_until, *container_id, *version);

                execute_lwt(db_session, ContainerVersion::UPDATE_IF_VERSION, values).await
            }
            None => {
                let values = (*container_id, 1 as BigInt, pending_until);

                execute_lwt(db_session, ContainerVersion::INSERT_IF_NOT_EXISTS, values).await
            }
        };

        let error = match result {
            Ok(true) => {
                acquired.push((*container_id, observed.unwrap_or_default() + 1));
                continue;
            }
            Ok(false) => {
                log::debug!("[fence::acquire] container {} moved past {:?}", container_id, observed);

                CourseError::WriteConflict(format!(
                    "container {} was committed by a concurrent transaction",
                    container_id
                ))
            }
            Err(e) => e,
        };

        release(db_session, &acquired).await;

        return Err(error);
    }

    Ok(acquired)
}

/// Clears the leases taken by [`acquire`]. A fence taken over after its lease expired is left
/// to its new holder. Failures are only logged, the lease runs out on its own.
pub(super) async fn release(db_session: &CachingSession, acquired: &[(Uuid, BigInt)]) {
    for (container_id, version) in acquired {
        match execute_lwt(db_session, ContainerVersion::RELEASE_IF_VERSION, (*container_id, *version)).await {
            Ok(true) => (),
            Ok(false) => {
                log::warn!(
                    "[fence::release] lease on container {} expired before the flush completed",
                    container_id
                );
            }
            Err(e) => {
                log::error!("[fence::release] failed to release container {}: {}", container_id, e);
            }
        }
    }
}

/// Returns the `[applied]` column of a conditional statement.
async fn execute_lwt(
    db_session: &CachingSession,
    statement: &str,
    values: impl scylla::serialize::row::SerializeRow,
) -> Result<bool, CourseError> {
    let result = db_session
        .execute_unpaged(statement, values)
        .await
        .map_err(|e| CourseError::Database(e.to_string()))?;

    let row = result
        .into_rows_result()
        .map_err(|e| CourseError::Database(e.to_string()))?
        .maybe_first_row::<Row>()
        .map_err(|e| CourseError::Database(e.to_string()))?;

    let applied = row
        .and_then(|row| row.columns.into_iter().next().flatten())
        .map(|applied| matches!(applied, CqlValue::Boolean(true)))
        .unwrap_or(false);

    Ok(applied)
}
