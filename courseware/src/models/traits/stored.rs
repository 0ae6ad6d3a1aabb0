use charybdis::types::Uuid;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Collection, Record};

/// implemented by #[derive(Stored)]
pub trait Stored: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    const COLLECTION: Collection;

    fn key(&self) -> Uuid;

    /// Partition the document is stored under. For items this is their container.
    fn partition_id(&self) -> Uuid;

    fn touch(&mut self);

    fn into_record(self) -> Record;

    fn from_record(record: &Record) -> Option<&Self>;
}
