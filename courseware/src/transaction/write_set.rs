use std::collections::BTreeMap;

use charybdis::types::Uuid;

use crate::models::traits::Stored;
use crate::models::{Collection, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert,
    Update { order: bool, content: bool },
    Delete,
}

impl Mutation {
    pub const ORDER: Mutation = Mutation::Update {
        order: true,
        content: false,
    };

    pub const CONTENT: Mutation = Mutation::Update {
        order: false,
        content: true,
    };

    /// Folds a later mutation of the same document into this one.
    pub fn merge(self, next: Mutation) -> Mutation {
        match (self, next) {
            (_, Mutation::Delete) => Mutation::Delete,
            (Mutation::Insert, _) => Mutation::Insert,
            (
                Mutation::Update { order, content },
                Mutation::Update {
                    order: next_order,
                    content: next_content,
                },
            ) => Mutation::Update {
                order: order || next_order,
                content: content || next_content,
            },
            (_, next) => next,
        }
    }
}

/// Writes staged by one transaction, at most one per document. The latest staged record
/// wins, mutations are merged.
#[derive(Debug, Default)]
pub struct WriteSet {
    entries: BTreeMap<(Collection, Uuid), (Mutation, Record)>,
}

impl WriteSet {
    pub fn stage(&mut self, mutation: Mutation, record: Record) {
        let key = (record.collection(), record.key());

        let mutation = match self.entries.get(&key) {
            Some((staged, _)) => staged.merge(mutation),
            None => mutation,
        };

        self.entries.insert(key, (mutation, record));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (Mutation, Record)> {
        self.entries.into_values()
    }

    /// Applies staged writes of `T` within `partition_id` to documents read from storage.
    pub fn overlay<T: Stored>(&self, partition_id: Uuid, stored: Vec<T>) -> Vec<T> {
        let mut documents: Vec<T> = stored
            .into_iter()
            .filter(|document| !self.entries.contains_key(&(T::COLLECTION, document.key())))
            .collect();

        let staged = self
            .entries
            .iter()
            .filter(|((collection, _), (mutation, _))| *collection == T::COLLECTION && *mutation != Mutation::Delete)
            .filter_map(|(_, (_, record))| T::from_record(record))
            .filter(|document| document.partition_id() == partition_id)
            .cloned();

        documents.extend(staged);

        documents
    }

    /// Applies a staged write of `T` to a single document read from storage.
    pub fn overlay_one<T: Stored>(&self, id: Uuid, stored: Option<T>) -> Option<T> {
        match self.entries.get(&(T::COLLECTION, id)) {
            Some((Mutation::Delete, _)) => None,
            Some((_, record)) => T::from_record(record).cloned().or(stored),
            None => stored,
        }
    }
}
