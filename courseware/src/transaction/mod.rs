pub mod executor;
pub mod memory;
pub mod scylla_store;
pub mod store;
pub mod write_set;

pub use executor::{run_in_transaction, RetryPolicy};
pub use memory::{MemoryStats, MemoryStore, MemoryTransaction};
pub use scylla_store::{ScyllaStore, ScyllaTransaction};
pub use store::{Store, Transaction};
pub use write_set::{Mutation, WriteSet};
