pub mod model;
pub mod projection;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod writer;

pub use model::{Container, ItemKind, OrderUpdate, OrderableItem, ReorderRequest, ResolvedOrder};
pub use projection::rebuild_projection;
pub use repository::{find_container_items, ContainerRepository, ItemRepository};
pub use resolver::resolve;
pub use service::ContentService;
pub use writer::apply_ordering;
