pub mod cache_invalidator;
pub mod resource;
