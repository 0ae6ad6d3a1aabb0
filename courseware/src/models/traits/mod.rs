pub use container::*;
pub use orderable::*;
pub use stored::*;

mod container;
mod orderable;
mod stored;
