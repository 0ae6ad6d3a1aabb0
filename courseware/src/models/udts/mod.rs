pub use content_entry::*;

mod content_entry;
