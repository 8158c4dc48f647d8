//! Persistence layer: schema ownership, per-entity writes and point reads.

pub mod credentials;
pub mod handlers;
pub mod records;
pub mod schema;
pub mod tables;

pub use records::RecordStore;
pub use schema::{BootstrapAdmin, SchemaManager};
pub use tables::Table;
