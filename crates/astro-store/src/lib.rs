//! I/O around astro-core: catalog loading, atomic selection files, and a
//! SQLite record of every selection run.

pub mod error;
pub mod files;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use files::{read_catalog_file, read_selection_file, write_selection_file};
pub use store::{RunRecord, StoredObject, Store};
