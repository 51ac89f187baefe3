pub mod database;
pub mod error;
pub mod ingest;
pub mod utils;

pub use database::repo::{Catalog, CatalogStore};
pub use error::{Result, VaultError};
pub use ingest::engine::{ScanOptions, ScanStats, Scanner};
