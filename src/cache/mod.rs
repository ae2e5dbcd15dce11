//! Cache Manager: UPC-keyed persistence of [`EnrichmentRecord`]s.
//!
//! The store contract is narrow (upsert, get, list, clear) so handlers and
//! the enrichment pipeline stay substitutable with [`MemoryStore`] in tests.

mod error;
mod file;
mod memory;
mod types;

#[cfg(test)]
mod tests;

pub use error::CacheError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use types::{CandidateSource, EnrichmentRecord};

use async_trait::async_trait;

/// UPC-keyed record store. At most one record per UPC; upsert replaces
/// wholesale.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts the record, replacing any existing record with the same UPC.
    async fn upsert(&self, record: EnrichmentRecord) -> Result<(), CacheError>;

    /// Returns the record for `upc`, if cached.
    async fn get(&self, upc: &str) -> Result<Option<EnrichmentRecord>, CacheError>;

    /// Returns every cached record, ordered by UPC for stable output.
    async fn get_all(&self) -> Result<Vec<EnrichmentRecord>, CacheError>;

    /// Deletes all records, returning the number removed.
    async fn clear(&self) -> Result<usize, CacheError>;
}
