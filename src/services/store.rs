use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::models::{CandidateQuery, Enrichment, Property, SearchAudit};

/// Errors that can occur when reading or writing the listing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to listings and enrichment, plus the search audit sink
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Active listings matching the coarse candidate predicates, capped at `query.limit`
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<Property>, StoreError>;

    /// Unfiltered scan of active listings, used when the filtered query fails
    async fn scan_active(&self, limit: usize) -> Result<Vec<Property>, StoreError>;

    /// Enrichment rows for the given property ids, keyed by property id
    async fn fetch_enrichment(&self, property_ids: &[String]) -> Result<HashMap<String, Enrichment>, StoreError>;

    async fn record_search(&self, audit: &SearchAudit) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
