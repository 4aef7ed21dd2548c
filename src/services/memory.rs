use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::filters::matches_query_constraints;
use crate::models::{CandidateQuery, Enrichment, Property, SearchAudit};
use crate::services::store::{ListingStore, StoreError};

/// Listing store held entirely in memory
///
/// Applies the same predicates as the Postgres store. Used for local runs
/// without a database and as the test double for the pipeline.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    properties: Vec<Property>,
    enrichment: HashMap<String, Enrichment>,
    audits: Mutex<Vec<SearchAudit>>,
}

impl InMemoryStore {
    pub fn new(properties: Vec<Property>, enrichment: Vec<Enrichment>) -> Self {
        Self {
            properties,
            enrichment: enrichment
                .into_iter()
                .map(|e| (e.property_id.clone(), e))
                .collect(),
            audits: Mutex::new(Vec::new()),
        }
    }

    /// Audit records written so far
    pub fn audits(&self) -> Vec<SearchAudit> {
        self.audits.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .properties
            .iter()
            .filter(|p| matches_query_constraints(p, query))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn scan_active(&self, limit: usize) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .properties
            .iter()
            .filter(|p| p.status.eq_ignore_ascii_case("active"))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_enrichment(&self, property_ids: &[String]) -> Result<HashMap<String, Enrichment>, StoreError> {
        Ok(property_ids
            .iter()
            .filter_map(|id| self.enrichment.get(id).map(|e| (id.clone(), e.clone())))
            .collect())
    }

    async fn record_search(&self, audit: &SearchAudit) -> Result<(), StoreError> {
        self.audits
            .lock()
            .map_err(|_| StoreError::Unavailable("audit log poisoned".into()))?
            .push(audit.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
