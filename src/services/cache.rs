use std::collections::HashMap;
use std::time::Duration;

use crate::models::Enrichment;
use crate::services::store::{ListingStore, StoreError};

/// In-memory cache in front of the enrichment lookup
///
/// Enrichment rows change rarely, so hits are served from memory for the
/// configured TTL. Properties without enrichment are never cached and are
/// re-queried each time.
#[derive(Clone)]
pub struct EnrichmentCache {
    cache: moka::future::Cache<String, Enrichment>,
}

impl EnrichmentCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = moka::future::CacheBuilder::new(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Fetch enrichment for `property_ids`, reading only cache misses from the store
    pub async fn fetch(
        &self,
        store: &dyn ListingStore,
        property_ids: &[String],
    ) -> Result<HashMap<String, Enrichment>, StoreError> {
        let mut found = HashMap::with_capacity(property_ids.len());
        let mut missing = Vec::new();

        for id in property_ids {
            match self.cache.get(id).await {
                Some(hit) => {
                    found.insert(id.clone(), hit);
                }
                None => missing.push(id.clone()),
            }
        }

        tracing::trace!(
            "Enrichment cache: {} hits, {} misses, {} cached",
            found.len(),
            missing.len(),
            self.entry_count()
        );

        if !missing.is_empty() {
            let fetched = store.fetch_enrichment(&missing).await?;
            for (id, row) in fetched {
                self.cache.insert(id.clone(), row.clone()).await;
                found.insert(id, row);
            }
        }

        Ok(found)
    }

    /// Approximate number of cached rows
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::models::{CandidateQuery, Property, SearchAudit};

    #[derive(Default)]
    struct CountingStore {
        lookups: AtomicUsize,
        requested: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ListingStore for CountingStore {
        async fn query_candidates(&self, _q: &CandidateQuery) -> Result<Vec<Property>, StoreError> {
            Ok(vec![])
        }

        async fn scan_active(&self, _limit: usize) -> Result<Vec<Property>, StoreError> {
            Ok(vec![])
        }

        async fn fetch_enrichment(&self, ids: &[String]) -> Result<HashMap<String, Enrichment>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().extend(ids.iter().cloned());
            Ok(ids
                .iter()
                .filter(|id| id.as_str() != "bare")
                .map(|id| {
                    (
                        id.clone(),
                        Enrichment {
                            property_id: id.clone(),
                            nearest_station_km: Some(0.4),
                            nearest_school_km: None,
                            nearest_park_km: None,
                            nearest_supermarket_km: None,
                            walk_score: Some(88),
                            area_avg_price: None,
                            price_trend_1y_pct: Some(2.5),
                        },
                    )
                })
                .collect())
        }

        async fn record_search(&self, _audit: &SearchAudit) -> Result<(), StoreError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, StoreError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_second_fetch_served_from_cache() {
        let store = CountingStore::default();
        let cache = EnrichmentCache::new(100, Duration::from_secs(60));
        let ids = vec!["a".to_string(), "bare".to_string()];

        let first = cache.fetch(&store, &ids).await.unwrap();
        let second = cache.fetch(&store, &ids).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second, first);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 2);
        // Only the property without enrichment is looked up again
        assert_eq!(*store.requested.lock().unwrap(), vec!["a", "bare", "bare"]);

        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);
    }
}
