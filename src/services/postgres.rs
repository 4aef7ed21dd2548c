use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;

use crate::models::{CandidateQuery, Enrichment, Property, SearchAudit};
use crate::services::store::{ListingStore, StoreError};

const PROPERTY_COLUMNS: &str = r#"
    p.id, p.title, p.description, p.status, p.price, p.currency, p.beds, p.baths,
    p.size_sqm, p.property_type, p.style, p.condition, p.address, p.city, p.region,
    p.county, p.postcode, p.country, p.walkability, p.school_quality, p.pet_friendly,
    p.parking, p.vibe_tags, p.features, p.commute_minutes, p.epc_rating,
    a.name AS agent_name, a.agency AS agency_name, a.email AS agent_email, a.phone AS agent_phone
"#;

/// PostgreSQL-backed listing store
///
/// Listings, agents and enrichment rows are owned by other services; this
/// client only reads them. The one write is the search audit record.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &crate::config::DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        let store = Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await?;

        if settings.run_migrations {
            sqlx::migrate!("./migrations").run(&store.pool).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(store)
    }
}

/// Escape LIKE wildcards so user input only matches literally
fn like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ListingStore for PostgresStore {
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<Property>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties p
            LEFT JOIN agents a ON a.id = p.agent_id
            WHERE p.status = 'active'
              AND ($1::text IS NULL OR p.city ILIKE $1 OR p.region ILIKE $1 OR p.county ILIKE $1)
              AND (p.price IS NULL OR (p.price >= $2 AND ($3::bigint IS NULL OR p.price <= $3)))
              AND p.beds >= $4
              AND ($5::text IS NULL OR UPPER(p.country) = $5)
            ORDER BY p.created_at DESC
            LIMIT $6
            "#
        );

        let rows = sqlx::query_as::<_, Property>(&sql)
            .bind(query.location.as_deref().map(like_pattern))
            .bind(query.min_price)
            .bind(query.max_price)
            .bind(query.min_beds)
            .bind(query.country.as_deref())
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Candidate query returned {} rows", rows.len());
        Ok(rows)
    }

    async fn scan_active(&self, limit: usize) -> Result<Vec<Property>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PROPERTY_COLUMNS}
            FROM properties p
            LEFT JOIN agents a ON a.id = p.agent_id
            WHERE p.status = 'active'
            ORDER BY p.created_at DESC
            LIMIT $1
            "#
        );

        let rows = sqlx::query_as::<_, Property>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn fetch_enrichment(&self, property_ids: &[String]) -> Result<HashMap<String, Enrichment>, StoreError> {
        if property_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT property_id, nearest_station_km, nearest_school_km, nearest_park_km,
                   nearest_supermarket_km, walk_score, area_avg_price, price_trend_1y_pct
            FROM property_enrichment
            WHERE property_id = ANY($1)
        "#;

        let rows = sqlx::query_as::<_, Enrichment>(query)
            .bind(property_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.property_id.clone(), row))
            .collect())
    }

    async fn record_search(&self, audit: &SearchAudit) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO search_audit (id, candidate_count, result_count, top_score, scoring_path, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(query)
            .bind(audit.id)
            .bind(audit.candidate_count)
            .bind(audit.result_count)
            .bind(audit.top_score)
            .bind(audit.scoring_path)
            .bind(audit.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
