use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Free-form quiz answers exactly as submitted by the client
pub type RawAnswers = HashMap<String, Value>;

/// Canonical buyer preferences derived from quiz answers
///
/// Built once per match request and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyerProfile {
    pub city: Option<String>,
    pub country: String,
    pub budget: Option<String>,
    pub family_size: Option<String>,
    pub commute: Option<String>,
    pub condition: Option<String>,
    pub outdoor_space: Option<String>,
    #[serde(default)]
    pub vibe: Vec<String>,
    pub pets: Option<String>,
    pub parking: Option<String>,
    #[serde(default)]
    pub dealbreakers: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    #[serde(default)]
    pub raw: RawAnswers,
}

impl BuyerProfile {
    /// True when the buyer reported any pet situation other than "No pets"
    pub fn has_pets(&self) -> bool {
        match self.pets.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => !p.eq_ignore_ascii_case("no pets"),
            _ => false,
        }
    }

    /// True when the buyer asked for a big garden
    pub fn wants_big_garden(&self) -> bool {
        self.outdoor_space
            .as_deref()
            .map(|s| s.to_lowercase().contains("big garden"))
            .unwrap_or(false)
    }
}

/// A listing as stored in the listing store
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    /// None for "price on application" listings
    #[serde(default)]
    pub price: Option<i64>,
    pub currency: String,
    pub beds: i32,
    pub baths: i32,
    #[serde(default)]
    pub size_sqm: Option<f64>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    pub country: String,
    #[serde(default)]
    pub walkability: Option<i32>,
    #[serde(default)]
    pub school_quality: Option<String>,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default)]
    pub parking: Vec<String>,
    #[serde(default)]
    pub vibe_tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub commute_minutes: Option<i32>,
    #[serde(default)]
    pub epc_rating: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub agency_name: Option<String>,
    #[serde(default)]
    pub agent_email: Option<String>,
    #[serde(default)]
    pub agent_phone: Option<String>,
}

impl Property {
    /// True when any feature tag mentions a garden
    pub fn has_garden(&self) -> bool {
        self.features
            .iter()
            .any(|f| f.to_lowercase().contains("garden"))
    }
}

/// Externally computed supplementary attributes for one property
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Enrichment {
    pub property_id: String,
    #[serde(default)]
    pub nearest_station_km: Option<f64>,
    #[serde(default)]
    pub nearest_school_km: Option<f64>,
    #[serde(default)]
    pub nearest_park_km: Option<f64>,
    #[serde(default)]
    pub nearest_supermarket_km: Option<f64>,
    #[serde(default)]
    pub walk_score: Option<i32>,
    #[serde(default)]
    pub area_avg_price: Option<i64>,
    #[serde(default)]
    pub price_trend_1y_pct: Option<f64>,
}

/// Score for one (profile, property) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreResult {
    pub score: u8,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub reasoning: String,
}

/// Which scoring path produced the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scoring_path", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScoringPath {
    Reasoning,
    RuleBased,
}

/// Cosmetic buyer persona shown alongside the matches
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    pub emoji: String,
    pub title: String,
    pub description: String,
}

/// Coarse predicates handed to the listing store
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    /// Substring matched against city, region and county
    pub location: Option<String>,
    pub min_price: i64,
    /// None means no ceiling
    pub max_price: Option<i64>,
    pub min_beds: i32,
    /// Upper-cased country code
    pub country: Option<String>,
    pub limit: usize,
}

/// Lightweight record of a completed search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAudit {
    pub id: uuid::Uuid,
    pub candidate_count: i32,
    pub result_count: i32,
    pub top_score: Option<i32>,
    pub scoring_path: ScoringPath,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Tunable matching constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingLimits {
    pub candidate_limit: usize,
    pub batch_size: usize,
    pub top_n: usize,
    pub budget_buffer: f64,
}

impl Default for MatchingLimits {
    fn default() -> Self {
        Self {
            candidate_limit: 50,
            batch_size: 5,
            top_n: 5,
            budget_buffer: 0.30,
        }
    }
}
