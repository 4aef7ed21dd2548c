use serde::{Deserialize, Serialize};
use crate::models::domain::{Enrichment, Persona, Property, ScoreResult};

/// Message returned when no listing survives candidate filtering
pub const NO_MATCHES_MESSAGE: &str =
    "No properties found matching your criteria. Try widening your search.";

/// Response for the match endpoint
///
/// The empty shape carries `message` and no `meta`; the ranked shape carries
/// `meta` and no `message`. `persona` is always present, null when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub persona: Option<Persona>,
    pub matches: Vec<MatchEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MatchMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FindMatchesResponse {
    pub fn no_matches() -> Self {
        Self {
            persona: None,
            matches: Vec::new(),
            meta: None,
            message: Some(NO_MATCHES_MESSAGE.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMeta {
    pub candidates: usize,
    pub elapsed_ms: u64,
    pub ai_powered: bool,
}

/// One ranked property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntry {
    pub rank: usize,
    pub property: PropertyView,
    pub enrichment: Option<Enrichment>,
    pub score: u8,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub reasoning: String,
}

impl MatchEntry {
    pub fn new(
        rank: usize,
        property: &Property,
        enrichment: Option<Enrichment>,
        result: ScoreResult,
    ) -> Self {
        Self {
            rank,
            property: PropertyView::from(property),
            enrichment,
            score: result.score,
            highlights: result.highlights,
            concerns: result.concerns,
            reasoning: result.reasoning,
        }
    }
}

/// Client-facing view of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub currency: String,
    pub price_display: String,
    pub beds: i32,
    pub baths: i32,
    pub size_sqm: Option<f64>,
    pub property_type: Option<String>,
    pub style: Option<String>,
    pub condition: Option<String>,
    pub location: LocationView,
    pub epc_rating: Option<String>,
    pub walkability: Option<i32>,
    pub school_quality: Option<String>,
    pub pet_friendly: bool,
    pub parking: Vec<String>,
    pub features: Vec<String>,
    pub vibe_tags: Vec<String>,
    pub commute_minutes: Option<i32>,
    pub agent: Option<AgentView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub address: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub name: Option<String>,
    pub agency: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&Property> for PropertyView {
    fn from(p: &Property) -> Self {
        let agent = if p.agent_name.is_some() || p.agency_name.is_some() {
            Some(AgentView {
                name: p.agent_name.clone(),
                agency: p.agency_name.clone(),
                email: p.agent_email.clone(),
                phone: p.agent_phone.clone(),
            })
        } else {
            None
        };

        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            price: p.price,
            currency: p.currency.clone(),
            price_display: format_price(p.price, &p.currency),
            beds: p.beds,
            baths: p.baths,
            size_sqm: p.size_sqm,
            property_type: p.property_type.clone(),
            style: p.style.clone(),
            condition: p.condition.clone(),
            location: LocationView {
                address: p.address.clone(),
                city: p.city.clone(),
                region: p.region.clone(),
                county: p.county.clone(),
                postcode: p.postcode.clone(),
                country: p.country.clone(),
            },
            epc_rating: p.epc_rating.clone(),
            walkability: p.walkability,
            school_quality: p.school_quality.clone(),
            pet_friendly: p.pet_friendly,
            parking: p.parking.clone(),
            features: p.features.clone(),
            vibe_tags: p.vibe_tags.clone(),
            commute_minutes: p.commute_minutes,
            agent,
        }
    }
}

/// Render a price with its currency symbol and thousands separators
pub fn format_price(price: Option<i64>, currency: &str) -> String {
    let Some(amount) = price else {
        return "Price on application".to_string();
    };

    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };

    match currency.to_uppercase().as_str() {
        "GBP" | "£" => format!("{}£{}", sign, grouped),
        "EUR" | "€" => format!("{}€{}", sign, grouped),
        "USD" | "$" => format!("{}${}", sign, grouped),
        other => format!("{}{} {}", sign, other, grouped),
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub reasoning_enabled: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(450_000), "GBP"), "£450,000");
        assert_eq!(format_price(Some(1_250_000), "EUR"), "€1,250,000");
        assert_eq!(format_price(Some(999), "USD"), "$999");
        assert_eq!(format_price(Some(12_000), "CHF"), "CHF 12,000");
        assert_eq!(format_price(None, "GBP"), "Price on application");
    }

    #[test]
    fn test_no_matches_shape() {
        let json = serde_json::to_value(FindMatchesResponse::no_matches()).unwrap();

        assert!(json["persona"].is_null());
        assert_eq!(json["matches"], serde_json::json!([]));
        assert_eq!(json["message"], NO_MATCHES_MESSAGE);
        assert!(json.get("meta").is_none());
    }
}
