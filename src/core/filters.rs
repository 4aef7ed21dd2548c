use std::sync::Arc;

use crate::models::{BuyerProfile, CandidateQuery, MatchingLimits, Property};
use crate::services::{ListingStore, StoreError};

/// Ceiling used by the rule-based scorer when the budget label is unknown
pub const DEFAULT_BUDGET_CEILING: i64 = 500_000;

/// Nominal price band behind a budget label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetBand {
    pub min: i64,
    /// None for open-ended labels such as "£1M+"
    pub max: Option<i64>,
}

const BUDGET_BANDS: &[(&str, i64, Option<i64>)] = &[
    // Sterling quiz options
    ("Under £200K", 0, Some(200_000)),
    ("£200K-£400K", 200_000, Some(400_000)),
    ("£400K-£600K", 400_000, Some(600_000)),
    ("£600K-£800K", 600_000, Some(800_000)),
    ("£800K-£1M", 800_000, Some(1_000_000)),
    ("£1M+", 1_000_000, None),
    // Euro quiz options
    ("Under €250K", 0, Some(250_000)),
    ("€250K-€500K", 250_000, Some(500_000)),
    ("€500K-€750K", 500_000, Some(750_000)),
    ("€750K-€1M", 750_000, Some(1_000_000)),
    ("€1M+", 1_000_000, None),
];

const FAMILY_MIN_BEDS: &[(&str, i32)] = &[
    ("Just me", 1),
    ("Couple", 1),
    ("Small family", 2),
    ("Growing family", 3),
    ("Large family", 4),
    ("Multi-generational", 5),
];

fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '–' || c == '—' { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Resolve a budget label against the fixed label table
pub fn budget_band(label: Option<&str>) -> Option<BudgetBand> {
    let wanted = normalize_label(label?);
    BUDGET_BANDS
        .iter()
        .find(|(l, _, _)| normalize_label(l) == wanted)
        .map(|&(_, min, max)| BudgetBand { min, max })
}

/// Price range handed to the listing store
///
/// The nominal band is widened by `buffer` on both sides so that the scorer
/// makes the final budget-fit call. Unknown labels give `[0, unbounded)`.
pub fn filter_price_range(label: Option<&str>, buffer: f64) -> (i64, Option<i64>) {
    match budget_band(label) {
        Some(band) => (
            (band.min as f64 * (1.0 - buffer)).round() as i64,
            band.max.map(|max| (max as f64 * (1.0 + buffer)).round() as i64),
        ),
        None => (0, None),
    }
}

/// Budget ceiling used by the rule-based scorer
///
/// Open-ended bands use twice their floor.
pub fn budget_ceiling(label: Option<&str>) -> i64 {
    match budget_band(label) {
        Some(BudgetBand { max: Some(max), .. }) => max,
        Some(BudgetBand { min, max: None }) => min * 2,
        None => DEFAULT_BUDGET_CEILING,
    }
}

/// Minimum bed count for a family-size label, 1 when unrecognized
pub fn min_beds(label: Option<&str>) -> i32 {
    let Some(label) = label else {
        return 1;
    };
    let wanted = normalize_label(label);
    FAMILY_MIN_BEDS
        .iter()
        .find(|(l, _)| normalize_label(l) == wanted)
        .map(|&(_, beds)| beds)
        .unwrap_or(1)
}

/// Translate a buyer profile into coarse store predicates
pub fn build_candidate_query(profile: &BuyerProfile, limits: &MatchingLimits) -> CandidateQuery {
    let (min_price, max_price) = filter_price_range(profile.budget.as_deref(), limits.budget_buffer);

    CandidateQuery {
        location: profile
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        min_price,
        max_price,
        min_beds: min_beds(profile.family_size.as_deref()),
        country: Some(profile.country.trim().to_uppercase()).filter(|c| !c.is_empty()),
        limit: limits.candidate_limit,
    }
}

/// Check whether a property satisfies the candidate query
///
/// Mirrors the SQL predicates used by the Postgres store. Properties with no
/// listed price pass the price predicates.
pub fn matches_query_constraints(property: &Property, query: &CandidateQuery) -> bool {
    if !property.status.eq_ignore_ascii_case("active") {
        return false;
    }

    if let Some(location) = &query.location {
        let needle = location.to_lowercase();
        let hit = |field: Option<&str>| {
            field
                .map(|f| f.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };
        if !hit(Some(&property.city)) && !hit(property.region.as_deref()) && !hit(property.county.as_deref()) {
            return false;
        }
    }

    if let Some(price) = property.price {
        if price < query.min_price {
            return false;
        }
        if query.max_price.is_some_and(|max| price > max) {
            return false;
        }
    }

    if property.beds < query.min_beds {
        return false;
    }

    if let Some(country) = &query.country {
        if !property.country.eq_ignore_ascii_case(country) {
            return false;
        }
    }

    true
}

/// Narrows the listing inventory to a bounded candidate set
#[derive(Clone)]
pub struct CandidateFilter {
    store: Arc<dyn ListingStore>,
    limits: MatchingLimits,
}

impl CandidateFilter {
    pub fn new(store: Arc<dyn ListingStore>, limits: MatchingLimits) -> Self {
        Self { store, limits }
    }

    /// Fetch candidates for a profile
    ///
    /// A failing filtered query degrades to an active-listing scan capped at
    /// the same limit. Only a failure of that scan is returned as an error.
    pub async fn candidates(&self, profile: &BuyerProfile) -> Result<Vec<Property>, StoreError> {
        let query = build_candidate_query(profile, &self.limits);
        tracing::debug!(?query, "Querying candidates");

        let mut candidates = match self.store.query_candidates(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Filtered candidate query failed, falling back to active scan: {}", e);
                self.store.scan_active(self.limits.candidate_limit).await?
            }
        };

        candidates.truncate(self.limits.candidate_limit);
        Ok(candidates)
    }
}
