//! HomeMatch - buyer-to-listing matching service
//!
//! This library turns a buyer's quiz answers into a structured profile,
//! narrows the listing inventory to a bounded candidate set, scores each
//! candidate (via a reasoning service or a deterministic rule engine) and
//! returns the top-ranked properties.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_profile, calculate_rule_score, Matcher, Scorer};
pub use models::{BuyerProfile, Property, Enrichment, ScoreResult, FindMatchesRequest, FindMatchesResponse};
