// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod persona;
pub mod profile;
pub mod prompts;
pub mod scorer;
pub mod scoring;

pub use filters::{build_candidate_query, budget_band, budget_ceiling, filter_price_range, matches_query_constraints, min_beds, CandidateFilter};
pub use matcher::{MatchError, Matcher};
pub use persona::{canned_persona, PersonaGenerator};
pub use profile::build_profile;
pub use scorer::{ScoredCandidate, Scorer};
pub use scoring::{calculate_rule_score, parse_score_response, ScoreOutcome};
