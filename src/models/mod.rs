// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BuyerProfile, CandidateQuery, Enrichment, MatchingLimits, Persona, Property, RawAnswers,
    ScoreResult, ScoringPath, SearchAudit,
};
pub use requests::FindMatchesRequest;
pub use responses::{
    AgentView, ErrorResponse, FindMatchesResponse, HealthResponse, LocationView, MatchEntry,
    MatchMeta, PropertyView, NO_MATCHES_MESSAGE,
};
