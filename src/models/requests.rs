use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::RawAnswers;

/// Request to match a buyer against the listing inventory
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(max = 64))]
    #[serde(default)]
    pub answers: RawAnswers,
}
