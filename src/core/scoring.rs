use serde::Deserialize;

use crate::core::filters::budget_ceiling;
use crate::models::{BuyerProfile, Enrichment, Property, ScoreResult};

pub const BASELINE_SCORE: i32 = 50;
pub const MAX_HIGHLIGHTS: usize = 3;
pub const MAX_CONCERNS: usize = 2;

pub const RULE_BASED_REASONING: &str =
    "Scored with the standard matching rules for budget fit, commute time and local amenities.";

/// Deterministic rule-based score for one property
///
/// Starts from a baseline of 50 and applies additive adjustments. Highlights
/// and concerns keep generation order before truncation, which fixes their
/// priority. The enrichment bag is accepted for interface parity with the
/// reasoning path and does not influence the result.
pub fn calculate_rule_score(
    profile: &BuyerProfile,
    property: &Property,
    _enrichment: Option<&Enrichment>,
) -> ScoreResult {
    let mut score = BASELINE_SCORE;
    let mut highlights = Vec::new();
    let mut concerns = Vec::new();

    // Budget fit
    if let Some(price) = property.price {
        let ceiling = budget_ceiling(profile.budget.as_deref()) as f64;
        let price = price as f64;
        if price <= ceiling {
            score += 15;
            if price <= ceiling * 0.85 {
                highlights.push("Well within budget".to_string());
            }
        } else if price <= ceiling * 1.1 {
            score += 5;
            concerns.push("Slightly above budget".to_string());
        } else {
            score -= 10;
            concerns.push("Above budget".to_string());
        }
    }

    // Commute to city centre
    if let Some(minutes) = property.commute_minutes {
        if minutes <= 15 {
            score += 15;
            highlights.push(format!("{} min commute", minutes));
        } else if minutes <= 25 {
            score += 10;
        } else if minutes <= 40 {
            score += 5;
        }
    }

    // Walkability
    if let Some(walk) = property.walkability {
        if walk >= 8 {
            score += 8;
            highlights.push("Very walkable area".to_string());
        } else if walk >= 6 {
            score += 5;
        }
    }

    // Pets
    if profile.has_pets() {
        if property.pet_friendly {
            score += 5;
            highlights.push("Pet-friendly".to_string());
        } else {
            concerns.push("May not be pet-friendly".to_string());
        }
    }

    // Outdoor space
    if profile.wants_big_garden() && property.has_garden() {
        score += 5;
        highlights.push("Has a garden".to_string());
    }

    // Schools
    if property
        .school_quality
        .as_deref()
        .is_some_and(|q| q.eq_ignore_ascii_case("excellent"))
    {
        score += 5;
        highlights.push("Excellent schools nearby".to_string());
    }

    finalize(score as i64, highlights, concerns, RULE_BASED_REASONING.to_string())
}

/// Clamp the score into [0, 100] and cap the highlight and concern lists
pub fn finalize(
    score: i64,
    mut highlights: Vec<String>,
    mut concerns: Vec<String>,
    reasoning: String,
) -> ScoreResult {
    highlights.truncate(MAX_HIGHLIGHTS);
    concerns.truncate(MAX_CONCERNS);

    ScoreResult {
        score: score.clamp(0, 100) as u8,
        highlights,
        concerns,
        reasoning,
    }
}

/// Outcome of parsing a reasoning-service reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Parsed(ScoreResult),
    Fallback,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScore {
    score: i64,
    highlights: Vec<String>,
    concerns: Vec<String>,
    reasoning: String,
}

/// Strip an optional markdown code fence around a JSON payload
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The language tag runs to the end of the fence line, in any case
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        },
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse and validate a reasoning-service score reply
///
/// Any structural mismatch yields `Fallback`. Valid replies are clamped and
/// truncated the same way as rule-based results.
pub fn parse_score_response(text: &str) -> ScoreOutcome {
    match serde_json::from_str::<RawScore>(strip_code_fence(text)) {
        Ok(raw) => ScoreOutcome::Parsed(finalize(raw.score, raw.highlights, raw.concerns, raw.reasoning)),
        Err(e) => {
            tracing::debug!("Rejected reasoning score reply: {}", e);
            ScoreOutcome::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::build_profile;
    use crate::models::RawAnswers;

    fn create_test_property() -> Property {
        serde_json::from_value(serde_json::json!({
            "id": "p1",
            "title": "Test home",
            "status": "active",
            "currency": "GBP",
            "beds": 3,
            "baths": 1,
            "city": "Bath",
            "country": "UK",
        }))
        .unwrap()
    }

    fn create_test_profile(answers: serde_json::Value) -> BuyerProfile {
        let raw: RawAnswers = serde_json::from_value(answers).unwrap();
        build_profile(&raw)
    }

    #[test]
    fn test_baseline_with_nothing_known() {
        let result = calculate_rule_score(&create_test_profile(serde_json::json!({})), &create_test_property(), None);

        assert_eq!(result.score, 50);
        assert!(result.highlights.is_empty());
        assert!(result.concerns.is_empty());
        assert_eq!(result.reasoning, RULE_BASED_REASONING);
    }

    #[test]
    fn test_above_budget() {
        let profile = create_test_profile(serde_json::json!({ "budget": "£200K-£400K" }));
        let mut property = create_test_property();
        property.price = Some(600_000);

        let result = calculate_rule_score(&profile, &property, None);

        assert_eq!(result.score, 40);
        assert_eq!(result.concerns, vec!["Above budget"]);
    }

    #[test]
    fn test_budget_tiers() {
        let profile = create_test_profile(serde_json::json!({ "budget": "£200K-£400K" }));
        let mut property = create_test_property();

        property.price = Some(300_000);
        let well_within = calculate_rule_score(&profile, &property, None);
        assert_eq!(well_within.score, 65);
        assert_eq!(well_within.highlights, vec!["Well within budget"]);

        property.price = Some(390_000);
        let within = calculate_rule_score(&profile, &property, None);
        assert_eq!(within.score, 65);
        assert!(within.highlights.is_empty());

        property.price = Some(430_000);
        let slightly_above = calculate_rule_score(&profile, &property, None);
        assert_eq!(slightly_above.score, 55);
        assert_eq!(slightly_above.concerns, vec!["Slightly above budget"]);
    }

    #[test]
    fn test_unknown_budget_uses_default_ceiling() {
        let profile = create_test_profile(serde_json::json!({ "budget": "lots" }));
        let mut property = create_test_property();
        property.price = Some(520_000);

        let result = calculate_rule_score(&profile, &property, None);
        assert_eq!(result.score, 55);
    }

    #[test]
    fn test_commute_tiers() {
        let profile = create_test_profile(serde_json::json!({}));
        let mut property = create_test_property();

        for (minutes, expected) in [(10, 65), (20, 60), (35, 55), (60, 50)] {
            property.commute_minutes = Some(minutes);
            assert_eq!(calculate_rule_score(&profile, &property, None).score, expected);
        }
    }

    #[test]
    fn test_pets_garden_and_schools() {
        let profile = create_test_profile(serde_json::json!({
            "pets": "Dog",
            "outdoor_space": "Big garden",
        }));
        let mut property = create_test_property();
        property.pet_friendly = true;
        property.features = vec!["Private garden".to_string()];
        property.school_quality = Some("Excellent".to_string());

        let result = calculate_rule_score(&profile, &property, None);

        assert_eq!(result.score, 65);
        assert_eq!(
            result.highlights,
            vec!["Pet-friendly", "Has a garden", "Excellent schools nearby"]
        );
    }

    #[test]
    fn test_pets_not_allowed_is_concern_only() {
        let profile = create_test_profile(serde_json::json!({ "pets": "Two cats" }));
        let result = calculate_rule_score(&profile, &create_test_property(), None);

        assert_eq!(result.score, 50);
        assert_eq!(result.concerns, vec!["May not be pet-friendly"]);
    }

    #[test]
    fn test_finalize_clamps_and_truncates() {
        let many = |n: usize| (0..n).map(|i| i.to_string()).collect::<Vec<_>>();

        let high = finalize(140, many(5), many(4), String::new());
        assert_eq!(high.score, 100);
        assert_eq!(high.highlights.len(), 3);
        assert_eq!(high.concerns.len(), 2);

        assert_eq!(finalize(-20, vec![], vec![], String::new()).score, 0);
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"score\": 82, \"highlights\": [\"Quiet street\"], \"concerns\": [], \"reasoning\": \"Good fit\"}\n```";

        match parse_score_response(reply) {
            ScoreOutcome::Parsed(result) => {
                assert_eq!(result.score, 82);
                assert_eq!(result.highlights, vec!["Quiet street"]);
                assert_eq!(result.reasoning, "Good fit");
            }
            ScoreOutcome::Fallback => panic!("expected parsed reply"),
        }
    }

    #[test]
    fn test_parse_fence_tag_any_case() {
        let body = "{\"score\": 64, \"highlights\": [], \"concerns\": [\"Busy road\"], \"reasoning\": \"Fair\"}";

        for reply in [
            format!("```JSON\n{}\n```", body),
            format!("```Json\n{}\n```", body),
            format!("```\n{}\n```", body),
            format!("```JSON {}```", body),
        ] {
            let ScoreOutcome::Parsed(result) = parse_score_response(&reply) else {
                panic!("expected parsed reply for {:?}", reply);
            };
            assert_eq!(result.score, 64);
            assert_eq!(result.concerns, vec!["Busy road"]);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_reply() {
        assert_eq!(parse_score_response("I think this home is lovely"), ScoreOutcome::Fallback);
        assert_eq!(parse_score_response(r#"{"score": "high"}"#), ScoreOutcome::Fallback);
        assert_eq!(
            parse_score_response(r#"{"score": 70, "highlights": [], "concerns": []}"#),
            ScoreOutcome::Fallback
        );
    }

    #[test]
    fn test_parse_clamps_out_of_range_score() {
        let reply = r#"{"score": 130, "highlights": ["a","b","c","d"], "concerns": ["x","y","z"], "reasoning": "r"}"#;

        let ScoreOutcome::Parsed(result) = parse_score_response(reply) else {
            panic!("expected parsed reply");
        };
        assert_eq!(result.score, 100);
        assert_eq!(result.highlights.len(), 3);
        assert_eq!(result.concerns.len(), 2);
    }
}
