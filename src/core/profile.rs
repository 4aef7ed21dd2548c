use crate::models::{BuyerProfile, RawAnswers};
use serde_json::Value;

const DEFAULT_COUNTRY: &str = "UK";

/// Build a canonical buyer profile from raw quiz answers
///
/// Never fails: missing keys become `None` or empty tag lists, and a bare
/// scalar supplied for a tag field is lifted into a one-element list.
/// Both snake_case and camelCase answer keys are accepted.
pub fn build_profile(raw: &RawAnswers) -> BuyerProfile {
    let country = scalar(raw, &["country"])
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

    BuyerProfile {
        city: scalar(raw, &["city", "location"]),
        country,
        budget: scalar(raw, &["budget"]),
        family_size: scalar(raw, &["family_size", "familySize", "family"]),
        commute: scalar(raw, &["commute", "commute_priority", "commutePriority"]),
        condition: scalar(raw, &["condition", "property_condition", "propertyCondition"]),
        outdoor_space: scalar(raw, &["outdoor_space", "outdoorSpace", "outdoor"]),
        vibe: tags(raw, &["vibe", "vibes"]),
        pets: scalar(raw, &["pets", "pet_situation", "petSituation"]),
        parking: scalar(raw, &["parking"]),
        dealbreakers: tags(raw, &["dealbreakers", "deal_breakers", "dealBreakers"]),
        priorities: tags(raw, &["priorities"]),
        lifestyle: tags(raw, &["lifestyle"]),
        raw: raw.clone(),
    }
}

fn lookup<'a>(raw: &'a RawAnswers, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find(|v| !v.is_null())
}

fn scalar(raw: &RawAnswers, keys: &[&str]) -> Option<String> {
    lookup(raw, keys).and_then(value_to_string)
}

fn tags(raw: &RawAnswers, keys: &[&str]) -> Vec<String> {
    match lookup(raw, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
        Some(other) => value_to_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
