//! Prompt templates for the reasoning service.

use std::fmt::Write;

use crate::models::{BuyerProfile, Enrichment, Property};

/// Rubric weights, in points out of 100
pub const RUBRIC: &[(&str, u8)] = &[
    ("Location", 20),
    ("Budget", 20),
    ("Commute", 15),
    ("Space & layout", 10),
    ("Condition", 10),
    ("Lifestyle", 8),
    ("Vibe", 7),
    ("Pets", 5),
    ("Parking", 3),
    ("Style", 2),
];

pub const SCORE_SYSTEM_PROMPT: &str = "You are an experienced property matchmaker. \
You score how well a property suits a home buyer. \
Respond with a single JSON object and nothing else.";

pub const PERSONA_SYSTEM_PROMPT: &str = "You write short, warm buyer personas for a property search app. \
Respond with a single JSON object and nothing else.";

fn or_unknown(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("not specified")
}

fn list_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

fn write_profile(out: &mut String, profile: &BuyerProfile) {
    let _ = writeln!(out, "BUYER PROFILE");
    let _ = writeln!(out, "- Location: {}, {}", or_unknown(profile.city.as_deref()), profile.country);
    let _ = writeln!(out, "- Budget: {}", or_unknown(profile.budget.as_deref()));
    let _ = writeln!(out, "- Household: {}", or_unknown(profile.family_size.as_deref()));
    let _ = writeln!(out, "- Commute priority: {}", or_unknown(profile.commute.as_deref()));
    let _ = writeln!(out, "- Desired condition: {}", or_unknown(profile.condition.as_deref()));
    let _ = writeln!(out, "- Outdoor space: {}", or_unknown(profile.outdoor_space.as_deref()));
    let _ = writeln!(out, "- Vibe: {}", list_or_none(&profile.vibe));
    let _ = writeln!(out, "- Pets: {}", or_unknown(profile.pets.as_deref()));
    let _ = writeln!(out, "- Parking: {}", or_unknown(profile.parking.as_deref()));
    let _ = writeln!(out, "- Dealbreakers: {}", list_or_none(&profile.dealbreakers));
    let _ = writeln!(out, "- Priorities: {}", list_or_none(&profile.priorities));
    let _ = writeln!(out, "- Lifestyle: {}", list_or_none(&profile.lifestyle));
}

/// Build the scoring prompt for one (profile, property, enrichment) triple
pub fn score_prompt(profile: &BuyerProfile, property: &Property, enrichment: Option<&Enrichment>) -> String {
    let mut out = String::with_capacity(2048);
    write_profile(&mut out, profile);

    let _ = writeln!(out, "\nPROPERTY");
    let _ = writeln!(out, "- Title: {}", property.title);
    match property.price {
        Some(price) => {
            let _ = writeln!(out, "- Price: {} {}", price, property.currency);
        }
        None => {
            let _ = writeln!(out, "- Price: on application");
        }
    }
    let _ = writeln!(out, "- Beds/Baths: {}/{}", property.beds, property.baths);
    if let Some(size) = property.size_sqm {
        let _ = writeln!(out, "- Size: {:.0} sqm", size);
    }
    let _ = writeln!(
        out,
        "- Type/Style/Condition: {} / {} / {}",
        or_unknown(property.property_type.as_deref()),
        or_unknown(property.style.as_deref()),
        or_unknown(property.condition.as_deref()),
    );
    let _ = writeln!(
        out,
        "- Location: {}, {}, {}, {} {}",
        property.city,
        or_unknown(property.region.as_deref()),
        or_unknown(property.county.as_deref()),
        or_unknown(property.postcode.as_deref()),
        property.country,
    );
    if let Some(walk) = property.walkability {
        let _ = writeln!(out, "- Walkability: {}/10", walk);
    }
    let _ = writeln!(out, "- Schools: {}", or_unknown(property.school_quality.as_deref()));
    let _ = writeln!(out, "- Pet friendly: {}", if property.pet_friendly { "yes" } else { "no" });
    let _ = writeln!(out, "- Parking: {}", list_or_none(&property.parking));
    let _ = writeln!(out, "- Neighbourhood vibe: {}", list_or_none(&property.vibe_tags));
    let _ = writeln!(out, "- Features: {}", list_or_none(&property.features));
    if let Some(minutes) = property.commute_minutes {
        let _ = writeln!(out, "- Commute to city centre: {} min", minutes);
    }
    let _ = writeln!(out, "- EPC rating: {}", or_unknown(property.epc_rating.as_deref()));

    if let Some(e) = enrichment {
        let _ = writeln!(out, "\nAREA DATA");
        let distances = [
            ("Nearest station", e.nearest_station_km),
            ("Nearest school", e.nearest_school_km),
            ("Nearest park", e.nearest_park_km),
            ("Nearest supermarket", e.nearest_supermarket_km),
        ];
        for (label, km) in distances {
            if let Some(km) = km {
                let _ = writeln!(out, "- {}: {:.1} km", label, km);
            }
        }
        if let Some(walk) = e.walk_score {
            let _ = writeln!(out, "- Walk score: {}/100", walk);
        }
        if let Some(avg) = e.area_avg_price {
            let _ = writeln!(out, "- Area average price: {}", avg);
        }
        if let Some(trend) = e.price_trend_1y_pct {
            let _ = writeln!(out, "- 1-year price trend: {:+.1}%", trend);
        }
    }

    let _ = writeln!(out, "\nSCORING RUBRIC (points out of 100)");
    for (criterion, weight) in RUBRIC {
        let _ = writeln!(out, "- {}: {}", criterion, weight);
    }

    let _ = writeln!(
        out,
        "\nReturn JSON exactly in this shape: \
{{\"score\": <integer 0-100>, \"highlights\": [<up to 3 short strings>], \
\"concerns\": [<up to 2 short strings>], \"reasoning\": \"<one or two sentences>\"}}"
    );

    out
}

/// Build the persona prompt for a buyer profile
pub fn persona_prompt(profile: &BuyerProfile) -> String {
    let mut out = String::with_capacity(1024);
    write_profile(&mut out, profile);
    let _ = writeln!(
        out,
        "\nInvent a playful buyer persona for this person. Return JSON exactly in this shape: \
{{\"emoji\": \"<one emoji>\", \"title\": \"<2-4 word title>\", \"description\": \"<one sentence>\"}}"
    );
    out
}
