// Criterion benchmarks for HomeMatch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use homematch::core::{build_profile, calculate_rule_score, filters::matches_query_constraints, build_candidate_query, Matcher};
use homematch::models::{MatchingLimits, Property, RawAnswers};
use homematch::services::{EnrichmentCache, InMemoryStore, ReasoningProvider};
use std::sync::Arc;
use std::time::Duration;

fn create_property(id: usize) -> Property {
    serde_json::from_value(serde_json::json!({
        "id": format!("prop-{}", id),
        "title": format!("Home {}", id),
        "status": if id % 7 == 0 { "sold" } else { "active" },
        "price": 150_000 + (id as i64 % 40) * 10_000,
        "currency": "GBP",
        "beds": 1 + (id % 4) as i32,
        "baths": 1,
        "city": if id % 2 == 0 { "Bristol" } else { "Bath" },
        "region": "South West",
        "country": "UK",
        "walkability": (id % 11) as i32,
        "commute_minutes": 5 + (id % 50) as i32,
        "pet_friendly": id % 3 == 0,
        "features": ["garden", "parking"],
        "school_quality": if id % 5 == 0 { "Excellent" } else { "Good" },
    }))
    .unwrap()
}

fn create_answers() -> RawAnswers {
    serde_json::from_value(serde_json::json!({
        "city": "Bristol",
        "budget": "£200K-£400K",
        "family_size": "Small family",
        "pets": "Dog",
        "outdoor_space": "Big garden",
        "vibe": ["Leafy", "Quiet"],
        "priorities": "Schools",
    }))
    .unwrap()
}

fn bench_build_profile(c: &mut Criterion) {
    let answers = create_answers();
    c.bench_function("build_profile", |b| {
        b.iter(|| build_profile(black_box(&answers)));
    });
}

fn bench_rule_score(c: &mut Criterion) {
    let profile = build_profile(&create_answers());
    let property = create_property(3);

    c.bench_function("rule_score", |b| {
        b.iter(|| calculate_rule_score(black_box(&profile), black_box(&property), None));
    });
}

fn bench_candidate_filter(c: &mut Criterion) {
    let profile = build_profile(&create_answers());
    let query = build_candidate_query(&profile, &MatchingLimits::default());
    let properties: Vec<Property> = (0..1000).map(create_property).collect();

    c.bench_function("candidate_filter_1000", |b| {
        b.iter(|| {
            let filtered: Vec<_> = properties
                .iter()
                .filter(|p| matches_query_constraints(p, &query))
                .collect();
            black_box(filtered)
        });
    });
}

fn bench_matching(c: &mut Criterion) {
    let answers = create_answers();
    let mut group = c.benchmark_group("matching");

    for inventory in [10, 50, 100, 500, 1000].iter() {
        let store = Arc::new(InMemoryStore::new((0..*inventory).map(create_property).collect(), vec![]));
        let matcher = Matcher::new(
            store,
            ReasoningProvider::disabled(),
            EnrichmentCache::new(10_000, Duration::from_secs(60)),
            MatchingLimits::default(),
        );

        group.bench_with_input(
            BenchmarkId::new("find_matches", inventory),
            inventory,
            |b, _| {
                b.iter(|| tokio_test::block_on(matcher.find_matches(black_box(&answers))));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build_profile,
    bench_rule_score,
    bench_candidate_filter,
    bench_matching
);

criterion_main!(benches);
