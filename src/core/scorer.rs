use futures::future::join_all;

use crate::core::prompts::{score_prompt, SCORE_SYSTEM_PROMPT};
use crate::core::scoring::{calculate_rule_score, parse_score_response, ScoreOutcome};
use crate::models::{BuyerProfile, Enrichment, MatchingLimits, Property, ScoreResult, ScoringPath};
use crate::services::ReasoningProvider;

/// A candidate together with its enrichment and score
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub property: Property,
    pub enrichment: Option<Enrichment>,
    pub result: ScoreResult,
}

/// Scores candidates against a buyer profile
///
/// Uses the reasoning service when one is configured and falls back to the
/// rule engine per property on any service or parse failure.
#[derive(Debug, Clone)]
pub struct Scorer {
    reasoning: ReasoningProvider,
    batch_size: usize,
    top_n: usize,
}

impl Scorer {
    pub fn new(reasoning: ReasoningProvider, limits: &MatchingLimits) -> Self {
        Self {
            reasoning,
            batch_size: limits.batch_size.max(1),
            top_n: limits.top_n,
        }
    }

    /// Scorer that only ever uses the rule engine
    pub fn rule_based(limits: &MatchingLimits) -> Self {
        Self::new(ReasoningProvider::disabled(), limits)
    }

    pub fn scoring_path(&self) -> ScoringPath {
        if self.reasoning.is_enabled() {
            ScoringPath::Reasoning
        } else {
            ScoringPath::RuleBased
        }
    }

    /// Score a single property
    pub async fn score(
        &self,
        profile: &BuyerProfile,
        property: &Property,
        enrichment: Option<&Enrichment>,
    ) -> ScoreResult {
        if !self.reasoning.is_enabled() {
            return calculate_rule_score(profile, property, enrichment);
        }

        let prompt = score_prompt(profile, property, enrichment);
        match self.reasoning.complete(SCORE_SYSTEM_PROMPT, &prompt).await {
            Ok(text) => match parse_score_response(&text) {
                ScoreOutcome::Parsed(result) => result,
                ScoreOutcome::Fallback => {
                    tracing::warn!(property_id = %property.id, "Unparseable reasoning reply, using rule-based score");
                    calculate_rule_score(profile, property, enrichment)
                }
            },
            Err(e) => {
                tracing::warn!(property_id = %property.id, "Reasoning call failed, using rule-based score: {}", e);
                calculate_rule_score(profile, property, enrichment)
            }
        }
    }

    /// Score every candidate in fixed-size batches
    ///
    /// Calls within a batch run concurrently; batches run one after another,
    /// so at most `batch_size` reasoning calls are outstanding. Output order
    /// matches input order.
    pub async fn score_all(
        &self,
        profile: &BuyerProfile,
        candidates: Vec<(Property, Option<Enrichment>)>,
    ) -> Vec<ScoredCandidate> {
        let mut scored = Vec::with_capacity(candidates.len());
        let mut pending = candidates.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<_> = pending.by_ref().take(self.batch_size).collect();

            let results = join_all(
                batch
                    .iter()
                    .map(|(property, enrichment)| self.score(profile, property, enrichment.as_ref())),
            )
            .await;

            scored.extend(batch.into_iter().zip(results).map(|((property, enrichment), result)| {
                ScoredCandidate {
                    property,
                    enrichment,
                    result,
                }
            }));
        }

        scored
    }

    /// Sort by descending score and keep the top N
    ///
    /// The sort is stable, so equal scores keep candidate order.
    pub fn rank(&self, mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        scored.sort_by(|a, b| b.result.score.cmp(&a.result.score));
        scored.truncate(self.top_n);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::profile::build_profile;
    use crate::models::RawAnswers;

    fn create_candidate(id: &str, commute: Option<i32>) -> (Property, Option<Enrichment>) {
        let mut property: Property = serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Home {}", id),
            "status": "active",
            "currency": "GBP",
            "beds": 2,
            "baths": 1,
            "city": "Leeds",
            "country": "UK",
        }))
        .unwrap();
        property.commute_minutes = commute;
        (property, None)
    }

    fn ids(scored: &[ScoredCandidate]) -> Vec<&str> {
        scored.iter().map(|s| s.property.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_rule_based_batches_keep_order() {
        let scorer = Scorer::rule_based(&MatchingLimits::default());
        let profile = build_profile(&RawAnswers::new());
        let candidates: Vec<_> = (0..12).map(|i| create_candidate(&i.to_string(), None)).collect();

        let scored = scorer.score_all(&profile, candidates).await;

        assert_eq!(scored.len(), 12);
        assert_eq!(ids(&scored), (0..12).map(|i| i.to_string()).collect::<Vec<_>>());
        assert_eq!(scorer.scoring_path(), ScoringPath::RuleBased);
    }

    #[tokio::test]
    async fn test_rank_is_stable_and_truncated() {
        let scorer = Scorer::rule_based(&MatchingLimits::default());
        let profile = build_profile(&RawAnswers::new());
        let candidates = vec![
            create_candidate("a", Some(60)),
            create_candidate("b", Some(10)),
            create_candidate("c", Some(60)),
            create_candidate("d", Some(20)),
            create_candidate("e", Some(10)),
            create_candidate("f", Some(60)),
            create_candidate("g", Some(60)),
        ];

        let ranked = scorer.rank(scorer.score_all(&profile, candidates).await);

        assert_eq!(ids(&ranked), vec!["b", "e", "d", "a", "c"]);
        assert!(ranked.windows(2).all(|w| w[0].result.score >= w[1].result.score));
    }

    #[tokio::test]
    async fn test_rank_fewer_than_top_n() {
        let scorer = Scorer::rule_based(&MatchingLimits::default());
        let profile = build_profile(&RawAnswers::new());

        let scored = scorer
            .score_all(&profile, vec![create_candidate("a", None), create_candidate("b", None)])
            .await;

        assert_eq!(scorer.rank(scored).len(), 2);
    }
}
