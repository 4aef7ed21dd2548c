use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::core::{
    filters::CandidateFilter,
    persona::PersonaGenerator,
    profile::build_profile,
    scorer::Scorer,
};
use crate::models::{
    FindMatchesResponse, MatchEntry, MatchMeta, MatchingLimits, RawAnswers, ScoringPath, SearchAudit,
};
use crate::services::{EnrichmentCache, ListingStore, ReasoningProvider, StoreError};

/// Errors that abort a match request
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Candidate lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Profile building from raw answers
/// 2. Candidate filtering (short-circuits when nothing matches)
/// 3. Enrichment lookup for all candidates in one call
/// 4. Scoring, run alongside persona generation
/// 5. Ranking and response shaping
#[derive(Clone)]
pub struct Matcher {
    store: Arc<dyn ListingStore>,
    filter: CandidateFilter,
    enrichment: EnrichmentCache,
    scorer: Scorer,
    persona: PersonaGenerator,
}

impl Matcher {
    pub fn new(
        store: Arc<dyn ListingStore>,
        reasoning: ReasoningProvider,
        enrichment: EnrichmentCache,
        limits: MatchingLimits,
    ) -> Self {
        Self {
            filter: CandidateFilter::new(store.clone(), limits),
            scorer: Scorer::new(reasoning.clone(), &limits),
            persona: PersonaGenerator::new(reasoning),
            enrichment,
            store,
        }
    }

    pub fn ai_powered(&self) -> bool {
        self.scorer.scoring_path() == ScoringPath::Reasoning
    }

    /// Match a buyer's raw quiz answers against the listing inventory
    pub async fn find_matches(&self, answers: &RawAnswers) -> Result<FindMatchesResponse, MatchError> {
        let started = Instant::now();
        let profile = build_profile(answers);

        let candidates = self.filter.candidates(&profile).await?;
        let total_candidates = candidates.len();

        if candidates.is_empty() {
            tracing::info!(city = ?profile.city, budget = ?profile.budget, "No candidates matched");
            self.record_search(0, 0, None).await;
            return Ok(FindMatchesResponse::no_matches());
        }

        let ids: Vec<String> = candidates.iter().map(|p| p.id.clone()).collect();
        let mut enrichment = match self.enrichment.fetch(self.store.as_ref(), &ids).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("Enrichment lookup failed, scoring without it: {}", e);
                HashMap::new()
            }
        };

        let pairs: Vec<_> = candidates
            .into_iter()
            .map(|property| {
                let extra = enrichment.remove(&property.id);
                (property, extra)
            })
            .collect();

        let (scored, persona) = tokio::join!(
            self.scorer.score_all(&profile, pairs),
            self.persona.generate(&profile),
        );

        let matches: Vec<MatchEntry> = self
            .scorer
            .rank(scored)
            .into_iter()
            .enumerate()
            .map(|(i, s)| MatchEntry::new(i + 1, &s.property, s.enrichment, s.result))
            .collect();

        let top_score = matches.first().map(|m| m.score as i32);
        self.record_search(total_candidates, matches.len(), top_score).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            "Returning {} matches from {} candidates in {}ms (ai_powered: {})",
            matches.len(),
            total_candidates,
            elapsed_ms,
            self.ai_powered()
        );

        Ok(FindMatchesResponse {
            persona: Some(persona),
            matches,
            meta: Some(MatchMeta {
                candidates: total_candidates,
                elapsed_ms,
                ai_powered: self.ai_powered(),
            }),
            message: None,
        })
    }

    /// Write the search audit record; failures are logged and ignored
    async fn record_search(&self, candidates: usize, results: usize, top_score: Option<i32>) {
        let audit = SearchAudit {
            id: uuid::Uuid::new_v4(),
            candidate_count: candidates as i32,
            result_count: results as i32,
            top_score,
            scoring_path: self.scorer.scoring_path(),
            created_at: chrono::Utc::now(),
        };

        if let Err(e) = self.store.record_search(&audit).await {
            tracing::warn!("Failed to record search audit: {}", e);
        }
    }
}
