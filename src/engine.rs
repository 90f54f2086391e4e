//! The match-selection engine: a scan over the enrolled corpus that reduces
//! delegated pairwise comparisons to at most one best match under the
//! similarity threshold.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::corpus::CorpusSource;
use crate::error::MatchError;
use crate::recognizer::EmbeddingComparator;
use crate::types::{
    CandidateEvaluation, CandidateStatus, Embedding, EnrolledIdentity, MatchOutcome, MatchResult,
};


/// Best-of-N selection over the enrolled corpus.
///
/// The engine owns no state between invocations: each call fetches its own
/// corpus snapshot and keeps its own running best, so repeated calls with an
/// unchanged corpus and a deterministic comparator are idempotent. Both
/// collaborators are injected so the reduction logic can be tested with
/// stubs.
pub struct MatchEngine {
    corpus: Arc<dyn CorpusSource>,
    comparator: Arc<dyn EmbeddingComparator>,
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(
        corpus: Arc<dyn CorpusSource>,
        comparator: Arc<dyn EmbeddingComparator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            corpus,
            comparator,
            config,
        }
    }

    /// Find the single best enrolled identity for `probe`, if any qualifies.
    ///
    /// Candidates are scanned in store order. A candidate with a missing or
    /// dimension-incompatible embedding is skipped, as is one whose
    /// comparison fails; every skip is recorded in the outcome's trace. The
    /// running best is replaced only on strictly greater similarity, so the
    /// earliest candidate wins exact ties.
    ///
    /// Returns an error only when the probe is empty or the corpus cannot be
    /// loaded at all. "Nothing qualified" is a successful `None`.
    pub async fn find_best_match(&self, probe: &Embedding) -> Result<MatchOutcome, MatchError> {
        if probe.is_empty() {
            return Err(MatchError::InvalidProbe);
        }

        let candidates = self.corpus.fetch_all().await?;
        if candidates.is_empty() {
            info!("no enrolled identities; nothing to match against");
            return Ok(MatchOutcome {
                best: None,
                trace: Vec::new(),
            });
        }

        debug!(
            candidates = candidates.len(),
            threshold = self.config.similarity_threshold,
            "scanning corpus"
        );

        let mut best: Option<(f32, MatchResult)> = None;
        let mut trace = Vec::with_capacity(candidates.len());

        for person in &candidates {
            let status = self.evaluate_candidate(probe, person).await;

            if let CandidateStatus::Compared {
                similarity,
                distance,
                qualified: true,
                ..
            } = status
            {
                let improves = best
                    .as_ref()
                    .is_none_or(|(top_similarity, _)| similarity > *top_similarity);
                if improves {
                    best = Some((
                        similarity,
                        MatchResult {
                            person_id: person.id.clone(),
                            name: person.name.clone(),
                            distance,
                            confidence: similarity / 100.0,
                        },
                    ));
                }
            }

            trace.push(CandidateEvaluation {
                person_id: person.id.clone(),
                name: person.name.clone(),
                status,
            });
        }

        match &best {
            Some((similarity, result)) => {
                info!(person = %result.name, similarity, "match found")
            }
            None => info!("no candidate met the similarity threshold"),
        }

        Ok(MatchOutcome {
            best: best.map(|(_, result)| result),
            trace,
        })
    }

    async fn evaluate_candidate(
        &self,
        probe: &Embedding,
        person: &EnrolledIdentity,
    ) -> CandidateStatus {
        let Some(stored) = &person.embedding else {
            debug!(person = %person.name, "skipping: embedding missing or invalid");
            return CandidateStatus::MissingEmbedding;
        };

        if stored.len() != probe.len() {
            debug!(
                person = %person.name,
                stored = stored.len(),
                probe = probe.len(),
                "skipping: embedding dimensions incompatible"
            );
            return CandidateStatus::DimensionMismatch {
                stored: stored.len(),
                probe: probe.len(),
            };
        }

        match self.comparator.compare(probe, stored).await {
            Ok(comparison) => {
                let qualified = comparison.similarity >= self.config.similarity_threshold;
                debug!(
                    person = %person.name,
                    similarity = comparison.similarity,
                    distance = comparison.distance,
                    confidence = %comparison.confidence,
                    is_match = comparison.is_match,
                    qualified,
                    "candidate compared"
                );
                CandidateStatus::Compared {
                    similarity: comparison.similarity,
                    distance: comparison.distance,
                    confidence: comparison.confidence,
                    is_match: comparison.is_match,
                    qualified,
                }
            }
            Err(err) => {
                debug!(person = %person.name, error = %err, "skipping: comparison failed");
                CandidateStatus::ComparatorFailed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
