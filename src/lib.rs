//! # facegate
//!
//! Face authorization by embedding match. A probe embedding extracted from a
//! camera capture is compared against a corpus of enrolled identities and
//! reduced to at most one best match under a similarity threshold.
//!
//! Detection, embedding extraction, and pairwise similarity belong to an
//! external recognition service; the enrolled corpus lives in an external
//! document store. This crate holds the match-selection engine and the narrow
//! async clients for those collaborators, nothing else. Inbound HTTP routing
//! is a consumer concern.
//!
//! ## Core Types
//!
//! - [`MatchEngine`]: scans the corpus, delegates comparison, reduces to the
//!   best qualifying candidate, and reports a per-candidate trace.
//! - [`RecognizerClient`]: speaks the recognition service's wire contract,
//!   implementing the [`EmbeddingComparator`], [`EmbeddingExtractor`], and
//!   [`ServiceHealth`] capabilities.
//! - [`HttpCorpusSource`]: fetch-all read of the enrolled-person collection.
//! - [`FacegateConfig`]: endpoints, timeouts, and the similarity threshold;
//!   explicit constructor inputs, never ambient globals.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use facegate::{
//!     authorize, FacegateConfig, HttpCorpusSource, MatchEngine, RecognizerClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = FacegateConfig::from_env()?;
//!     let recognizer = Arc::new(RecognizerClient::new(&cfg.recognizer)?);
//!     let corpus = Arc::new(HttpCorpusSource::new(&cfg.corpus)?);
//!     let engine = MatchEngine::new(corpus, recognizer.clone(), cfg.engine.clone());
//!
//!     let image = std::fs::read("capture.jpg")?;
//!     match authorize(&image, recognizer.as_ref(), &engine).await? {
//!         facegate::AuthorizationOutcome::Authorized { matched } => {
//!             println!("welcome back, {}", matched.name)
//!         }
//!         facegate::AuthorizationOutcome::Unrecognized => println!("unknown person"),
//!         facegate::AuthorizationOutcome::NoFaceDetected => println!("no face in capture"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod recognizer;
pub mod types;

pub use crate::config::{
    ConfigError, CorpusConfig, EngineConfig, FacegateConfig, RecognizerConfig,
};
pub use crate::corpus::{CorpusSource, HttpCorpusSource, InMemoryCorpus};
pub use crate::engine::MatchEngine;
pub use crate::error::{AuthorizeError, CorpusError, MatchError, RecognizerError};
pub use crate::recognizer::{
    EmbeddingComparator, EmbeddingExtractor, RecognizerClient, ServiceHealth,
};
pub use crate::types::{
    CandidateEvaluation, CandidateStatus, ComparisonResult, Embedding, EnrolledIdentity,
    MatchOutcome, MatchResult,
};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Decision from a full authorization attempt over a captured image.
///
/// `Unrecognized` and `NoFaceDetected` are successful outcomes; failures of
/// the extraction service or the corpus store surface as [`AuthorizeError`]
/// instead, keeping "nothing matched" and "operation failed" distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AuthorizationOutcome {
    /// A qualifying best match was found.
    Authorized { matched: MatchResult },
    /// Extraction produced a probe but no enrolled identity qualified.
    Unrecognized,
    /// The recognition service found no usable face; matching never ran.
    NoFaceDetected,
}

/// Run the full authorization sequence: extract a probe from the capture,
/// then match it against the enrolled corpus.
pub async fn authorize(
    image: &[u8],
    extractor: &dyn EmbeddingExtractor,
    engine: &MatchEngine,
) -> Result<AuthorizationOutcome, AuthorizeError> {
    let Some(probe) = extractor.extract(image).await? else {
        info!("no face detected in capture; cannot evaluate");
        return Ok(AuthorizationOutcome::NoFaceDetected);
    };

    let outcome = engine.find_best_match(&probe).await?;
    Ok(match outcome.best {
        Some(matched) => AuthorizationOutcome::Authorized { matched },
        None => AuthorizationOutcome::Unrecognized,
    })
}

/// Aggregate system status for upstream reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// `"healthy"` when every component is up, `"degraded"` otherwise.
    pub status: String,
    /// `"healthy"` or `"unavailable"`.
    pub recognizer: String,
}

/// Probe the recognition service and fold the answer into a system-level
/// summary. Reporting only: matching proceeds regardless of this result and
/// lets individual call failures degrade per candidate.
pub async fn system_status(health: &dyn ServiceHealth) -> SystemStatus {
    let recognizer_healthy = health.is_healthy().await;
    SystemStatus {
        status: if recognizer_healthy {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        recognizer: if recognizer_healthy {
            "healthy"
        } else {
            "unavailable"
        }
        .to_string(),
    }
}
