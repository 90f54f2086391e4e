//! HTTP client for the external face recognition service.
//!
//! The service owns detection, embedding extraction, and pairwise similarity;
//! this module only speaks its wire contract. The three capabilities the rest
//! of the crate consumes are expressed as traits so the match engine can be
//! exercised against deterministic stubs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RecognizerConfig;
use crate::error::RecognizerError;
use crate::types::{ComparisonResult, Embedding};

/// Pairwise embedding comparison capability.
///
/// Implementations must report similarity on the 0–100 scale shared with the
/// engine threshold and be deterministic for identical inputs within a
/// session. The engine always calls probe-first, candidate-second and does
/// not rely on symmetry.
#[async_trait]
pub trait EmbeddingComparator: Send + Sync {
    async fn compare(
        &self,
        probe: &Embedding,
        candidate: &Embedding,
    ) -> Result<ComparisonResult, RecognizerError>;
}

/// Probe production capability.
///
/// `Ok(None)` means the service answered but found no usable face; `Err`
/// means the service could not be asked at all. Both leave the caller unable
/// to attempt a match, but they stay distinguishable.
#[async_trait]
pub trait EmbeddingExtractor: Send + Sync {
    async fn extract(&self, image: &[u8]) -> Result<Option<Embedding>, RecognizerError>;
}

/// Liveness probe for the recognition service. Reporting only; the engine
/// never consults this before scanning.
#[async_trait]
pub trait ServiceHealth: Send + Sync {
    async fn is_healthy(&self) -> bool;
}

/// Production client for all three capabilities.
pub struct RecognizerClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecognizerClient {
    pub fn new(cfg: &RecognizerConfig) -> Result<Self, RecognizerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .build()
            .map_err(|err| {
                RecognizerError::Transport(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Serialize)]
struct CompareRequest<'a> {
    embedding1: &'a [f32],
    embedding2: &'a [f32],
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    success: bool,
    #[serde(default)]
    distance: Option<f32>,
    #[serde(default)]
    similarity: Option<f32>,
    #[serde(default)]
    is_match: Option<bool>,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn comparison_from_response(response: CompareResponse) -> Result<ComparisonResult, RecognizerError> {
    if !response.success {
        return Err(RecognizerError::Unsuccessful(
            response
                .error
                .unwrap_or_else(|| "comparison rejected without detail".into()),
        ));
    }
    let similarity = response.similarity.ok_or_else(|| {
        RecognizerError::MalformedResponse("missing `similarity` in comparison response".into())
    })?;
    let distance = response.distance.ok_or_else(|| {
        RecognizerError::MalformedResponse("missing `distance` in comparison response".into())
    })?;
    Ok(ComparisonResult {
        distance,
        similarity,
        is_match: response.is_match.unwrap_or(false),
        confidence: response.confidence.unwrap_or_else(|| "unknown".into()),
    })
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    success: bool,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    embedding_size: Option<usize>,
    #[serde(default)]
    num_faces_detected: Option<u32>,
    #[serde(default)]
    face: Option<FaceAttributes>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Optional per-face metadata some service versions attach to extractions.
#[derive(Debug, Clone, Deserialize)]
struct FaceAttributes {
    #[serde(default)]
    quality_score: Option<f32>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    age: Option<u32>,
}

fn embedding_from_extraction(
    response: ExtractResponse,
) -> Result<Option<Embedding>, RecognizerError> {
    if !response.success {
        let detail = response
            .message
            .or(response.error)
            .unwrap_or_else(|| "no face detected".into());
        debug!(detail = %detail, "extraction reported no usable face");
        return Ok(None);
    }

    let values = response.embedding.ok_or_else(|| {
        RecognizerError::MalformedResponse(
            "successful extraction response carried no `embedding`".into(),
        )
    })?;

    debug!(
        embedding_size = response.embedding_size.unwrap_or(values.len()),
        num_faces = response.num_faces_detected.unwrap_or(1),
        "face extracted"
    );
    if let Some(face) = &response.face {
        debug!(
            quality = face.quality_score,
            gender = face.gender.as_deref(),
            age = face.age,
            "face attributes"
        );
    }

    Ok(Some(Embedding::new(values)))
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    ready: bool,
}

fn service_is_ready(health: &HealthResponse) -> bool {
    health.status == "healthy" && health.ready
}

#[async_trait]
impl EmbeddingComparator for RecognizerClient {
    async fn compare(
        &self,
        probe: &Embedding,
        candidate: &Embedding,
    ) -> Result<ComparisonResult, RecognizerError> {
        let payload = CompareRequest {
            embedding1: probe.as_slice(),
            embedding2: candidate.as_slice(),
        };

        let response = self
            .http
            .post(self.endpoint("/compare-embeddings"))
            .json(&payload)
            .send()
            .await
            .map_err(|err| RecognizerError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RecognizerError::Status { status, body });
        }

        let body: CompareResponse = response
            .json()
            .await
            .map_err(|err| RecognizerError::MalformedResponse(err.to_string()))?;
        comparison_from_response(body)
    }
}

#[async_trait]
impl EmbeddingExtractor for RecognizerClient {
    async fn extract(&self, image: &[u8]) -> Result<Option<Embedding>, RecognizerError> {
        debug!(bytes = image.len(), "submitting capture for extraction");

        let part = Part::bytes(image.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|err| {
                RecognizerError::Transport(format!("failed to build multipart body: {err}"))
            })?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(self.endpoint("/extract-embedding"))
            .multipart(form)
            .send()
            .await
            .map_err(|err| RecognizerError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RecognizerError::Status { status, body });
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|err| RecognizerError::MalformedResponse(err.to_string()))?;
        embedding_from_extraction(body)
    }
}

#[async_trait]
impl ServiceHealth for RecognizerClient {
    async fn is_healthy(&self) -> bool {
        let response = match self.http.get(self.endpoint("/health")).send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "health probe failed");
                return false;
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "health endpoint answered non-success");
            return false;
        }
        match response.json::<HealthResponse>().await {
            Ok(health) => service_is_ready(&health),
            Err(err) => {
                debug!(error = %err, "health response could not be decoded");
                false
            }
        }
    }
}
