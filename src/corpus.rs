//! Corpus access: the enrolled-identity collection lives in an external
//! document store and is only ever read here, fetch-all, once per match.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::CorpusConfig;
use crate::error::CorpusError;
use crate::types::EnrolledIdentity;

/// Read-only source of enrolled identities.
///
/// Implementations return records in store order; the engine's tie-break
/// depends on it. No filtering is pushed down.
#[async_trait]
pub trait CorpusSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<EnrolledIdentity>, CorpusError>;
}

/// Client for the document store's read API.
pub struct HttpCorpusSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCorpusSource {
    pub fn new(cfg: &CorpusConfig) -> Result<Self, CorpusError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|err| CorpusError::Fetch(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Wire shape of the fetch-all read. An array rather than a keyed map: the
/// engine's tie-break is defined over store order, which a JSON object would
/// not preserve.
#[derive(Debug, Deserialize)]
struct PersonsResponse {
    #[serde(default)]
    persons: Vec<EnrolledIdentity>,
}

#[async_trait]
impl CorpusSource for HttpCorpusSource {
    async fn fetch_all(&self) -> Result<Vec<EnrolledIdentity>, CorpusError> {
        let url = format!("{}/persons", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| CorpusError::Fetch(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CorpusError::Status { status, body });
        }

        let body: PersonsResponse = response
            .json()
            .await
            .map_err(|err| CorpusError::Decode(err.to_string()))?;

        debug!(persons = body.persons.len(), "corpus fetched");
        Ok(body.persons)
    }
}

/// Fixed corpus for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    persons: Vec<EnrolledIdentity>,
}

impl InMemoryCorpus {
    pub fn new(persons: Vec<EnrolledIdentity>) -> Self {
        Self { persons }
    }
}

#[async_trait]
impl CorpusSource for InMemoryCorpus {
    async fn fetch_all(&self) -> Result<Vec<EnrolledIdentity>, CorpusError> {
        Ok(self.persons.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn persons_payload_preserves_store_order() {
        let body: PersonsResponse = serde_json::from_value(json!({
            "persons": [
                { "id": "p3", "name": "Charlie", "embedding": [0.3] },
                { "id": "p1", "name": "Ada", "embedding": [0.1] },
                { "id": "p2", "name": "Grace", "embedding": [0.2] },
            ]
        }))
        .unwrap();

        let ids: Vec<&str> = body.persons.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn corrupted_records_decode_with_absent_embeddings() {
        let body: PersonsResponse = serde_json::from_value(json!({
            "persons": [
                { "id": "p1", "name": "Ada", "embedding": [0.1, 0.2] },
                { "id": "p2", "name": "Grace", "embedding": null },
                { "id": "p3", "name": "Charlie" },
                { "id": "p4", "name": "Edsger", "embedding": "oops" },
            ]
        }))
        .unwrap();

        assert_eq!(body.persons.len(), 4);
        assert!(body.persons[0].embedding.is_some());
        assert!(body.persons[1].embedding.is_none());
        assert!(body.persons[2].embedding.is_none());
        assert!(body.persons[3].embedding.is_none());
    }

    #[test]
    fn missing_persons_field_is_empty_corpus() {
        let body: PersonsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.persons.is_empty());
    }

    #[tokio::test]
    async fn in_memory_corpus_returns_snapshot() {
        let persons = vec![EnrolledIdentity {
            id: "p1".into(),
            name: "Ada".into(),
            embedding: Some(vec![0.1, 0.2].into()),
        }];
        let corpus = InMemoryCorpus::new(persons.clone());

        let fetched = corpus.fetch_all().await.expect("fetch should succeed");
        assert_eq!(fetched, persons);
    }
}
