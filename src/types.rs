use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// Fixed-length face embedding vector.
///
/// Two embeddings are comparable only when their lengths are equal; the
/// engine never scores cross-dimension pairs. On the wire an embedding is a
/// bare JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// One enrolled person as stored in the corpus.
///
/// The stored embedding is decoded leniently: a missing, null, or
/// structurally invalid value (anything that is not a sequence of numbers)
/// becomes `None` instead of failing the whole corpus fetch. The engine
/// skips such records during a scan; a single corrupted document must not
/// abort matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledIdentity {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_embedding")]
    pub embedding: Option<Embedding>,
}

fn lenient_embedding<'de, D>(deserializer: D) -> Result<Option<Embedding>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(embedding_from_value(value))
}

fn embedding_from_value(value: JsonValue) -> Option<Embedding> {
    let JsonValue::Array(items) = value else {
        return None;
    };
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        values.push(item.as_f64()? as f32);
    }
    Some(Embedding::new(values))
}

/// Result of one delegated pairwise comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Raw distance between the two embeddings; non-negative.
    pub distance: f32,
    /// Similarity percentage on the 0–100 scale shared with the threshold.
    pub similarity: f32,
    /// The comparator's own match verdict; observational, the engine applies
    /// its threshold to `similarity` instead.
    pub is_match: bool,
    /// Categorical confidence label reported by the comparator.
    pub confidence: String,
}

/// The engine's output for a qualifying best match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub person_id: String,
    pub name: String,
    pub distance: f32,
    /// Normalized confidence in [0, 1]: the best candidate's similarity
    /// projected out of the 0–100 percentage space.
    pub confidence: f32,
}

/// What the scan did with a single candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CandidateStatus {
    /// The comparator ran; `qualified` records whether the similarity met
    /// the threshold.
    Compared {
        similarity: f32,
        distance: f32,
        confidence: String,
        is_match: bool,
        qualified: bool,
    },
    /// The stored embedding was missing or not a proper numeric sequence.
    MissingEmbedding,
    /// The stored embedding's length differs from the probe's.
    DimensionMismatch { stored: usize, probe: usize },
    /// The comparator failed for this pair; the scan continued.
    ComparatorFailed { reason: String },
}

/// Per-candidate diagnostic trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    pub person_id: String,
    pub name: String,
    pub status: CandidateStatus,
}

/// Outcome of one match invocation: the optional best match plus the
/// per-candidate trace, in corpus order. The trace is observational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub best: Option<MatchResult>,
    pub trace: Vec<CandidateEvaluation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedding_serializes_as_bare_array() {
        let embedding = Embedding::from(vec![0.25, -1.5, 3.0]);
        let value = serde_json::to_value(&embedding).unwrap();
        assert_eq!(value, json!([0.25, -1.5, 3.0]));

        let back: Embedding = serde_json::from_value(value).unwrap();
        assert_eq!(back, embedding);
    }

    #[test]
    fn enrolled_identity_decodes_valid_embedding() {
        let person: EnrolledIdentity = serde_json::from_value(json!({
            "id": "p1",
            "name": "Ada",
            "embedding": [0.1, 0.2, 0.3],
        }))
        .unwrap();

        let embedding = person.embedding.expect("embedding should decode");
        assert_eq!(embedding.len(), 3);
    }

    #[test]
    fn missing_embedding_field_decodes_as_absent() {
        let person: EnrolledIdentity =
            serde_json::from_value(json!({ "id": "p1", "name": "Ada" })).unwrap();
        assert!(person.embedding.is_none());
    }

    #[test]
    fn null_embedding_decodes_as_absent() {
        let person: EnrolledIdentity = serde_json::from_value(json!({
            "id": "p1",
            "name": "Ada",
            "embedding": null,
        }))
        .unwrap();
        assert!(person.embedding.is_none());
    }

    #[test]
    fn non_sequence_embedding_decodes_as_absent() {
        let person: EnrolledIdentity = serde_json::from_value(json!({
            "id": "p1",
            "name": "Ada",
            "embedding": "not-a-vector",
        }))
        .unwrap();
        assert!(person.embedding.is_none());
    }

    #[test]
    fn partially_numeric_embedding_decodes_as_absent() {
        let person: EnrolledIdentity = serde_json::from_value(json!({
            "id": "p1",
            "name": "Ada",
            "embedding": [0.1, "corrupt", 0.3],
        }))
        .unwrap();
        assert!(person.embedding.is_none());
    }

    #[test]
    fn empty_array_embedding_decodes_as_present_but_empty() {
        let person: EnrolledIdentity = serde_json::from_value(json!({
            "id": "p1",
            "name": "Ada",
            "embedding": [],
        }))
        .unwrap();

        let embedding = person.embedding.expect("empty array is still a sequence");
        assert!(embedding.is_empty());
    }

    #[test]
    fn match_result_serde_roundtrip() {
        let result = MatchResult {
            person_id: "p1".into(),
            name: "Ada".into(),
            distance: 0.41,
            confidence: 0.92,
        };

        let serialized = serde_json::to_string(&result).unwrap();
        let back: MatchResult = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn candidate_status_serializes_with_kind_tag() {
        let status = CandidateStatus::DimensionMismatch {
            stored: 128,
            probe: 512,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["kind"], "dimension_mismatch");
        assert_eq!(value["stored"], 128);
        assert_eq!(value["probe"], 512);
    }

    #[test]
    fn compared_status_records_qualification() {
        let status = CandidateStatus::Compared {
            similarity: 88.5,
            distance: 0.2,
            confidence: "high".into(),
            is_match: true,
            qualified: true,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["kind"], "compared");
        assert_eq!(value["qualified"], true);
    }
}
