use thiserror::Error;

/// Errors surfaced by the recognition-service client.
///
/// Inside a corpus scan every variant is recoverable: the engine records the
/// failure in the candidate trace and moves on. Extraction is the exception;
/// without a probe there is nothing to match, so the caller sees the error.
#[derive(Debug, Error)]
pub enum RecognizerError {
    /// The request never produced a response (connect failure, timeout,
    /// client construction).
    #[error("recognition service request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success HTTP status.
    #[error("recognition service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The service answered `success: false`.
    #[error("recognition service rejected the request: {0}")]
    Unsuccessful(String),
    /// The response body could not be decoded into the expected shape.
    #[error("malformed recognition service response: {0}")]
    MalformedResponse(String),
}

/// Errors from the corpus store. Any of these aborts the current match
/// attempt; a corpus that cannot be loaded is not the same as an empty one.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus fetch failed: {0}")]
    Fetch(String),
    #[error("corpus store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("corpus payload could not be decoded: {0}")]
    Decode(String),
}

/// Errors produced by the match engine itself.
///
/// Data-quality problems (missing/invalid/mismatched embeddings, per-pair
/// comparator failures) are not errors: they degrade to per-candidate skips
/// recorded in the trace. Only the cases below fail the operation.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The probe violates the input contract.
    #[error("probe embedding must not be empty")]
    InvalidProbe,
    /// The enrolled corpus could not be loaded at all.
    #[error("corpus unavailable: {0}")]
    Corpus(#[from] CorpusError),
}

/// Errors from the end-to-end authorization flow.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    /// The extraction collaborator failed; no probe was produced, so the
    /// capture cannot be evaluated at all.
    #[error("embedding extraction failed: {0}")]
    Extraction(#[from] RecognizerError),
    #[error(transparent)]
    Match(#[from] MatchError),
}
