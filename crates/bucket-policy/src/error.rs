/// Errors returned when encoding or decoding a policy document.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The document is not valid JSON or does not match the policy grammar.
    #[error("PolicyError: invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// The `Version` element names a policy language version that is not supported.
    #[error("PolicyError: unsupported version {0:?}")]
    UnsupportedVersion(String),
}
