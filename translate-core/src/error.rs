use graph_schema::DomainError;
use thiserror::Error;

pub type TranslateResult<T> = Result<T, TranslateError>;

/// Failures raised during tree construction or transpilation. Any error
/// aborts the whole compilation; there is no partial output.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// A node was used outside the scope it requires (e.g. a predicate
    /// transpiled without a target binding). Indicates a bug in tree
    /// construction, not a malformed request.
    #[error("structural error: {0}")]
    Structural(String),

    /// Name resolution against the schema model failed; the request refers
    /// to attributes, relationships or entities that do not exist.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request is shaped in a way the compiler does not accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TranslateError {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        TranslateError::Structural(message.into())
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, TranslateError::Structural(_))
    }
}
