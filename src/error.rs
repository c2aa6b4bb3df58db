//! Error types for knng.

use thiserror::Error;

/// Errors that can occur while building, querying, or mutating a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnngError {
    /// No live vertex has the given id.
    #[error("no element with id `{0}`")]
    NotFound(String),

    /// A live vertex already uses the given id.
    #[error("graph already contains an element with id `{0}`")]
    AlreadyExists(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Graph bookkeeping is inconsistent.
    ///
    /// This is never a caller error: a live vertex lost its heap, its reverse
    /// index entry, or its slot. The operation that observed it is aborted.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl KnngError {
    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        KnngError::Internal(msg.into())
    }

    /// True when this error signals a bug in the engine rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, KnngError::Internal(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KnngError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_id() {
        let err = KnngError::NotFound("a".into());
        assert_eq!(err.to_string(), "no element with id `a`");

        let err = KnngError::AlreadyExists("b".into());
        assert!(err.to_string().contains("`b`"));
    }

    #[test]
    fn only_internal_is_internal() {
        assert!(KnngError::internal("x").is_internal());
        assert!(!KnngError::NotFound("x".into()).is_internal());
        assert!(!KnngError::InvalidParameter("k".into()).is_internal());
    }
}
