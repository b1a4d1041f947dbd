use super::session::{AssessmentSession, SessionId};

/// Storage abstraction so the service can be exercised without a backing store.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError>;

    /// Run `change` against the stored session while holding the store's write access.
    ///
    /// The session is kept as `change` left it, whatever `change` returns. Concurrent calls
    /// for the same session are serialized.
    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T;

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError>;
    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
