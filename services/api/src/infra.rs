use aptitude::assessment::{AssessmentSession, RepositoryError, SessionId, SessionRepository};
use aptitude::config::DEFAULT_SESSION_CAPACITY;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session store; sessions do not survive a restart.
///
/// Holds at most `capacity` sessions. Inserting into a full store evicts the session that
/// started earliest.
#[derive(Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
    capacity: usize,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }
}

impl InMemorySessionRepository {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::default(),
            capacity: capacity.max(1),
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, AssessmentSession>>, RepositoryError>
    {
        self.sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))
    }
}

fn evict_oldest(sessions: &mut HashMap<SessionId, AssessmentSession>) {
    let oldest = sessions
        .values()
        .min_by_key(|session| session.started_at())
        .map(|session| session.id().clone());
    if let Some(id) = oldest {
        sessions.remove(&id);
        warn!(session_id = %id.0, "session store full; evicted oldest session");
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: AssessmentSession) -> Result<AssessmentSession, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        while guard.len() >= self.capacity {
            evict_oldest(&mut guard);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn modify<T, F>(&self, id: &SessionId, change: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut AssessmentSession) -> T,
    {
        let mut guard = self.lock()?;
        let session = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(change(session))
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<AssessmentSession>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<(), RepositoryError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
