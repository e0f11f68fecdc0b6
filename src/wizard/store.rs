use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::state::WizardSession;

/// In-flight wizards, keyed by id. Never persisted.
#[derive(Default)]
pub struct WizardStore {
    sessions: RwLock<HashMap<String, WizardSession>>,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: WizardSession) {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
    }

    pub async fn get(&self, id: &str) -> Option<WizardSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Runs `update` on the stored session under the write lock and returns
    /// its result; None when the id is unknown
    pub async fn update<F, T>(&self, id: &str, update: F) -> Option<T>
    where
        F: FnOnce(&mut WizardSession) -> T,
    {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(update)
    }

    /// Drops every session whose wait window has passed
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at >= now);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Swept stale pick sessions");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::race::models::fixtures::at;
    use chrono::Duration;

    fn session(now: DateTime<Utc>) -> WizardSession {
        WizardSession::new(
            "u1".to_string(),
            "alice".to_string(),
            1,
            vec![Category::Pole],
            now,
            Duration::minutes(5),
        )
    }

    #[tokio::test]
    async fn sweep_removes_only_stale_sessions() {
        let store = WizardStore::new();
        store.insert(session(at(1, 10))).await;
        let fresh = session(at(1, 12));
        let fresh_id = fresh.id.clone();
        store.insert(fresh).await;

        assert_eq!(store.sweep(at(1, 12)).await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(&fresh_id).await.is_some());
    }

    #[tokio::test]
    async fn update_reports_unknown_id() {
        let store = WizardStore::new();
        assert!(store.update("missing", |_| ()).await.is_none());
    }
}
