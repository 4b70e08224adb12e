use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dvorfs_client::{BackendClient, DownloadWorkflow};
use tokio::sync::RwLock;

use crate::i18n::Translations;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct SessionEntry {
    workflow: DownloadWorkflow,
    last_seen: Instant
}

impl SessionEntry {
    fn touch(&mut self) -> &mut DownloadWorkflow {
        self.last_seen = Instant::now();
        &mut self.workflow
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub translations: Arc<Translations>,
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>
}

impl AppState {
    pub fn new(backend: BackendClient, translations: Translations) -> Self {
        Self {
            backend,
            translations: Arc::new(translations),
            sessions: Arc::new(RwLock::new(HashMap::new()))
        }
    }

    /// Runs `f` against the session's workflow if the session is known.
    /// The lock is released when `f` returns, never across backend calls.
    pub async fn with_workflow<R>(&self, session_id: &str, f: impl FnOnce(&mut DownloadWorkflow) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(session_id).map(|entry| f(entry.touch()))
    }

    /// Like [`AppState::with_workflow`], creating the workflow on first use.
    pub async fn with_workflow_or_insert<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut DownloadWorkflow) -> R
    ) -> R {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session = %session_id, "starting session");
                SessionEntry {
                    workflow: DownloadWorkflow::new(),
                    last_seen: Instant::now()
                }
            });
        f(entry.touch())
    }

    /// Copy of the session's workflow, or an empty one for unknown sessions.
    pub async fn snapshot(&self, session_id: &str) -> DownloadWorkflow {
        self.with_workflow(session_id, |workflow| workflow.clone())
            .await
            .unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions not used for longer than `max_idle`. Returns how many
    /// were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        before - sessions.len()
    }

    /// Evicts idle sessions forever. Meant to run on its own task.
    pub async fn sweep_sessions(self, max_idle: Duration) {
        let period = (max_idle / 4).clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!("Session sweeper started, idle limit {}s", max_idle.as_secs());

        loop {
            interval.tick().await;
            let evicted = self.evict_idle(max_idle).await;
            if evicted > 0 {
                let remaining = self.session_count().await;
                tracing::info!(
                    evicted,
                    remaining,
                    "evicted idle sessions"
                );
            }
        }
    }
}
