//! Exactly-once logout

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use vigil_core::{Navigator, RemoteLogout, SessionStore, TerminationReason};

/// Performs the logout side effects for a session
///
/// In order: a best-effort server notice, clearing every persisted session
/// key, then navigation away. Remote failures never stop the local steps.
/// Only the first `terminate` does anything.
pub struct LogoutCoordinator {
    store: Arc<dyn SessionStore>,
    remote: Arc<dyn RemoteLogout>,
    navigator: Arc<dyn Navigator>,
    done: AtomicBool,
}

impl LogoutCoordinator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        remote: Arc<dyn RemoteLogout>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            remote,
            navigator,
            done: AtomicBool::new(false),
        }
    }

    /// End the session; returns false if it had already been ended
    pub fn terminate(&self, reason: TerminationReason) -> bool {
        if self.done.swap(true, Ordering::SeqCst) {
            debug!("Logout already performed, ignoring {}", reason);
            return false;
        }

        info!("Logging out: {}", reason);

        let token = self.store.auth_token();
        if let Err(e) = self.remote.notify(token.as_deref()) {
            warn!("Remote logout failed: {}", e);
        }

        if let Err(e) = self.store.clear() {
            error!("Failed to clear session data: {}", e);
        }

        self.navigator.leave_session(reason);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingRemoteLogout, RecordingNavigator};
    use crate::MemorySessionStore;
    use vigil_core::SessionRecord;

    fn logged_in_store() -> Arc<MemorySessionStore> {
        let store = Arc::new(MemorySessionStore::new());
        store
            .insert(&SessionRecord {
                token: "h.p.s".to_string(),
                user_id: "1".to_string(),
                username: "dana".to_string(),
                roles: vec![],
                customer_id: None,
                email: None,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_terminate_runs_once() {
        let store = logged_in_store();
        let remote = Arc::new(CountingRemoteLogout::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let coordinator = LogoutCoordinator::new(store.clone(), remote.clone(), navigator.clone());

        assert!(coordinator.terminate(TerminationReason::IdleTimeout));
        assert!(!coordinator.terminate(TerminationReason::UserLogout));

        assert_eq!(store.clears(), 1);
        assert_eq!(remote.calls(), 1);
        assert_eq!(remote.last_token().as_deref(), Some("h.p.s"));
        assert_eq!(navigator.reasons(), vec![TerminationReason::IdleTimeout]);
    }

    #[test]
    fn test_remote_failure_still_clears_and_navigates() {
        let store = logged_in_store();
        let remote = Arc::new(CountingRemoteLogout::failing());
        let navigator = Arc::new(RecordingNavigator::new());
        let coordinator = LogoutCoordinator::new(store.clone(), remote.clone(), navigator.clone());

        assert!(coordinator.terminate(TerminationReason::UserLogout));
        assert_eq!(remote.calls(), 1);
        assert!(!store.is_authenticated());
        assert_eq!(navigator.count(), 1);
    }
}
