//! Test doubles and a virtual-time harness
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use vigil_core::{
    ActivityKind, LogoutError, Navigator, RemoteLogout, SessionConfig, SessionPresenter,
    SessionRecord, TerminationReason, WarningView,
};

use crate::{
    ActivityBus, IdleSessionController, ManualScheduler, MemorySessionStore, SessionDeps,
    SessionIntents,
};

/// Wall-clock origin of every harness, in seconds since epoch
pub const ORIGIN_SECS: i64 = 1_700_000_000;

/// `ORIGIN_SECS` as a timestamp
pub fn origin() -> DateTime<Utc> {
    Utc.timestamp_opt(ORIGIN_SECS, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Build an unsigned token whose `exp` claim is `exp` (seconds since epoch)
pub fn token_expiring_at(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "sub": "tester",
        "roles": ["ROLE_CUSTOMER"],
        "iat": exp - 3600,
        "exp": exp,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}

/// A logged-in session record carrying `token`
pub fn session_record(token: impl Into<String>) -> SessionRecord {
    SessionRecord {
        token: token.into(),
        user_id: "1001".to_string(),
        username: "tester".to_string(),
        roles: vec!["ROLE_CUSTOMER".to_string()],
        customer_id: Some("CUST-1001".to_string()),
        email: Some("tester@example.com".to_string()),
    }
}

/// Presenter that records everything it is asked to show
///
/// Clones share the same recording, so a test can keep one clone while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    views: Arc<Mutex<Vec<WarningView>>>,
    notices: Arc<Mutex<Vec<String>>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<WarningView> {
        self.views.lock().clone()
    }

    /// Most recent view, hidden if nothing was rendered yet
    pub fn last_view(&self) -> WarningView {
        self.views.lock().last().copied().unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().clone()
    }
}

impl SessionPresenter for RecordingPresenter {
    fn render(&mut self, view: WarningView) {
        self.views.lock().push(view);
    }

    fn notice(&mut self, message: &str) {
        self.notices.lock().push(message.to_string());
    }
}

/// Navigator that records every request to leave the session
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    reasons: Mutex<Vec<TerminationReason>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.reasons.lock().len()
    }

    pub fn reasons(&self) -> Vec<TerminationReason> {
        self.reasons.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn leave_session(&self, reason: TerminationReason) {
        self.reasons.lock().push(reason);
    }
}

/// Remote logout that counts calls and optionally fails every one
#[derive(Debug, Default)]
pub struct CountingRemoteLogout {
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
    fail: bool,
}

impl CountingRemoteLogout {
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote that is always unreachable
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token.lock().clone()
    }
}

impl RemoteLogout for CountingRemoteLogout {
    fn notify(&self, token: Option<&str>) -> Result<(), LogoutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock() = token.map(str::to_string);
        if self.fail {
            return Err(LogoutError::Request("connection refused".to_string()));
        }
        Ok(())
    }
}

/// What the store holds when the controller starts
enum StoredSession {
    None,
    ExpiresIn(i64),
    Raw(String),
}

/// Builder for [`Harness`]
pub struct HarnessBuilder {
    config: SessionConfig,
    session: StoredSession,
    failing_remote: bool,
}

impl HarnessBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Token expires this many seconds after the origin; negative is already expired
    pub fn token_valid_for(mut self, secs: i64) -> Self {
        self.session = StoredSession::ExpiresIn(secs);
        self
    }

    /// Store `token` verbatim as the session token
    pub fn raw_token(mut self, token: impl Into<String>) -> Self {
        self.session = StoredSession::Raw(token.into());
        self
    }

    /// No session in the store at startup
    pub fn logged_out(mut self) -> Self {
        self.session = StoredSession::None;
        self
    }

    pub fn failing_remote(mut self) -> Self {
        self.failing_remote = true;
        self
    }

    /// Build and start the controller
    pub fn start(self) -> vigil_core::Result<Harness> {
        let scheduler = Arc::new(ManualScheduler::starting_at(origin()));
        let bus = Arc::new(ActivityBus::new());
        let store = Arc::new(MemorySessionStore::new());
        let remote = Arc::new(if self.failing_remote {
            CountingRemoteLogout::failing()
        } else {
            CountingRemoteLogout::new()
        });
        let navigator = Arc::new(RecordingNavigator::new());
        let presenter = RecordingPresenter::new();

        match self.session {
            StoredSession::None => {}
            StoredSession::ExpiresIn(secs) => {
                store.insert(&session_record(token_expiring_at(ORIGIN_SECS + secs)))?
            }
            StoredSession::Raw(token) => store.insert(&session_record(token))?,
        }

        let controller = IdleSessionController::start(SessionDeps {
            config: self.config,
            clock: scheduler.clone(),
            scheduler: scheduler.clone(),
            source: bus.clone(),
            store: store.clone(),
            remote: remote.clone(),
            navigator: navigator.clone(),
            presenter: Box::new(presenter.clone()),
        })?;

        Ok(Harness {
            scheduler,
            bus,
            store,
            remote,
            navigator,
            presenter,
            controller,
        })
    }
}

/// A controller wired to in-memory doubles and virtual time
pub struct Harness {
    pub scheduler: Arc<ManualScheduler>,
    pub bus: Arc<ActivityBus>,
    pub store: Arc<MemorySessionStore>,
    pub remote: Arc<CountingRemoteLogout>,
    pub navigator: Arc<RecordingNavigator>,
    pub presenter: RecordingPresenter,
    pub controller: IdleSessionController,
}

impl Harness {
    /// Defaults: standard timings, token valid for a day, working remote
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            config: SessionConfig::default(),
            session: StoredSession::ExpiresIn(24 * 60 * 60),
            failing_remote: false,
        }
    }

    /// Advance virtual time, letting the controller react after each firing
    pub fn advance(&mut self, by: Duration) {
        let Self {
            scheduler,
            controller,
            ..
        } = self;
        scheduler.advance_and(by, || {
            controller.pump();
        });
        controller.pump();
    }

    pub fn advance_secs(&mut self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    /// Emit one interaction and let the controller handle it
    pub fn activity(&mut self, kind: ActivityKind) {
        self.bus.emit(kind);
        self.controller.pump();
    }

    pub fn intents(&self) -> SessionIntents {
        self.controller.intents()
    }

    pub fn continue_session(&mut self) {
        self.intents().continue_session();
        self.controller.pump();
    }

    pub fn logout_now(&mut self) {
        self.intents().logout_now();
        self.controller.pump();
    }
}
