//! Application state

use chrono::{DateTime, Utc};

use vigil_core::store::keys;
use vigil_core::{SessionState, SessionStore, TerminationReason, TokenInspector, WarningView};

use crate::ui::components::notification::NotificationManager;

/// Current screen/view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Logged-in dashboard
    #[default]
    Dashboard,

    /// Session over, or there never was one
    SignedOut,
}

/// Who is logged in, read once from the store at startup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub username: String,
    pub user_id: String,
    pub customer_id: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    /// Token expiry, if the token could be read
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Read the logged-in user, if any
    pub fn from_store(store: &dyn SessionStore) -> Option<Self> {
        if !store.is_authenticated() {
            return None;
        }

        let roles = store
            .get(keys::USER_ROLES)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let token_expires_at = store
            .auth_token()
            .and_then(|token| TokenInspector::new().expires_at(&token));

        Some(Self {
            username: store.get(keys::USERNAME).unwrap_or_default(),
            user_id: store.get(keys::USER_ID).unwrap_or_default(),
            customer_id: store.get(keys::CUSTOMER_ID),
            email: store.get(keys::EMAIL),
            roles,
            token_expires_at,
        })
    }
}

/// Session figures for the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub state: Option<SessionState>,
    /// Seconds until the warning appears, while active
    pub warning_in: Option<u64>,
    /// Countdown while warning
    pub seconds_remaining: Option<u64>,
}

/// Application state
#[derive(Default)]
pub struct AppState {
    /// Current screen
    pub current_screen: Screen,

    pub identity: Option<Identity>,

    pub session: SessionStatus,

    /// Warning dialog, drawn over any screen
    pub warning: WarningView,

    /// Why the session ended, if it has
    pub signed_out: Option<TerminationReason>,

    pub notifications: NotificationManager,

    /// Redraw tick counter
    pub tick: u64,
}

impl AppState {
    pub fn new(identity: Option<Identity>) -> Self {
        let current_screen = if identity.is_some() {
            Screen::Dashboard
        } else {
            Screen::SignedOut
        };
        Self {
            current_screen,
            identity,
            ..Self::default()
        }
    }

    /// Advance animations and expire notifications
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.notifications.tick();
    }

    /// Switch to the signed-out screen
    pub fn sign_out(&mut self, reason: Option<TerminationReason>) {
        if reason.is_some() {
            self.signed_out = reason;
        }
        self.warning = WarningView::hidden();
        self.current_screen = Screen::SignedOut;
    }
}
