//! Idle-session state machine
//!
//! The controller owns the session's timers and listeners. Everything that
//! can move it (timer firings, user activity, presenter intents) arrives as
//! a [`SessionEvent`] on its channel, and is applied one at a time by
//! [`IdleSessionController::handle`]. Callbacks never touch the state
//! machine directly.
//!
//! ```text
//!            activity / continue
//!          +--------------------+
//!          v                    |
//!      [Active] --warning--> [Warning] --tick at 0--> [Terminated]
//!          |                    |                          ^
//!          +--- logout due, expired token, logout now -----+
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use vigil_core::{
    ActivityKind, Clock, Navigator, RemoteLogout, Scheduler, SessionConfig, SessionPresenter,
    SessionState, SessionStore, Subscribable, TerminationReason, TimerHandle, TokenInspector,
    WarningView,
};

use crate::coordinator::LogoutCoordinator;
use crate::event::{SessionEvent, SessionIntents};
use crate::tracker::ActivityTracker;

/// Notice shown when the user extends the session
pub const SESSION_EXTENDED: &str = "Session extended";

/// Collaborators a controller is built from
pub struct SessionDeps {
    pub config: SessionConfig,
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn Scheduler>,
    pub source: Arc<dyn Subscribable>,
    pub store: Arc<dyn SessionStore>,
    pub remote: Arc<dyn RemoteLogout>,
    pub navigator: Arc<dyn Navigator>,
    pub presenter: Box<dyn SessionPresenter>,
}

/// At most one of each kind armed at a time
#[derive(Default)]
struct Timers {
    warning: Option<TimerHandle>,
    logout: Option<TimerHandle>,
    tick: Option<TimerHandle>,
}

impl Timers {
    fn armed(&self) -> usize {
        [self.warning, self.logout, self.tick]
            .iter()
            .filter(|t| t.is_some())
            .count()
    }
}

/// Drives one authenticated session from start to termination
pub struct IdleSessionController {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    store: Arc<dyn SessionStore>,
    presenter: Box<dyn SessionPresenter>,
    coordinator: LogoutCoordinator,
    tracker: ActivityTracker,
    inspector: TokenInspector,

    /// `None` when there was no session to manage
    state: Option<SessionState>,
    termination: Option<TerminationReason>,
    seconds_remaining: Option<u64>,

    /// Bumped on every re-arm; timer events from older arms are stale
    generation: u64,
    timers: Timers,

    sender: mpsc::UnboundedSender<SessionEvent>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl IdleSessionController {
    /// Build a controller and start managing the stored session
    ///
    /// With no authenticated session in the store the controller is inert:
    /// it arms nothing and listens to nothing. A stored token that is
    /// already expired (or unreadable) terminates immediately without
    /// arming anything.
    pub fn start(deps: SessionDeps) -> vigil_core::Result<Self> {
        deps.config.validate()?;

        let (sender, events) = mpsc::unbounded_channel();
        let tracker = ActivityTracker::new(deps.source, Arc::clone(&deps.clock));
        let coordinator =
            LogoutCoordinator::new(Arc::clone(&deps.store), deps.remote, deps.navigator);

        let mut controller = Self {
            config: deps.config,
            clock: deps.clock,
            scheduler: deps.scheduler,
            store: deps.store,
            presenter: deps.presenter,
            coordinator,
            tracker,
            inspector: TokenInspector::new(),
            state: None,
            termination: None,
            seconds_remaining: None,
            generation: 0,
            timers: Timers::default(),
            sender,
            events,
        };

        if !controller.store.is_authenticated() {
            info!("No authenticated session, idle management disabled");
            return Ok(controller);
        }

        if !controller.token_valid() {
            info!("Stored token is expired or unreadable");
            let reason = TerminationReason::TokenExpired;
            controller.state = Some(SessionState::Terminated);
            controller.termination = Some(reason);
            controller.coordinator.terminate(reason);
            controller.presenter.notice(reason.notice());
            return Ok(controller);
        }

        controller.state = Some(SessionState::Active);

        let sender = controller.sender.clone();
        controller.tracker.start(Arc::new(move |kind: ActivityKind, at: Instant| {
            // Receiver lives as long as the controller
            let _ = sender.send(SessionEvent::Activity { kind, at });
        }));

        controller.tracker.record(controller.clock.now());
        controller.rearm();
        info!(
            "Session active (idle timeout {}s, warning {}s before)",
            controller.config.idle_timeout_secs, controller.config.warning_lead_secs
        );
        Ok(controller)
    }

    /// Apply every queued event; returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next queued event
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Handle events until the session ends
    pub async fn run(&mut self) -> Option<TerminationReason> {
        while self.is_live() {
            match self.events.recv().await {
                Some(event) => self.handle(event),
                None => break,
            }
        }
        self.termination
    }

    /// Apply one event to the state machine
    pub fn handle(&mut self, event: SessionEvent) {
        let Some(state) = self.live_state() else {
            trace!("Session not live, ignoring {:?}", event);
            return;
        };

        match event {
            SessionEvent::Activity { .. } => self.on_activity(),
            SessionEvent::WarningDue { generation }
                if generation == self.generation && state == SessionState::Active =>
            {
                self.enter_warning()
            }
            SessionEvent::LogoutDue { generation } if generation == self.generation => {
                info!("Idle timeout reached");
                self.terminate(TerminationReason::IdleTimeout)
            }
            SessionEvent::Tick { generation }
                if generation == self.generation && state == SessionState::Warning =>
            {
                self.on_tick()
            }
            SessionEvent::ContinueSession if state == SessionState::Warning => {
                self.continue_session()
            }
            SessionEvent::LogoutNow => self.terminate(TerminationReason::UserLogout),
            other => trace!("Discarding stale or out-of-state {:?} in {}", other, state),
        }
    }

    /// Stop managing the session
    ///
    /// Cancels every timer and removes every listener. Session data is left
    /// in place unless `logout_on_teardown` is configured, in which case the
    /// full logout runs.
    pub fn teardown(&mut self) {
        if self.live_state().is_none() {
            self.disarm();
            self.tracker.stop();
            return;
        }

        if self.config.logout_on_teardown {
            self.terminate(TerminationReason::Teardown);
            return;
        }

        self.shutdown();
        self.termination = Some(TerminationReason::Teardown);
        info!("Session manager torn down");
    }

    pub fn state(&self) -> Option<SessionState> {
        self.state
    }

    /// Why the session ended, once it has
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Whole seconds left on the countdown; only while warning
    pub fn seconds_remaining(&self) -> Option<u64> {
        self.seconds_remaining
    }

    /// Latest interaction as recorded by the tracker
    pub fn last_activity(&self) -> Option<Instant> {
        self.tracker.last_activity()
    }

    /// When the warning will appear, while active or warning
    pub fn warning_deadline(&self) -> Option<Instant> {
        self.live_state()?;
        self.last_activity()?.checked_add(self.config.warning_delay())
    }

    /// When the idle logout happens, while active or warning
    pub fn logout_deadline(&self) -> Option<Instant> {
        self.live_state()?;
        self.last_activity()?.checked_add(self.config.idle_timeout())
    }

    /// Number of timers this controller currently holds
    pub fn armed_timers(&self) -> usize {
        self.timers.armed()
    }

    /// Handle for relaying user intents to this controller
    pub fn intents(&self) -> SessionIntents {
        SessionIntents::new(self.sender.clone())
    }

    pub fn is_live(&self) -> bool {
        self.live_state().is_some()
    }

    fn live_state(&self) -> Option<SessionState> {
        self.state.filter(|s| !s.is_terminated())
    }

    fn token_valid(&self) -> bool {
        match self.store.auth_token() {
            Some(token) => !self.inspector.is_expired(&token, self.clock.wall()),
            None => false,
        }
    }

    fn on_activity(&mut self) {
        if !self.token_valid() {
            info!("Token expired during active session");
            self.terminate(TerminationReason::TokenExpired);
            return;
        }
        self.rearm();
    }

    fn enter_warning(&mut self) {
        self.timers.warning = None;
        self.transition(SessionState::Warning);

        let seconds = self.compute_remaining();
        self.seconds_remaining = Some(seconds);
        self.presenter.render(WarningView::countdown(seconds));

        let generation = self.generation;
        let sender = self.sender.clone();
        self.timers.tick = Some(self.scheduler.every(
            self.config.tick_interval(),
            Box::new(move || {
                let _ = sender.send(SessionEvent::Tick { generation });
            }),
        ));

        info!("Session idle, logout in {}s", seconds);
    }

    fn on_tick(&mut self) {
        let seconds = self.compute_remaining();
        if seconds == 0 {
            self.terminate(TerminationReason::IdleTimeout);
            return;
        }

        debug!("Countdown: {}s", seconds);
        self.seconds_remaining = Some(seconds);
        self.presenter.render(WarningView::countdown(seconds));
    }

    fn continue_session(&mut self) {
        self.tracker.record(self.clock.now());
        self.rearm();
        self.presenter.notice(SESSION_EXTENDED);
        info!("Session extended");
    }

    /// Ceil of the time left until the logout deadline, in seconds
    fn compute_remaining(&self) -> u64 {
        let Some(last) = self.last_activity() else {
            return 0;
        };
        let idle = self.clock.now().saturating_duration_since(last);
        let left = self.config.idle_timeout().saturating_sub(idle);
        left.as_millis().div_ceil(1000) as u64
    }

    /// Re-derive both deadlines from the last activity and arm fresh timers
    fn rearm(&mut self) {
        self.disarm();
        self.generation += 1;

        let now = self.clock.now();
        let idle = self
            .last_activity()
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        let warning_in = self.config.warning_delay().saturating_sub(idle);
        let logout_in = self.config.idle_timeout().saturating_sub(idle);

        self.timers.warning = Some(self.arm_once(warning_in, |generation| {
            SessionEvent::WarningDue { generation }
        }));
        self.timers.logout = Some(self.arm_once(logout_in, |generation| {
            SessionEvent::LogoutDue { generation }
        }));

        if self.state == Some(SessionState::Warning) {
            self.presenter.render(WarningView::hidden());
        }
        self.transition(SessionState::Active);
        self.seconds_remaining = None;

        debug!("Idle timers armed, warning in {:?}", warning_in);
    }

    fn arm_once(&self, delay: Duration, event: fn(u64) -> SessionEvent) -> TimerHandle {
        let event = event(self.generation);
        let sender = self.sender.clone();
        self.scheduler.after(
            delay,
            Box::new(move || {
                let _ = sender.send(event);
            }),
        )
    }

    fn disarm(&mut self) {
        for handle in [
            self.timers.warning.take(),
            self.timers.logout.take(),
            self.timers.tick.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.scheduler.cancel(handle);
        }
    }

    /// Release timers and listeners and hide the warning
    fn shutdown(&mut self) {
        self.disarm();
        self.tracker.stop();
        if self.state == Some(SessionState::Warning) {
            self.presenter.render(WarningView::hidden());
        }
        self.transition(SessionState::Terminated);
        self.seconds_remaining = None;
    }

    fn terminate(&mut self, reason: TerminationReason) {
        if self.live_state().is_none() {
            return;
        }

        self.shutdown();
        self.termination = Some(reason);
        self.coordinator.terminate(reason);
        self.presenter.notice(reason.notice());
        info!("Session terminated: {}", reason);
    }

    fn transition(&mut self, next: SessionState) {
        if let Some(current) = self.state {
            debug_assert!(
                current.can_transition_to(next),
                "illegal transition {} -> {}",
                current,
                next
            );
            if current != next {
                debug!("Session state: {} -> {}", current, next);
            }
        }
        self.state = Some(next);
    }
}

impl Drop for IdleSessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use proptest::prelude::*;
    use vigil_core::store::keys;

    const IDLE: u64 = 300;
    const LEAD: u64 = 30;

    fn harness() -> Harness {
        Harness::builder().start().unwrap()
    }

    #[test]
    fn test_starts_active_with_timers_and_listeners() {
        let h = harness();
        assert_eq!(h.controller.state(), Some(SessionState::Active));
        assert_eq!(h.controller.armed_timers(), 2);
        assert_eq!(h.scheduler.armed(), 2);
        assert_eq!(h.bus.active_subscriptions(), ActivityKind::TRACKED.len());
        assert!(h.controller.seconds_remaining().is_none());
    }

    #[test]
    fn test_deadlines_follow_start() {
        let h = harness();
        let start = h.controller.last_activity().unwrap();
        assert_eq!(
            h.controller.warning_deadline(),
            Some(start + Duration::from_secs(IDLE - LEAD))
        );
        assert_eq!(
            h.controller.logout_deadline(),
            Some(start + Duration::from_secs(IDLE))
        );
    }

    #[test]
    fn test_warning_appears_with_full_lead() {
        let mut h = harness();
        h.advance_secs(IDLE - LEAD - 1);
        assert_eq!(h.controller.state(), Some(SessionState::Active));

        h.advance_secs(1);
        assert_eq!(h.controller.state(), Some(SessionState::Warning));
        assert_eq!(h.controller.seconds_remaining(), Some(LEAD));
        assert_eq!(h.presenter.last_view(), WarningView::countdown(LEAD));
        // Logout backstop plus the countdown tick
        assert_eq!(h.controller.armed_timers(), 2);
        assert_eq!(h.scheduler.armed(), 2);
    }

    #[test]
    fn test_countdown_is_recomputed_each_tick() {
        let mut h = harness();
        h.advance_secs(IDLE - LEAD + 15);
        assert_eq!(h.controller.seconds_remaining(), Some(15));
        assert_eq!(h.presenter.last_view(), WarningView::countdown(15));

        let countdown: Vec<u64> = h
            .presenter
            .views()
            .iter()
            .filter(|v| v.visible)
            .map(|v| v.seconds_remaining)
            .collect();
        assert_eq!(countdown, (15..=LEAD).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_idle_timeout_terminates_and_clears() {
        let mut h = harness();
        h.advance_secs(IDLE);

        assert_eq!(h.controller.state(), Some(SessionState::Terminated));
        assert_eq!(h.controller.termination(), Some(TerminationReason::IdleTimeout));
        for key in keys::ALL {
            assert!(h.store.get(key).is_none());
        }
        assert_eq!(h.store.clears(), 1);
        assert_eq!(h.navigator.reasons(), vec![TerminationReason::IdleTimeout]);
        assert_eq!(h.remote.calls(), 1);
        assert_eq!(h.controller.armed_timers(), 0);
        assert_eq!(h.scheduler.armed(), 0);
        assert_eq!(h.bus.active_subscriptions(), 0);
        assert!(!h.presenter.last_view().visible);
        assert!(h
            .presenter
            .notices()
            .contains(&"You have been logged out due to inactivity".to_string()));
    }

    #[test]
    fn test_nothing_happens_after_termination() {
        let mut h = harness();
        h.advance_secs(IDLE);
        let views = h.presenter.views().len();

        h.advance_secs(IDLE * 3);
        h.activity(ActivityKind::KeyDown);
        h.continue_session();
        h.logout_now();

        assert_eq!(h.presenter.views().len(), views);
        assert_eq!(h.store.clears(), 1);
        assert_eq!(h.navigator.count(), 1);
    }

    #[test]
    fn test_activity_defers_warning() {
        let mut h = harness();
        h.advance_secs(200);
        h.activity(ActivityKind::PointerDown);
        h.advance_secs(200);
        assert_eq!(h.controller.state(), Some(SessionState::Active));

        h.advance_secs(IDLE - LEAD - 200);
        assert_eq!(h.controller.state(), Some(SessionState::Warning));
    }

    #[test]
    fn test_activity_during_warning_returns_to_active() {
        let mut h = harness();
        h.advance_secs(IDLE - LEAD + 5);
        assert_eq!(h.controller.state(), Some(SessionState::Warning));

        h.activity(ActivityKind::Scroll);
        assert_eq!(h.controller.state(), Some(SessionState::Active));
        assert!(!h.presenter.last_view().visible);
        assert!(h.controller.seconds_remaining().is_none());
        assert_eq!(h.controller.armed_timers(), 2);
    }

    #[test]
    fn test_continue_requires_full_idle_period_again() {
        let mut h = harness();
        h.advance_secs(IDLE - LEAD + 20);
        h.continue_session();

        assert_eq!(h.controller.state(), Some(SessionState::Active));
        assert!(!h.presenter.last_view().visible);
        assert_eq!(h.presenter.notices(), vec![SESSION_EXTENDED.to_string()]);

        h.advance_secs(IDLE - LEAD - 1);
        assert_eq!(h.controller.state(), Some(SessionState::Active));
        h.advance_secs(1);
        assert_eq!(h.controller.state(), Some(SessionState::Warning));
        assert_eq!(h.controller.seconds_remaining(), Some(LEAD));
    }

    #[test]
    fn test_last_activity_comes_from_tracker() {
        let mut h = harness();
        h.advance_secs(40);
        h.bus.emit(ActivityKind::Scroll);
        let stamped = h.scheduler.now();

        // Deadlines follow the tracker as soon as the event is applied
        h.controller.pump();
        assert_eq!(h.controller.last_activity(), Some(stamped));
        assert_eq!(
            h.controller.warning_deadline(),
            Some(stamped + Duration::from_secs(IDLE - LEAD))
        );

        h.advance_secs(IDLE - LEAD);
        h.continue_session();
        assert_eq!(h.controller.last_activity(), Some(h.scheduler.now()));
    }

    #[test]
    fn test_continue_outside_warning_is_ignored() {
        let mut h = harness();
        h.advance_secs(10);
        let before = h.controller.last_activity();
        h.continue_session();
        assert_eq!(h.controller.last_activity(), before);
        assert!(h.presenter.notices().is_empty());
    }

    #[test]
    fn test_logout_now() {
        let mut h = harness();
        h.advance_secs(IDLE - LEAD + 3);
        h.logout_now();

        assert_eq!(h.controller.termination(), Some(TerminationReason::UserLogout));
        assert!(!h.store.is_authenticated());
        assert_eq!(h.navigator.reasons(), vec![TerminationReason::UserLogout]);
    }

    #[test]
    fn test_expired_token_at_start() {
        let h = Harness::builder().token_valid_for(-1).start().unwrap();

        assert_eq!(h.controller.state(), Some(SessionState::Terminated));
        assert_eq!(h.controller.termination(), Some(TerminationReason::TokenExpired));
        assert_eq!(h.scheduler.armed(), 0);
        assert_eq!(h.bus.active_subscriptions(), 0);
        assert!(h.presenter.views().is_empty());
        assert!(!h.store.is_authenticated());
        assert_eq!(h.navigator.count(), 1);
    }

    #[test]
    fn test_token_expiring_exactly_now_counts_as_expired() {
        let h = Harness::builder().token_valid_for(0).start().unwrap();
        assert_eq!(h.controller.termination(), Some(TerminationReason::TokenExpired));
    }

    #[test]
    fn test_unreadable_token_at_start() {
        let h = Harness::builder().raw_token("garbage").start().unwrap();
        assert_eq!(h.controller.termination(), Some(TerminationReason::TokenExpired));
        assert_eq!(h.scheduler.armed(), 0);
        assert!(!h.store.is_authenticated());
    }

    #[test]
    fn test_activity_with_expired_token_terminates() {
        let mut h = Harness::builder().token_valid_for(100).start().unwrap();
        h.advance_secs(150);
        assert_eq!(h.controller.state(), Some(SessionState::Active));

        h.activity(ActivityKind::KeyDown);
        assert_eq!(h.controller.termination(), Some(TerminationReason::TokenExpired));
        assert_eq!(h.scheduler.armed(), 0);
    }

    #[test]
    fn test_inert_without_session() {
        let mut h = Harness::builder().logged_out().start().unwrap();
        assert_eq!(h.controller.state(), None);
        assert_eq!(h.scheduler.armed(), 0);
        assert_eq!(h.bus.active_subscriptions(), 0);

        h.advance_secs(IDLE * 2);
        h.activity(ActivityKind::Click);
        assert_eq!(h.controller.state(), None);
        assert_eq!(h.navigator.count(), 0);
        assert_eq!(h.store.clears(), 0);
    }

    #[test]
    fn test_stale_timer_events_are_discarded() {
        let mut h = harness();
        h.controller.handle(SessionEvent::WarningDue { generation: 0 });
        h.controller.handle(SessionEvent::LogoutDue { generation: 0 });
        assert_eq!(h.controller.state(), Some(SessionState::Active));
    }

    #[test]
    fn test_logout_timer_backstops_starved_ticks() {
        let config = SessionConfig {
            tick_interval_ms: 60_000,
            ..SessionConfig::default()
        };
        let mut h = Harness::builder().config(config).start().unwrap();
        h.advance_secs(IDLE);
        assert_eq!(h.controller.termination(), Some(TerminationReason::IdleTimeout));
    }

    #[test]
    fn test_remote_failure_does_not_block_logout() {
        let mut h = Harness::builder().failing_remote().start().unwrap();
        h.advance_secs(IDLE);
        assert_eq!(h.controller.state(), Some(SessionState::Terminated));
        assert_eq!(h.remote.calls(), 1);
        assert!(!h.store.is_authenticated());
        assert_eq!(h.navigator.count(), 1);
    }

    #[test]
    fn test_teardown_releases_without_logout() {
        let mut h = harness();
        h.advance_secs(IDLE - LEAD + 1);
        h.controller.teardown();

        assert_eq!(h.controller.state(), Some(SessionState::Terminated));
        assert_eq!(h.controller.termination(), Some(TerminationReason::Teardown));
        assert_eq!(h.scheduler.armed(), 0);
        assert_eq!(h.bus.active_subscriptions(), 0);
        assert!(!h.presenter.last_view().visible);
        assert!(h.store.is_authenticated());
        assert_eq!(h.navigator.count(), 0);

        h.controller.teardown();
        assert_eq!(h.store.clears(), 0);
    }

    #[test]
    fn test_teardown_with_logout() {
        let config = SessionConfig {
            logout_on_teardown: true,
            ..SessionConfig::default()
        };
        let mut h = Harness::builder().config(config).start().unwrap();
        h.controller.teardown();

        assert!(!h.store.is_authenticated());
        assert_eq!(h.navigator.reasons(), vec![TerminationReason::Teardown]);
    }

    #[test]
    fn test_drop_releases_everything() {
        let h = harness();
        let scheduler = h.scheduler.clone();
        let bus = h.bus.clone();
        drop(h);
        assert_eq!(scheduler.armed(), 0);
        assert_eq!(bus.active_subscriptions(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SessionConfig {
            warning_lead_secs: IDLE,
            ..SessionConfig::default()
        };
        assert!(Harness::builder().config(config).start().is_err());
    }

    #[test]
    fn test_oversized_timeout_is_rejected_not_panicked() {
        let config = SessionConfig {
            idle_timeout_secs: u64::MAX,
            ..SessionConfig::default()
        };
        assert!(Harness::builder().config(config).start().is_err());
    }

    #[test]
    fn test_longest_timeout_arms_normally() {
        let config = SessionConfig {
            idle_timeout_secs: vigil_core::config::MAX_IDLE_TIMEOUT_SECS,
            ..SessionConfig::default()
        };
        let mut h = Harness::builder()
            .config(config.clone())
            .token_valid_for(7 * 24 * 60 * 60)
            .start()
            .unwrap();
        let last = h.controller.last_activity().unwrap();
        assert_eq!(
            h.controller.logout_deadline(),
            Some(last + config.idle_timeout())
        );

        h.advance(config.warning_delay());
        assert_eq!(h.controller.state(), Some(SessionState::Warning));
        assert_eq!(h.controller.seconds_remaining(), Some(LEAD));
    }

    #[tokio::test]
    async fn test_run_returns_reason() {
        let mut h = harness();
        h.intents().logout_now();
        let reason = h.controller.run().await;
        assert_eq!(reason, Some(TerminationReason::UserLogout));
    }

    proptest! {
        #[test]
        fn prop_last_activity_tracks_latest_event(gaps in prop::collection::vec(1u64..IDLE - LEAD, 1..20)) {
            let mut h = harness();
            for gap in gaps {
                h.advance_secs(gap);
                h.activity(ActivityKind::KeyDown);

                let now = h.scheduler.now();
                prop_assert_eq!(h.controller.state(), Some(SessionState::Active));
                prop_assert_eq!(h.controller.last_activity(), Some(now));
                prop_assert_eq!(
                    h.controller.warning_deadline(),
                    Some(now + Duration::from_secs(IDLE - LEAD))
                );
                prop_assert_eq!(
                    h.controller.logout_deadline(),
                    Some(now + Duration::from_secs(IDLE))
                );
                prop_assert_eq!(h.scheduler.armed(), 2);
            }
        }
    }
}
