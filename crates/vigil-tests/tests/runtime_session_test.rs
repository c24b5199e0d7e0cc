//! Session lifecycle on the tokio runtime
//!
//! Same controller, real timer tasks. Time is paused so the runtime
//! jumps straight to each deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, Instant};

use vigil_core::{ActivityKind, SessionConfig, SessionStore, TerminationReason};
use vigil_session::testing::{
    session_record, token_expiring_at, CountingRemoteLogout, RecordingNavigator,
    RecordingPresenter,
};
use vigil_session::{
    ActivityBus, IdleSessionController, MemorySessionStore, SessionDeps, TokioScheduler,
    SESSION_EXTENDED,
};

struct Session {
    controller: IdleSessionController,
    scheduler: Arc<TokioScheduler>,
    bus: Arc<ActivityBus>,
    store: Arc<MemorySessionStore>,
    remote: Arc<CountingRemoteLogout>,
    presenter: RecordingPresenter,
}

fn start_session() -> Session {
    let scheduler = Arc::new(TokioScheduler::new());
    let bus = Arc::new(ActivityBus::new());
    let store = Arc::new(MemorySessionStore::new());
    let remote = Arc::new(CountingRemoteLogout::new());
    let presenter = RecordingPresenter::new();

    let exp = Utc::now().timestamp() + 24 * 60 * 60;
    store.insert(&session_record(token_expiring_at(exp))).unwrap();

    let controller = IdleSessionController::start(SessionDeps {
        config: SessionConfig::default(),
        clock: scheduler.clone(),
        scheduler: scheduler.clone(),
        source: bus.clone(),
        store: store.clone(),
        remote: remote.clone(),
        navigator: Arc::new(RecordingNavigator::new()),
        presenter: Box::new(presenter.clone()),
    })
    .unwrap();

    Session {
        controller,
        scheduler,
        bus,
        store,
        remote,
        presenter,
    }
}

fn assert_secs(elapsed: Duration, secs: u64) {
    assert!(
        elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs + 1),
        "ended after {:?}, expected {}s",
        elapsed,
        secs
    );
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_ends_after_timeout() {
    let mut s = start_session();
    let started = Instant::now();

    let reason = s.controller.run().await;

    assert_eq!(reason, Some(TerminationReason::IdleTimeout));
    assert_secs(started.elapsed(), 300);
    assert!(!s.store.is_authenticated());
    assert_eq!(s.remote.calls(), 1);

    let countdown = s.presenter.views().iter().filter(|v| v.visible).count();
    assert!(countdown >= 29, "only {} countdown frames", countdown);

    // Give aborted timer tasks a chance to be reaped
    tokio::task::yield_now().await;
    assert_eq!(s.scheduler.armed(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_activity_defers_timeout() {
    let mut s = start_session();
    let started = Instant::now();
    let bus = s.bus.clone();

    let (reason, _) = tokio::join!(s.controller.run(), async move {
        time::sleep(Duration::from_secs(200)).await;
        bus.emit(ActivityKind::KeyDown);
    });

    assert_eq!(reason, Some(TerminationReason::IdleTimeout));
    assert_secs(started.elapsed(), 500);
}

#[tokio::test(start_paused = true)]
async fn test_continue_from_warning() {
    let mut s = start_session();
    let started = Instant::now();
    let intents = s.controller.intents();

    let (reason, _) = tokio::join!(s.controller.run(), async move {
        time::sleep(Duration::from_secs(280)).await;
        intents.continue_session();
    });

    assert_eq!(reason, Some(TerminationReason::IdleTimeout));
    assert_secs(started.elapsed(), 580);
    assert!(s
        .presenter
        .notices()
        .contains(&SESSION_EXTENDED.to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_logout_now_stops_run() {
    let mut s = start_session();
    let intents = s.controller.intents();

    let (reason, _) = tokio::join!(s.controller.run(), async move {
        time::sleep(Duration::from_secs(10)).await;
        intents.logout_now();
    });

    assert_eq!(reason, Some(TerminationReason::UserLogout));
    assert!(s.store.auth_token().is_none());
    assert_eq!(s.remote.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_aborts_timer_tasks() {
    let mut s = start_session();
    assert_eq!(s.scheduler.armed(), 2);

    s.controller.teardown();
    assert_eq!(s.scheduler.armed(), 0);

    time::sleep(Duration::from_secs(600)).await;
    assert_eq!(s.controller.pump(), 0);
    assert!(s.store.is_authenticated());
    assert_eq!(s.remote.calls(), 0);
}
