//! Application state and event handling

mod config;
mod session;
mod state;

pub use config::{ConfigError, TuiConfig};
pub use session::{activity_for, SessionView, SharedSessionView, TuiNavigator, TuiPresenter};
pub use state::{AppState, Identity, Screen, SessionStatus};

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures::StreamExt;
use ratatui::prelude::*;
use tracing::debug;

use vigil_core::{Clock, SystemClock, TerminationReason};
use vigil_session::{
    ActivityBus, FileSessionStore, IdleSessionController, SessionDeps, SessionIntents,
    TokioScheduler, SESSION_EXTENDED,
};

use crate::remote::HttpRemoteLogout;
use crate::ui;
use crate::ui::components::notification::Notification;

/// How often the screen is redrawn without input
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// How long to wait for the logout request on exit
const LOGOUT_FLUSH_LIMIT: Duration = Duration::from_secs(3);

/// Main application struct
pub struct App {
    /// Application state
    pub state: AppState,

    /// Whether the app should quit
    pub should_quit: bool,

    controller: IdleSessionController,
    bus: Arc<ActivityBus>,
    clock: Arc<dyn Clock>,
    view: SharedSessionView,
    intents: SessionIntents,
    remote: Option<Arc<HttpRemoteLogout>>,
}

impl App {
    /// Build the app against the configured store and server
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: &TuiConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileSessionStore::open(config.resolved_store_path()?)?);
        let identity = Identity::from_store(store.as_ref());
        let remote = Arc::new(HttpRemoteLogout::new(config.logout_url())?);
        let scheduler = Arc::new(TokioScheduler::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let bus = Arc::new(ActivityBus::new());
        let view = SharedSessionView::default();

        let controller = IdleSessionController::start(SessionDeps {
            config: config.session.clone(),
            clock: Arc::clone(&clock),
            scheduler,
            source: bus.clone(),
            store,
            remote: remote.clone(),
            navigator: Arc::new(TuiNavigator::new(view.clone())),
            presenter: Box::new(TuiPresenter::new(view.clone())),
        })?;

        let mut app = Self::assemble(controller, bus, clock, view, identity);
        app.remote = Some(remote);
        Ok(app)
    }

    /// Wrap an already started controller
    ///
    /// `bus` must be the controller's activity source, and `view` the one
    /// its presenter and navigator write to.
    pub fn assemble(
        controller: IdleSessionController,
        bus: Arc<ActivityBus>,
        clock: Arc<dyn Clock>,
        view: SharedSessionView,
        identity: Option<Identity>,
    ) -> Self {
        let intents = controller.intents();
        let mut app = Self {
            state: AppState::new(identity),
            should_quit: false,
            controller,
            bus,
            clock,
            view,
            intents,
            remote: None,
        };
        app.sync();
        app
    }

    /// Run the application main loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut redraw = tokio::time::interval(REDRAW_INTERVAL);

        while !self.should_quit {
            terminal.draw(|frame| ui::render(frame, &self.state))?;

            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => return Err(e.into()),
                    None => self.should_quit = true,
                },
                Some(event) = self.controller.next_event() => {
                    self.controller.handle(event);
                }
                _ = redraw.tick() => self.state.on_tick(),
            }

            self.process_session_events();
        }

        Ok(())
    }

    /// Release the session and wait briefly for any logout request
    pub async fn shutdown(&mut self) {
        self.controller.teardown();
        if let Some(remote) = &self.remote {
            remote.flush(LOGOUT_FLUSH_LIMIT).await;
        }
    }

    /// Feed one terminal event through key handling and activity tracking
    ///
    /// Keys are handled first so a dialog choice reaches the controller
    /// before the keypress itself re-arms the idle timers.
    pub fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code);
            }
        }

        if let Some(kind) = activity_for(&event) {
            self.bus.emit(kind);
        }
    }

    /// Apply queued session events and refresh the view
    pub fn process_session_events(&mut self) {
        self.controller.pump();
        self.sync();
    }

    /// Handle key press events
    fn handle_key(&mut self, key: KeyCode) {
        match self.state.current_screen {
            Screen::Dashboard if self.state.warning.visible => self.handle_warning_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::SignedOut => self.handle_signed_out_key(key),
        }
    }

    fn handle_warning_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Enter => {
                self.intents.continue_session();
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.intents.logout_now();
            }
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.intents.logout_now();
            }
            _ => {}
        }
    }

    fn handle_signed_out_key(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
            self.should_quit = true;
        }
    }

    /// Copy what the session layer produced into app state
    fn sync(&mut self) {
        let (warning, notices, signed_out) = {
            let mut view = self.view.lock();
            (view.warning, std::mem::take(&mut view.notices), view.signed_out)
        };

        for notice in notices {
            self.state.notifications.push(notification_for(&notice));
        }

        if let Some(reason) = signed_out {
            if self.state.current_screen != Screen::SignedOut {
                debug!("Leaving dashboard: {}", reason);
                self.state.sign_out(Some(reason));
            }
            return;
        }

        self.state.warning = warning;
        self.state.session = SessionStatus {
            state: self.controller.state(),
            warning_in: self
                .controller
                .warning_deadline()
                .map(|at| at.saturating_duration_since(self.clock.now()).as_secs()),
            seconds_remaining: self.controller.seconds_remaining(),
        };

        if self.controller.termination() == Some(TerminationReason::Teardown) {
            self.state.sign_out(None);
        }
    }
}

fn notification_for(message: &str) -> Notification {
    if message == SESSION_EXTENDED {
        Notification::success(message)
    } else {
        Notification::warning(message)
    }
}
