//! Activity tracking

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace};

use vigil_core::{ActivityKind, Clock, Subscribable, SubscriptionToken};

/// Callback receiving each qualifying interaction and when it happened
pub type ActivityCallback = Arc<dyn Fn(ActivityKind, Instant) + Send + Sync>;

/// Listens to every tracked activity kind on an event source
///
/// Records the time of the latest interaction and forwards each one to the
/// callback given at `start`. Starting twice does not double-subscribe and
/// stopping releases every subscription.
pub struct ActivityTracker {
    source: Arc<dyn Subscribable>,
    clock: Arc<dyn Clock>,
    tokens: Vec<SubscriptionToken>,
    last: Arc<Mutex<Option<Instant>>>,
}

impl ActivityTracker {
    pub fn new(source: Arc<dyn Subscribable>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            tokens: Vec::new(),
            last: Arc::new(Mutex::new(None)),
        }
    }

    /// Subscribe to all tracked kinds
    pub fn start(&mut self, on_activity: ActivityCallback) {
        if self.is_started() {
            return;
        }

        for kind in ActivityKind::TRACKED {
            let clock = Arc::clone(&self.clock);
            let last = Arc::clone(&self.last);
            let on_activity = Arc::clone(&on_activity);
            let token = self.source.subscribe(
                kind,
                Arc::new(move |kind| {
                    let at = clock.now();
                    trace!("Activity: {}", kind);
                    advance(&last, at);
                    on_activity(kind, at);
                }),
            );
            self.tokens.push(token);
        }
        debug!("Activity tracking started ({} listeners)", self.tokens.len());
    }

    /// Release every subscription
    pub fn stop(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        for token in self.tokens.drain(..) {
            self.source.unsubscribe(token);
        }
        debug!("Activity tracking stopped");
    }

    pub fn is_started(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Time of the most recent qualifying interaction
    pub fn last_activity(&self) -> Option<Instant> {
        *self.last.lock()
    }

    /// Count `at` as an interaction that did not come from the source
    ///
    /// Never moves the recorded time backwards.
    pub fn record(&self, at: Instant) {
        advance(&self.last, at);
    }
}

fn advance(last: &Mutex<Option<Instant>>, at: Instant) {
    let mut last = last.lock();
    if last.map_or(true, |prev| at > prev) {
        *last = Some(at);
    }
}

impl Drop for ActivityTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
