//! User-interaction event sources

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Kinds of user interaction that count as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    KeyDown,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    /// The fixed set of kinds a tracker listens for
    pub const TRACKED: [ActivityKind; 5] = [
        ActivityKind::PointerDown,
        ActivityKind::KeyDown,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
    ];

    /// DOM event name for this kind
    pub fn event_name(&self) -> &'static str {
        match self {
            ActivityKind::PointerDown => "mousedown",
            ActivityKind::KeyDown => "keydown",
            ActivityKind::Scroll => "scroll",
            ActivityKind::TouchStart => "touchstart",
            ActivityKind::Click => "click",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Callback invoked for each qualifying event
pub type ActivityHandler = Arc<dyn Fn(ActivityKind) + Send + Sync>;

/// Token returned by `subscribe`, needed to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Something that emits user-interaction events
pub trait Subscribable: Send + Sync {
    /// Attach `handler` for events of `kind`
    fn subscribe(&self, kind: ActivityKind, handler: ActivityHandler) -> SubscriptionToken;

    /// Detach a handler; unknown tokens are ignored
    fn unsubscribe(&self, token: SubscriptionToken);
}
