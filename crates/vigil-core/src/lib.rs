//! Vigil Core - Shared types, token inspection, and capability traits
//!
//! This crate provides the foundational types for the Vigil idle-session
//! manager: the session state model, bearer-token claim inspection, session
//! configuration, and the traits through which the session controller talks
//! to time, input, storage, and the outside world.

pub mod clock;
pub mod config;
pub mod error;
pub mod navigation;
pub mod presenter;
pub mod remote;
pub mod scheduler;
pub mod source;
pub mod state;
pub mod store;
pub mod token;

pub use clock::{Clock, SystemClock};
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use navigation::Navigator;
pub use presenter::SessionPresenter;
pub use remote::{LogoutError, NoopRemoteLogout, RemoteLogout};
pub use scheduler::{OnceTask, RepeatingTask, Scheduler, TimerHandle};
pub use source::{ActivityHandler, ActivityKind, Subscribable, SubscriptionToken};
pub use state::{SessionState, TerminationReason, WarningView};
pub use store::{SessionRecord, SessionStore};
pub use token::{Claims, DecodeError, TokenInspector};

/// Default idle timeout in seconds (5 minutes)
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 5 * 60;

/// Default warning lead in seconds
pub const DEFAULT_WARNING_LEAD_SECS: u64 = 30;

/// Countdown tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 1000;
