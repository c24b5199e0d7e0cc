//! Vigil Session - idle-session lifecycle management
//!
//! This crate provides:
//! - An idle-session controller (Active / Warning / Terminated state machine)
//! - Activity tracking over any `Subscribable` event source
//! - Exactly-once logout coordination (remote notice, storage clear, navigation)
//! - Virtual-time and tokio-backed schedulers
//! - In-memory and file-backed session stores

pub mod bus;
pub mod controller;
pub mod coordinator;
pub mod event;
pub mod scheduler;
pub mod store;
pub mod tracker;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bus::ActivityBus;
pub use controller::{IdleSessionController, SessionDeps, SESSION_EXTENDED};
pub use coordinator::LogoutCoordinator;
pub use event::{SessionEvent, SessionIntents};
pub use scheduler::{ManualScheduler, TokioScheduler};
pub use store::{FileSessionStore, MemorySessionStore};
pub use tracker::{ActivityCallback, ActivityTracker};
