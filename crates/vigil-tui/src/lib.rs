//! Vigil TUI Library
//!
//! Terminal front end for the idle-session manager: a dashboard with a live
//! session status bar, the expiry warning dialog, and the HTTP logout notice.

pub mod app;
pub mod commands;
pub mod remote;
pub mod ui;
pub mod utils;

pub use app::App;
