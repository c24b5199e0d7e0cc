//! Reusable UI components

pub mod notification;
pub mod status_bar;
pub mod warning;
