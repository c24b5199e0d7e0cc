//! Screen implementations

pub mod dashboard;
pub mod signed_out;
