//! Remote logout notification

use thiserror::Error;

/// Failure to notify the server of a logout
#[derive(Debug, Error)]
pub enum LogoutError {
    #[error("Logout request failed: {0}")]
    Request(String),

    #[error("Logout rejected with status {0}")]
    Status(u16),

    #[error("No async runtime available for logout request")]
    NoRuntime,
}

/// Best-effort server-side logout
///
/// Implementations must not block for the round trip; the outcome never
/// affects local termination.
pub trait RemoteLogout: Send + Sync {
    /// Tell the server the session identified by `token` is over
    fn notify(&self, token: Option<&str>) -> Result<(), LogoutError>;
}

/// Remote logout that does nothing, for offline use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRemoteLogout;

impl RemoteLogout for NoopRemoteLogout {
    fn notify(&self, _token: Option<&str>) -> Result<(), LogoutError> {
        Ok(())
    }
}
