//! Server-side logout over HTTP

use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use vigil_core::{LogoutError, RemoteLogout};

/// Upper bound on a single logout request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Posts to the portal's logout endpoint with the session's bearer token
///
/// `notify` only builds the request and spawns it; the response is logged
/// and otherwise ignored. Call [`HttpRemoteLogout::flush`] before exiting
/// to let in-flight requests finish.
pub struct HttpRemoteLogout {
    client: reqwest::Client,
    url: String,
    runtime: Handle,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpRemoteLogout {
    /// Create a notifier on the current tokio runtime
    pub fn new(url: impl Into<String>) -> Result<Self, LogoutError> {
        let runtime = Handle::try_current().map_err(|_| LogoutError::NoRuntime)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LogoutError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            runtime,
            in_flight: Mutex::new(Vec::new()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Build the logout request
    pub fn build_request(&self, token: Option<&str>) -> Result<reqwest::Request, LogoutError> {
        let mut request = self.client.post(&self.url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
            .build()
            .map_err(|e| LogoutError::Request(e.to_string()))
    }

    /// Wait for every spawned request, at most `limit` in total
    pub async fn flush(&self, limit: Duration) {
        let pending: Vec<_> = self.in_flight.lock().drain(..).collect();
        if pending.is_empty() {
            return;
        }

        debug!("Waiting for {} logout request(s)", pending.len());
        let all = futures::future::join_all(pending);
        if tokio::time::timeout(limit, all).await.is_err() {
            warn!("Logout request still pending after {:?}", limit);
        }
    }
}

impl RemoteLogout for HttpRemoteLogout {
    fn notify(&self, token: Option<&str>) -> Result<(), LogoutError> {
        let request = self.build_request(token)?;
        let client = self.client.clone();

        let join = self.runtime.spawn(async move {
            match client.execute(request).await {
                Ok(response) if response.status().is_success() => {
                    debug!("Server acknowledged logout");
                }
                Ok(response) => {
                    warn!("{}", LogoutError::Status(response.status().as_u16()));
                }
                Err(e) => {
                    warn!("{}", LogoutError::Request(e.to_string()));
                }
            }
        });

        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|j| !j.is_finished());
        in_flight.push(join);
        Ok(())
    }
}
