//! One-shot commands: login, status, logout

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use vigil_core::{Navigator, SessionRecord, SessionStore, TerminationReason, TokenInspector};
use vigil_session::{FileSessionStore, LogoutCoordinator};

use crate::app::TuiConfig;
use crate::remote::HttpRemoteLogout;
use crate::utils::format_until;

/// How long `logout` waits for the server
const LOGOUT_WAIT: Duration = Duration::from_secs(5);

/// Optional profile fields supplied at login
#[derive(Debug, Default, Clone)]
pub struct LoginDetails {
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
    pub email: Option<String>,
}

/// Build the record to persist for `token`
///
/// Rejects tokens that are unreadable or already expired.
pub fn record_for_token(token: &str, details: LoginDetails) -> Result<SessionRecord> {
    let inspector = TokenInspector::new();
    let claims = inspector
        .decode(token)
        .context("Token could not be read")?;

    if claims.is_expired_at(Utc::now()) {
        bail!("Token has already expired");
    }

    Ok(SessionRecord {
        token: token.to_string(),
        user_id: details.user_id.unwrap_or_else(|| claims.sub.clone()),
        username: claims.sub,
        roles: claims.roles,
        customer_id: details.customer_id,
        email: details.email,
    })
}

/// Persist a session for `token`
pub fn login(config: &TuiConfig, token: &str, details: LoginDetails) -> Result<()> {
    let record = record_for_token(token, details)?;
    let store = FileSessionStore::open(config.resolved_store_path()?)?;
    store.insert(&record)?;

    println!("✓ Logged in as {}", record.username);
    println!("  Store: {}", store.path().display());
    Ok(())
}

/// Print the stored session
pub fn status(config: &TuiConfig) -> Result<()> {
    let store = FileSessionStore::open(config.resolved_store_path()?)?;
    if !store.is_authenticated() {
        println!("No active session");
        return Ok(());
    }

    let Some(token) = store.auth_token() else {
        println!("Session marker present but no token stored");
        return Ok(());
    };

    match TokenInspector::new().decode(&token) {
        Ok(claims) => {
            println!("Session:");
            println!("  User: {}", claims.sub);
            println!("  Roles: {}", claims.roles.join(", "));
            println!("  Admin: {}", claims.is_admin());
            println!("  Manager: {}", claims.is_manager());
            println!("  Customer: {}", claims.is_customer());
            match claims.expires_at() {
                Ok(at) => {
                    println!("  Expires: {} ({})", at, format_until(at, Utc::now()));
                }
                Err(e) => println!("  Expires: unreadable ({})", e),
            }
        }
        Err(e) => {
            println!("Stored token is unreadable: {}", e);
        }
    }

    println!(
        "\nIdle timeout: {}s (warning {}s before)",
        config.session.idle_timeout_secs, config.session.warning_lead_secs
    );
    Ok(())
}

/// Prints where the user ends up after a command-line logout
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn leave_session(&self, reason: TerminationReason) {
        println!("{}", reason.notice());
    }
}

/// End the stored session: notify the server, then clear local data
pub async fn logout(config: &TuiConfig) -> Result<()> {
    let store = Arc::new(FileSessionStore::open(config.resolved_store_path()?)?);
    if !store.is_authenticated() {
        println!("No active session");
        return Ok(());
    }

    let remote = Arc::new(HttpRemoteLogout::new(config.logout_url())?);
    let coordinator = LogoutCoordinator::new(store, remote.clone(), Arc::new(ConsoleNavigator));
    coordinator.terminate(TerminationReason::UserLogout);
    remote.flush(LOGOUT_WAIT).await;
    Ok(())
}
