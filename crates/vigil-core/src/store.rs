//! Persisted session data

use serde::{Deserialize, Serialize};

use crate::Result;

/// Keys under which session data is persisted
pub mod keys {
    /// `"true"` while a user is logged in
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    /// Bearer token
    pub const AUTH_TOKEN: &str = "authToken";
    pub const USER_ID: &str = "userId";
    pub const USERNAME: &str = "username";
    /// JSON array of role names
    pub const USER_ROLES: &str = "userRoles";
    pub const CUSTOMER_ID: &str = "customerId";
    pub const EMAIL: &str = "email";

    /// Every key that belongs to a session; cleared together
    pub const ALL: [&str; 7] = [
        IS_AUTHENTICATED,
        AUTH_TOKEN,
        USER_ID,
        USERNAME,
        USER_ROLES,
        CUSTOMER_ID,
        EMAIL,
    ];
}

/// Read/clear access to persisted session data
///
/// The session controller only ever reads and clears. Writing a session is
/// the login flow's job and lives on the concrete stores.
pub trait SessionStore: Send + Sync {
    /// Read a single value
    fn get(&self, key: &str) -> Option<String>;

    /// Remove every session key at once
    fn clear(&self) -> Result<()>;

    /// Whether the authenticated-session marker is present
    fn is_authenticated(&self) -> bool {
        self.get(keys::IS_AUTHENTICATED).as_deref() == Some("true")
    }

    /// The stored bearer token
    fn auth_token(&self) -> Option<String> {
        self.get(keys::AUTH_TOKEN)
    }
}

/// A complete logged-in session as written by the login flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub roles: Vec<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionRecord {
    /// Flatten into persisted key/value pairs
    pub fn to_entries(&self) -> Result<Vec<(&'static str, String)>> {
        let mut entries = vec![
            (keys::IS_AUTHENTICATED, "true".to_string()),
            (keys::AUTH_TOKEN, self.token.clone()),
            (keys::USER_ID, self.user_id.clone()),
            (keys::USERNAME, self.username.clone()),
            (keys::USER_ROLES, serde_json::to_string(&self.roles)?),
        ];
        if let Some(customer_id) = &self.customer_id {
            entries.push((keys::CUSTOMER_ID, customer_id.clone()));
        }
        if let Some(email) = &self.email {
            entries.push((keys::EMAIL, email.clone()));
        }
        Ok(entries)
    }
}
