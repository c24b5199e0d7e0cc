//! Bearer-token claim inspection
//!
//! Tokens are compact three-part structures (`header.payload.signature`).
//! Only the payload is read; signatures are the server's business. Any
//! failure to read the claims is treated the same as an expired token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role names recognised by the portal
pub mod roles {
    pub const ADMIN: &str = "ROLE_ADMIN";
    pub const MANAGER: &str = "ROLE_MANAGER";
    pub const CUSTOMER_MANAGER: &str = "ROLE_CUSTOMER_MANAGER";
    pub const CUSTOMER: &str = "ROLE_CUSTOMER";
    pub const USER: &str = "ROLE_USER";
}

/// Why a token's claims could not be read
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token must have 3 parts, found {0}")]
    Malformed(usize),

    #[error("payload is not valid base64url: {0}")]
    Base64(String),

    #[error("payload is not valid claims JSON: {0}")]
    Json(String),

    #[error("timestamp out of range: {0}")]
    Timestamp(i64),
}

/// Claims carried in a token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    #[serde(default)]
    pub sub: String,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued-at, seconds since epoch
    #[serde(default)]
    pub iat: i64,

    /// Expiry, seconds since epoch
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Result<DateTime<Utc>, DecodeError> {
        timestamp(self.exp)
    }

    pub fn issued_at(&self) -> Result<DateTime<Utc>, DecodeError> {
        timestamp(self.iat)
    }

    /// Whether the expiry instant is at or before `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Ok(exp) => exp <= now,
            Err(_) => true,
        }
    }

    /// Time left before expiry, zero once expired
    pub fn time_to_expiry(&self, now: DateTime<Utc>) -> Duration {
        match self.expires_at() {
            Ok(exp) if exp > now => exp - now,
            _ => Duration::zero(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, wanted: &[&str]) -> bool {
        wanted.iter().any(|role| self.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(roles::ADMIN)
    }

    pub fn is_manager(&self) -> bool {
        self.has_any_role(&[roles::MANAGER, roles::CUSTOMER_MANAGER])
    }

    pub fn is_customer(&self) -> bool {
        self.has_any_role(&[roles::CUSTOMER, roles::USER])
    }

    pub fn is_manager_or_admin(&self) -> bool {
        self.has_any_role(&[roles::ADMIN, roles::MANAGER, roles::CUSTOMER_MANAGER])
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, DecodeError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or(DecodeError::Timestamp(secs))
}

/// Reads claims out of bearer tokens. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenInspector;

impl TokenInspector {
    pub fn new() -> Self {
        Self
    }

    /// Decode the payload claims of `token`
    pub fn decode(&self, token: &str) -> Result<Claims, DecodeError> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(DecodeError::Malformed(parts.len()));
        }

        // Accept padded payloads and the standard alphabet as well
        let payload: String = parts[1]
            .trim_end_matches('=')
            .chars()
            .map(|c| match c {
                '+' => '-',
                '/' => '_',
                other => other,
            })
            .collect();

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.as_bytes())
            .map_err(|e| DecodeError::Base64(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))
    }

    /// True if the token cannot be decoded or its expiry is at or before `now`
    pub fn is_expired(&self, token: &str, now: DateTime<Utc>) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.is_expired_at(now),
            Err(_) => true,
        }
    }

    /// Expiry instant of `token`, if it can be read
    pub fn expires_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.decode(token).ok()?.expires_at().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000;

    fn token_with(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(payload.as_bytes())
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(NOW, 0).unwrap()
    }

    #[test]
    fn test_decode_claims() {
        let token = token_with(r#"{"sub":"alice","roles":["ROLE_ADMIN"],"iat":1699990000,"exp":1700003600}"#);
        let claims = TokenInspector::new().decode(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.roles, vec!["ROLE_ADMIN".to_string()]);
        assert_eq!(claims.exp, 1_700_003_600);
        assert!(claims.is_admin());
        assert!(claims.is_manager_or_admin());
        assert!(!claims.is_customer());
    }

    #[test]
    fn test_expiry_boundary() {
        let inspector = TokenInspector::new();
        let at_now = token_with(&format!(r#"{{"sub":"a","roles":[],"iat":0,"exp":{}}}"#, NOW));
        let later = token_with(&format!(r#"{{"sub":"a","roles":[],"iat":0,"exp":{}}}"#, NOW + 1));

        assert!(inspector.is_expired(&at_now, now()));
        assert!(!inspector.is_expired(&later, now()));
    }

    #[test]
    fn test_missing_exp_is_expired() {
        let token = token_with(r#"{"sub":"a","roles":[]}"#);
        assert!(matches!(TokenInspector::new().decode(&token), Err(DecodeError::Json(_))));
        assert!(TokenInspector::new().is_expired(&token, now()));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        let inspector = TokenInspector::new();
        assert_eq!(inspector.decode("abc"), Err(DecodeError::Malformed(1)));
        assert!(inspector.is_expired("", now()));
        assert!(inspector.is_expired("a.!!!.c", now()));
        assert!(inspector.is_expired("a.b.c.d", now()));
    }

    #[test]
    fn test_padded_payload_accepted() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp": 1800000000}"#);
        assert!(payload.ends_with('='));
        let token = format!("h.{}.s", payload);
        assert_eq!(TokenInspector::new().decode(&token).unwrap().exp, 1_800_000_000);
    }

    #[test]
    fn test_roles_default_to_empty() {
        let token = token_with(r#"{"sub":"bob","exp":1800000000}"#);
        let claims = TokenInspector::new().decode(&token).unwrap();
        assert!(claims.roles.is_empty());
        assert!(!claims.is_manager());
    }

    #[test]
    fn test_customer_and_manager_roles() {
        let claims = Claims {
            sub: "c".to_string(),
            roles: vec![roles::USER.to_string(), roles::CUSTOMER_MANAGER.to_string()],
            iat: 0,
            exp: NOW,
        };
        assert!(claims.is_customer());
        assert!(claims.is_manager());
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_time_to_expiry() {
        let claims = Claims {
            sub: String::new(),
            roles: vec![],
            iat: 0,
            exp: NOW + 90,
        };
        assert_eq!(claims.time_to_expiry(now()), Duration::seconds(90));
        assert_eq!(
            claims.time_to_expiry(now() + Duration::seconds(120)),
            Duration::zero()
        );
    }

    proptest! {
        #[test]
        fn prop_decode_never_panics(input in ".*") {
            let _ = TokenInspector::new().decode(&input);
        }

        #[test]
        fn prop_undecodable_is_expired(input in "[^.]*") {
            prop_assert!(TokenInspector::new().is_expired(&input, now()));
        }
    }
}
