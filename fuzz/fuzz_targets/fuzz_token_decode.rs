#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use vigil_core::TokenInspector;

fuzz_target!(|data: &[u8]| {
    let Ok(token) = std::str::from_utf8(data) else {
        return;
    };
    let inspector = TokenInspector::new();
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    // Should not panic
    match inspector.decode(token) {
        Ok(claims) => {
            // A readable token is expired exactly when its claims say so
            assert_eq!(inspector.is_expired(token, now), claims.is_expired_at(now));
            let _ = claims.time_to_expiry(now);
            let _ = claims.is_manager_or_admin();
        }
        Err(_) => {
            // Unreadable tokens never count as valid
            assert!(inspector.is_expired(token, now));
            assert!(inspector.expires_at(token).is_none());
        }
    }
});
