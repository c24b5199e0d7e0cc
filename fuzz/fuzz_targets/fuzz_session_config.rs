#![no_main]

use libfuzzer_sys::fuzz_target;
use vigil_core::SessionConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<SessionConfig>(data) {
        if config.validate().is_ok() {
            // Valid timings always leave room for a warning
            assert!(config.warning_lead() < config.idle_timeout());
            assert!(!config.tick_interval().is_zero());
            assert_eq!(
                config.warning_delay() + config.warning_lead(),
                config.idle_timeout()
            );
        }
    }
});
