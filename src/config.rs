/// Application-level constants
pub const ENGINE_NAME: &str = "Slotwise";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,slotwise=debug".to_string()
}

/// Base URL of the external routing service, if one is configured.
/// Unset means slot generation runs on the great-circle heuristic.
pub fn mapping_service_url() -> Option<String> {
    std::env::var("MAPPING_SERVICE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_name_is_slotwise() {
        assert_eq!(ENGINE_NAME, "Slotwise");
    }

    #[test]
    fn engine_version_matches_cargo() {
        assert_eq!(ENGINE_VERSION, "0.1.0");
    }

    #[test]
    fn default_filter_scopes_crate_logs() {
        assert!(default_log_filter().contains("slotwise"));
    }
}
