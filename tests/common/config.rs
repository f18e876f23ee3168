//! Test configuration helpers pointing a pipeline at mock servers

use limiteds_catalog::{Config, ThrottleConfig};
use tempfile::TempDir;
use wiremock::MockServer;

use super::fixtures::{MARKET_PATH, THUMBNAIL_PATH};

/// Build a config whose endpoints point at `server` and whose output root is
/// a fresh temp directory (keep the `TempDir` alive for the test duration)
pub fn mock_config(server: &MockServer) -> (Config, TempDir) {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let mut config = Config::with_root(temp_dir.path().join("public"));
    config.endpoints.market_url = format!("{}{}", server.uri(), MARKET_PATH);
    config.endpoints.thumbnail_url = format!("{}{}", server.uri(), THUMBNAIL_PATH);
    config.throttle = ThrottleConfig::None;
    (config, temp_dir)
}

/// Whether live API tests should run (requires the `live-tests` feature)
pub fn live_tests_enabled() -> bool {
    cfg!(feature = "live-tests")
}
