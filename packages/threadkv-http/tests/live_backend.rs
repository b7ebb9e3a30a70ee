//! Conformance run against a real board backend. Skipped unless
//! `THREADKV_TEST_BASE_URL` (plus credentials) is set, mirroring how the
//! adapter is exercised in CI against a disposable board.

use threadkv_http::{Config, HttpNodeStore};

fn config_from_env() -> Option<Config> {
    let base_url = std::env::var("THREADKV_TEST_BASE_URL").ok()?;
    Some(Config {
        base_url,
        client_id: std::env::var("THREADKV_TEST_CLIENT_ID").unwrap_or_default(),
        client_secret: std::env::var("THREADKV_TEST_CLIENT_SECRET").unwrap_or_default(),
        username: std::env::var("THREADKV_TEST_USERNAME").unwrap_or_default(),
        password: std::env::var("THREADKV_TEST_PASSWORD").unwrap_or_default(),
        board: std::env::var("THREADKV_TEST_BOARD").unwrap_or_else(|_| "conformance".into()),
        access_token: None,
        token_expiry: None,
    })
}

#[test]
fn http_backend_passes_the_conformance_suite() {
    let Some(config) = config_from_env() else {
        return;
    };
    threadkv_test_support::run_conformance_suite(|| {
        HttpNodeStore::new(config.clone()).expect("build http store")
    });
}
