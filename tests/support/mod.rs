// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, a mock SSH connector, an in-memory filesystem, and key fixtures.

use std::path::PathBuf;
use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod memory_fs;
#[allow(dead_code)]
pub mod mock;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("skiff=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Path to a file under tests/fixtures.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Unencrypted ed25519 key.
#[allow(dead_code)]
pub fn test_key() -> PathBuf {
    fixture("test_key")
}

/// Ed25519 key encrypted with [`ENCRYPTED_KEY_PASSPHRASE`].
#[allow(dead_code)]
pub fn encrypted_key() -> PathBuf {
    fixture("encrypted_key")
}

#[allow(dead_code)]
pub const ENCRYPTED_KEY_PASSPHRASE: &str = "hunter2";
