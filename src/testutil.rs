//! Shared test helpers, available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use tempfile::TempDir;

use crate::config::{AuthConfig, Config, ServerConfig, TokenConfig};
use crate::storage::Store;
use crate::tokens::PasswordHasher;
use crate::AppState;

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(TEST_BCRYPT_COST)
}

/// Open a fresh redb-backed store in a temporary directory.
///
/// Returns both the `Store` and the `TempDir` guard; the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path(), test_hasher()).unwrap();
    (store, temp_dir)
}

/// A minimal `Config` suitable for unit tests.
pub fn test_config() -> Config {
    Config {
        auth: AuthConfig {
            admin_password: "admin123".to_string(),
            bcrypt_cost: TEST_BCRYPT_COST,
        },
        server: ServerConfig {
            bind_address: "127.0.0.1:8080".to_string(),
            data_dir: "/tmp/test".to_string(),
        },
        tokens: TokenConfig {
            signing_key: "test_secret".to_string(),
            ..Default::default()
        },
    }
}

/// Build a full `Arc<AppState>` around an in-memory store with an `admin`
/// account (password from [`test_config`]) already provisioned.
pub fn test_state() -> Arc<AppState> {
    let config = test_config();
    let store = Store::in_memory(test_hasher());
    crate::provision_admin(&store, &config.auth.admin_password).unwrap();
    Arc::new(AppState::new(config, store))
}
