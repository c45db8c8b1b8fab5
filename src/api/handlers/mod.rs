mod admin;
mod counter;
mod users;

use crate::api::response::ApiError;
use crate::storage::StoreError;

pub use admin::{health, version};
pub use counter::{get_counter, increment_counter, reset_counter};
pub use users::{change_password, login, register};

/// Run storage work (engine I/O, bcrypt) off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "Blocking storage task failed");
        ApiError::internal("Internal error")
    })
}

/// Map a StoreError to an ApiError
fn store_error(e: StoreError, context: &str) -> ApiError {
    match e {
        StoreError::AlreadyExists => ApiError::conflict("User already exists"),
        StoreError::NotFound => ApiError::not_found("User not found"),
        e if e.is_validation() => ApiError::bad_request(e.to_string()),
        e => {
            tracing::error!(error = %e, "{context}");
            ApiError::internal(context)
        }
    }
}
