mod counter;
pub mod db;
pub mod engine;
pub mod memory;
pub mod models;
mod store;
mod tables;
mod users;

pub use counter::{CounterRepository, COUNTER_KEY};
pub use db::Database;
pub use engine::{Engine, EngineError};
pub use memory::MemoryEngine;
pub use store::{Store, StoreError, WriteLock};
pub use tables::*;
pub use users::{user_key, UserRepository, USER_KEY_PREFIX};
