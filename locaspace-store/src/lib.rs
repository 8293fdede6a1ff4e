pub mod app_config;
pub mod error;
pub mod memory;
pub mod redis_repo;

pub use app_config::Config;
pub use error::StoreError;
pub use memory::InMemoryDraftStore;
pub use redis_repo::RedisDraftStore;
