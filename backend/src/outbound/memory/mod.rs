//! In-process adapters for running without PostgreSQL.

mod in_memory_account_repository;
mod in_memory_avatar_store;

pub use in_memory_account_repository::InMemoryAccountRepository;
pub use in_memory_avatar_store::InMemoryAvatarStore;
