//! In-process adapters used when no database is configured and in tests.
//!
//! State lives behind `RwLock`s; a poisoned lock surfaces as a query error
//! rather than a panic.

mod token_repository;
mod user_repository;

pub use token_repository::InMemoryTokenRepository;
pub use user_repository::InMemoryUserRepository;
