//! SQLite persistence

pub mod approval_repository;
pub mod manager;

pub use approval_repository::SqliteApprovalRepository;
pub use manager::{DbManager, SqliteConnection};
