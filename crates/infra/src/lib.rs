//! # PASS IAE Infrastructure
//!
//! Infrastructure implementations of the notification ports.
//!
//! This crate contains:
//! - SQLite persistence for approvals and job seeker profiles
//! - The France Travail partner API client and its OAuth credential cache
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `passiae-core`
//! - Contains all "impure" code (network, database, files)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;
pub mod provider;

pub use database::{DbManager, SqliteApprovalRepository};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
pub use provider::{CredentialCache, OAuthTokenEndpoint, PeApiHttpClient};
