//! France Travail partner API adapter

pub mod auth;
pub mod client;
pub mod errors;
mod payloads;

pub use auth::{BearerToken, CredentialCache, OAuthTokenEndpoint, TokenEndpoint, TokenGrant};
pub use client::PeApiHttpClient;
