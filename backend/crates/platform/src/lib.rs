//! Platform Crate
//!
//! Protocol and crypto plumbing that carries no clinic rules: password
//! hashing, bearer header parsing, client addressing and the rate limit
//! store used in front of the credential endpoints.

pub mod bearer;
pub mod client;
pub mod crypto;
pub mod password;
pub mod rate_limit;
