//! Infrastructure Layer
//!
//! Token signing, revocation caches and repository implementations.

pub mod jwt;
pub mod memory;
pub mod moka;
pub mod postgres;

pub use jwt::{IssuedToken, JwtTokenCodec};
pub use memory::InMemoryEmployeeRepository;
pub use moka::MokaRevocationStore;
pub use postgres::PgAuthRepository;
