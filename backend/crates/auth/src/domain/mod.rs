//! Domain Layer
//!
//! Contains entities, value objects, the authorization policy and
//! repository traits.

pub mod entity;
pub mod policy;
pub mod principal;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{employee::Employee, identity::Identity};
pub use policy::AuthorizationPolicy;
pub use principal::Principal;
pub use repository::{EmployeeRepository, RevocationStore};
pub use token::{TokenClaims, TokenError};
