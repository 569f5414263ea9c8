//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use std::time::Duration;

use crate::domain::entity::employee::Employee;
use crate::domain::value_object::{email::Email, employee_id::EmployeeId};
use crate::error::AuthResult;

/// Employee (credential store) repository trait
#[trait_variant::make(EmployeeRepository: Send)]
pub trait LocalEmployeeRepository {
    /// Insert a new employee
    ///
    /// Fails with `EntityAlreadyExists` when the email is taken, even if a
    /// concurrent insert won the race after `exists_by_email` returned false.
    async fn create(&self, employee: &Employee) -> AuthResult<()>;

    async fn find_by_id(&self, id: &EmployeeId) -> AuthResult<Option<Employee>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Employee>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// All employees ordered by last name, then first name
    async fn list(&self) -> AuthResult<Vec<Employee>>;

    /// Persist mutable fields; `EntityNotFound` if the row is gone
    async fn update(&self, employee: &Employee) -> AuthResult<()>;

    /// Returns whether a row was removed
    async fn delete(&self, id: &EmployeeId) -> AuthResult<bool>;
}

/// Revocation cache: principal key -> most recently revoked token
#[trait_variant::make(RevocationStore: Send)]
pub trait LocalRevocationStore {
    /// Store `token` under `key` for `ttl`, replacing any previous entry
    async fn put(&self, key: &str, token: &str, ttl: Duration) -> AuthResult<()>;

    /// Live entry for `key`, if any
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;
}

/// Revocation key for an employee
pub fn revocation_key(id: &EmployeeId) -> String {
    format!("employee:{id}")
}
