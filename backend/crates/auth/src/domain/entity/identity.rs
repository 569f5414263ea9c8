//! Request-scoped Identity
//!
//! Established by the bearer-auth middleware and carried in the request's
//! extensions for the lifetime of that request only.

use crate::domain::value_object::{employee_id::EmployeeId, role::Permission, role::Role};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct Identity {
    pub employee_id: EmployeeId,
    pub email: String,
    pub role: Role,
    /// Resolved from the principal's current role, not from token claims
    pub authorities: Vec<String>,
    /// The bearer token that authenticated this request
    pub token: String,
}

impl Identity {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    /// Require a permission; a missing one is 403, never 401
    pub fn require(&self, permission: Permission) -> AuthResult<()> {
        if self.has_authority(permission.as_str()) {
            Ok(())
        } else {
            Err(AuthError::AccessDenied(permission.as_str().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            employee_id: EmployeeId::new(),
            email: "a@x.com".to_string(),
            role,
            authorities: role.authorities(),
            token: "t".to_string(),
        }
    }

    #[test]
    fn test_require_permission() {
        assert!(identity(Role::Admin).require(Permission::AdminDelete).is_ok());
        assert!(identity(Role::Manager).require(Permission::ManagerRead).is_ok());

        let denied = identity(Role::Client).require(Permission::AdminRead);
        assert!(matches!(denied, Err(AuthError::AccessDenied(p)) if p == "admin:read"));
    }

    #[test]
    fn test_role_authority() {
        assert!(identity(Role::Client).has_authority("ROLE_CLIENT"));
        assert!(!identity(Role::Client).has_authority("ROLE_ADMIN"));
    }
}
