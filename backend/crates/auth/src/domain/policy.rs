//! Authorization Policy
//!
//! Static Role -> permission mapping evaluated against the request identity.

use crate::domain::entity::identity::Identity;
use crate::domain::value_object::role::{Permission, Role};
use crate::error::AuthResult;

pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    /// Authorities granted to a role
    pub fn authorities_for(role: Role) -> Vec<String> {
        role.authorities()
    }

    /// Gate an endpoint on a permission
    pub fn check(identity: &Identity, permission: Permission) -> AuthResult<()> {
        let result = identity.require(permission);
        if result.is_err() {
            tracing::info!(
                employee_id = %identity.employee_id,
                role = %identity.role,
                required = %permission,
                "Access denied"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::employee_id::EmployeeId;
    use crate::error::AuthError;

    #[test]
    fn test_check() {
        let manager = Identity {
            employee_id: EmployeeId::new(),
            email: "m@x.com".to_string(),
            role: Role::Manager,
            authorities: AuthorizationPolicy::authorities_for(Role::Manager),
            token: String::new(),
        };
        assert!(AuthorizationPolicy::check(&manager, Permission::ManagerUpdate).is_ok());
        assert!(matches!(
            AuthorizationPolicy::check(&manager, Permission::AdminUpdate),
            Err(AuthError::AccessDenied(_))
        ));
    }
}
