//! Role and Permission Value Objects
//!
//! A role is a named, fixed bundle of permissions. Roles are not editable at
//! runtime; the mapping below is the whole authorization policy table.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Permission
// ============================================================================

/// Granular capability checked at authorization time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "admin:read")]
    AdminRead,
    #[serde(rename = "admin:create")]
    AdminCreate,
    #[serde(rename = "admin:update")]
    AdminUpdate,
    #[serde(rename = "admin:delete")]
    AdminDelete,
    #[serde(rename = "manager:read")]
    ManagerRead,
    #[serde(rename = "manager:create")]
    ManagerCreate,
    #[serde(rename = "manager:update")]
    ManagerUpdate,
    #[serde(rename = "manager:delete")]
    ManagerDelete,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::AdminRead,
        Permission::AdminCreate,
        Permission::AdminUpdate,
        Permission::AdminDelete,
        Permission::ManagerRead,
        Permission::ManagerCreate,
        Permission::ManagerUpdate,
        Permission::ManagerDelete,
    ];

    /// Authority string carried in tokens and checked per endpoint
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        use Permission::*;
        match self {
            AdminRead => "admin:read",
            AdminCreate => "admin:create",
            AdminUpdate => "admin:update",
            AdminDelete => "admin:delete",
            ManagerRead => "manager:read",
            ManagerCreate => "manager:create",
            ManagerUpdate => "manager:update",
            ManagerDelete => "manager:delete",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Role
// ============================================================================

const ADMIN_PERMISSIONS: &[Permission] = &Permission::ALL;

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ManagerRead,
    Permission::ManagerCreate,
    Permission::ManagerUpdate,
    Permission::ManagerDelete,
];

const CLIENT_PERMISSIONS: &[Permission] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum Role {
    #[default]
    Client = 0,
    Manager = 1,
    Admin = 2,
}

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            Client => "CLIENT",
            Manager => "MANAGER",
            Admin => "ADMIN",
        }
    }

    /// Permissions owned by this role
    #[inline]
    pub const fn permissions(&self) -> &'static [Permission] {
        use Role::*;
        match self {
            Admin => ADMIN_PERMISSIONS,
            Manager => MANAGER_PERMISSIONS,
            Client => CLIENT_PERMISSIONS,
        }
    }

    /// The implicit `ROLE_<NAME>` authority
    pub fn role_authority(&self) -> String {
        format!("ROLE_{}", self.code())
    }

    /// Permission strings plus the role authority, in a stable order
    pub fn authorities(&self) -> Vec<String> {
        self.permissions()
            .iter()
            .map(|p| p.as_str().to_string())
            .chain(std::iter::once(self.role_authority()))
            .collect()
    }

    #[inline]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn from_id(id: i16) -> Option<Self> {
        use Role::*;
        match id {
            0 => Some(Client),
            1 => Some(Manager),
            2 => Some(Admin),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        use Role::*;
        match code.trim().to_ascii_uppercase().as_str() {
            "CLIENT" => Some(Client),
            "MANAGER" => Some(Manager),
            "ADMIN" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_owns_every_permission() {
        for permission in Permission::ALL {
            assert!(Role::Admin.has_permission(permission), "{permission}");
        }
    }

    #[test]
    fn test_manager_permissions() {
        assert!(Role::Manager.has_permission(Permission::ManagerRead));
        assert!(Role::Manager.has_permission(Permission::ManagerDelete));
        assert!(!Role::Manager.has_permission(Permission::AdminRead));
        assert!(!Role::Manager.has_permission(Permission::AdminDelete));
    }

    #[test]
    fn test_client_has_no_permissions() {
        assert!(Role::Client.permissions().is_empty());
        assert_eq!(Role::Client.authorities(), vec!["ROLE_CLIENT".to_string()]);
    }

    #[test]
    fn test_authorities_include_role_authority() {
        let authorities = Role::Manager.authorities();
        assert_eq!(authorities.len(), 5);
        assert!(authorities.contains(&"manager:update".to_string()));
        assert_eq!(authorities.last().map(String::as_str), Some("ROLE_MANAGER"));
    }

    #[test]
    fn test_role_from_id_and_code() {
        assert_eq!(Role::from_id(0), Some(Role::Client));
        assert_eq!(Role::from_id(2), Some(Role::Admin));
        assert_eq!(Role::from_id(9), None);
        assert_eq!(Role::from_code("manager"), Some(Role::Manager));
        assert_eq!(Role::from_code("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_code("superuser"), None);
    }

    #[test]
    fn test_permission_strings() {
        assert_eq!(Permission::AdminRead.as_str(), "admin:read");
        assert_eq!(Permission::from_str_opt("manager:create"), Some(Permission::ManagerCreate));
        assert_eq!(Permission::from_str_opt("admin:everything"), None);
        assert_eq!(
            serde_json::to_string(&Permission::AdminDelete).unwrap(),
            "\"admin:delete\""
        );
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(role, Role::Manager);
    }
}
