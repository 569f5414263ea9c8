//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::employee::{Employee, EmployeeChanges};
use crate::domain::value_object::{employee_id::EmployeeId, job_title::JobTitle, role::Role};
use crate::infra::jwt::IssuedToken;

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub job_title: Option<JobTitle>,
}

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token response for register and login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"Bearer"`
    pub token_type: &'static str,
    pub expires_at: Option<DateTime<Utc>>,
    pub employee: EmployeeResponse,
}

impl TokenResponse {
    pub fn new(token: IssuedToken, employee: &Employee) -> Self {
        Self {
            expires_at: token.expires_at(),
            access_token: token.token,
            token_type: "Bearer",
            employee: EmployeeResponse::from(employee),
        }
    }
}

// ============================================================================
// Employees
// ============================================================================

/// Employee as exposed over HTTP (never includes the credential)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: &'static str,
    pub job_title: Option<JobTitle>,
    pub enabled: bool,
    pub account_non_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Employee> for EmployeeResponse {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.to_string(),
            role: employee.role.code(),
            job_title: employee.job_title,
            enabled: employee.status.enabled,
            account_non_locked: employee.status.account_non_locked,
            created_at: employee.created_at,
            updated_at: employee.updated_at,
        }
    }
}

/// Administrator update; omitted fields are left unchanged
///
/// `jobTitle: null` clears the title, which is why it is double-wrapped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub job_title: Option<Option<JobTitle>>,
    pub role: Option<String>,
    pub enabled: Option<bool>,
    pub account_non_locked: Option<bool>,
}

impl UpdateEmployeeRequest {
    /// Resolve the role code; an unknown code is handed back as the error
    pub fn into_changes(self) -> Result<EmployeeChanges, String> {
        let role = match self.role {
            Some(code) => Some(Role::from_code(&code).ok_or(code)?),
            None => None,
        };

        Ok(EmployeeChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            job_title: self.job_title,
            role,
            enabled: self.enabled,
            account_non_locked: self.account_non_locked,
        })
    }
}

/// A present field (even `null`) becomes `Some(..)`
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "a@x.com",
                "password": "password1",
                "jobTitle": "VETERINARIAN"
            }"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.job_title, Some(JobTitle::Veterinarian));
    }

    #[test]
    fn test_update_request_job_title_tristate() {
        let absent: UpdateEmployeeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.job_title, None);

        let cleared: UpdateEmployeeRequest = serde_json::from_str(r#"{"jobTitle":null}"#).unwrap();
        assert_eq!(cleared.job_title, Some(None));

        let set: UpdateEmployeeRequest =
            serde_json::from_str(r#"{"jobTitle":"MANAGER"}"#).unwrap();
        assert_eq!(set.job_title, Some(Some(JobTitle::Manager)));
    }

    #[test]
    fn test_update_request_role_code() {
        let req: UpdateEmployeeRequest = serde_json::from_str(r#"{"role":"MANAGER"}"#).unwrap();
        assert_eq!(req.into_changes().unwrap().role, Some(Role::Manager));

        let bad: UpdateEmployeeRequest = serde_json::from_str(r#"{"role":"ROOT"}"#).unwrap();
        assert_eq!(bad.into_changes().unwrap_err(), "ROOT");
    }
}
