//! Employee Entity
//!
//! Clinic staff member and the only kind of principal the service knows.

use chrono::{DateTime, Utc};

use crate::domain::principal::Principal;
use crate::domain::value_object::{
    account_status::AccountStatus, email::Email, employee_id::EmployeeId, job_title::JobTitle,
    password::EmployeePassword, role::Role,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    /// Unique, immutable after creation
    pub email: Email,
    pub password: EmployeePassword,
    pub role: Role,
    pub job_title: Option<JobTitle>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changes an administrator may apply to an existing record
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the title
    pub job_title: Option<Option<JobTitle>>,
    pub role: Option<Role>,
    pub enabled: Option<bool>,
    pub account_non_locked: Option<bool>,
}

impl Employee {
    /// Create a new employee with an active account
    pub fn new(
        first_name: String,
        last_name: String,
        email: Email,
        password: EmployeePassword,
        role: Role,
        job_title: Option<JobTitle>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: EmployeeId::new(),
            first_name,
            last_name,
            email,
            password,
            role,
            job_title,
            status: AccountStatus::active(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply administrator changes; returns whether anything changed
    pub fn apply(&mut self, changes: EmployeeChanges) -> bool {
        let before = (
            self.first_name.clone(),
            self.last_name.clone(),
            self.job_title,
            self.role,
            self.status,
        );

        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(job_title) = changes.job_title {
            self.job_title = job_title;
        }
        if let Some(role) = changes.role {
            self.role = role;
        }
        if let Some(enabled) = changes.enabled {
            self.status.enabled = enabled;
        }
        if let Some(non_locked) = changes.account_non_locked {
            self.status.account_non_locked = non_locked;
        }

        let changed = before
            != (
                self.first_name.clone(),
                self.last_name.clone(),
                self.job_title,
                self.role,
                self.status,
            );
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }

    /// Check if employee can login
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }
}

impl Principal for Employee {
    fn subject(&self) -> &str {
        self.email.as_str()
    }

    fn authorities(&self) -> Vec<String> {
        self.role.authorities()
    }

    fn credentials(&self) -> &EmployeePassword {
        &self.password
    }

    fn account_status(&self) -> AccountStatus {
        self.status
    }
}

/// Longest accepted first or last name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Trim and check a first or last name
pub fn normalize_name(field: &str, value: &str) -> AuthResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AuthError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(AuthError::Validation(format!("{field} contains invalid characters")));
    }
    Ok(trimmed.to_string())
}
