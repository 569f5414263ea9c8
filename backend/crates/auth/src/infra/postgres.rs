//! PostgreSQL Repository Implementations

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::employee::Employee;
use crate::domain::repository::{EmployeeRepository, RevocationStore};
use crate::domain::value_object::{
    account_status::AccountStatus, email::Email, employee_id::EmployeeId, job_title::JobTitle,
    password::EmployeePassword, role::Role,
};
use crate::error::{AuthError, AuthResult};

const EMPLOYEE_COLUMNS: &str = r#"
    employee_id,
    first_name,
    last_name,
    email,
    password_hash,
    role,
    job_title,
    enabled,
    account_non_expired,
    account_non_locked,
    credentials_non_expired,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed employee and revocation repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Purge revocation rows whose token could no longer be presented anyway
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(revocations_deleted = deleted, "Cleaned up expired token revocations");

        Ok(deleted)
    }
}

// ============================================================================
// Employee Repository Implementation
// ============================================================================

impl EmployeeRepository for PgAuthRepository {
    async fn create(&self, employee: &Employee) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employees (
                employee_id,
                first_name,
                last_name,
                email,
                password_hash,
                role,
                job_title,
                enabled,
                account_non_expired,
                account_non_locked,
                credentials_non_expired,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(employee.id.as_uuid())
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.email.as_str())
        .bind(employee.password.as_phc_string())
        .bind(employee.role.id())
        .bind(employee.job_title.map(|t| t.id()))
        .bind(employee.status.enabled)
        .bind(employee.status.account_non_expired)
        .bind(employee.status.account_non_locked)
        .bind(employee.status.credentials_non_expired)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AuthError::EntityAlreadyExists(employee.email.to_string())
            }
            _ => AuthError::Database(e),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &EmployeeId) -> AuthResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_id = $1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_employee()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Employee>> {
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = $1");
        let row = sqlx::query_as::<_, EmployeeRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_employee()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list(&self) -> AuthResult<Vec<Employee>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY last_name, first_name, employee_id"
        );
        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(EmployeeRow::into_employee).collect()
    }

    async fn update(&self, employee: &Employee) -> AuthResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE employees SET
                first_name = $2,
                last_name = $3,
                password_hash = $4,
                role = $5,
                job_title = $6,
                enabled = $7,
                account_non_expired = $8,
                account_non_locked = $9,
                credentials_non_expired = $10,
                updated_at = $11
            WHERE employee_id = $1
            "#,
        )
        .bind(employee.id.as_uuid())
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(employee.password.as_phc_string())
        .bind(employee.role.id())
        .bind(employee.job_title.map(|t| t.id()))
        .bind(employee.status.enabled)
        .bind(employee.status.account_non_expired)
        .bind(employee.status.account_non_locked)
        .bind(employee.status.credentials_non_expired)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::EntityNotFound("Employee".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: &EmployeeId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM employees WHERE employee_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Revocation Store Implementation
// ============================================================================

impl RevocationStore for PgAuthRepository {
    async fn put(&self, key: &str, token: &str, ttl: Duration) -> AuthResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid revocation TTL: {e}")))?;
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (revocation_key, token, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (revocation_key)
            DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let token = sqlx::query_scalar::<_, String>(
            "SELECT token FROM revoked_tokens WHERE revocation_key = $1 AND expires_at > $2",
        )
        .bind(key)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct EmployeeRow {
    employee_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: i16,
    job_title: Option<i16>,
    enabled: bool,
    account_non_expired: bool,
    account_non_locked: bool,
    credentials_non_expired: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeRow {
    fn into_employee(self) -> AuthResult<Employee> {
        let role = Role::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        let job_title = match self.job_title {
            Some(id) => Some(
                JobTitle::from_id(id)
                    .ok_or_else(|| AuthError::Internal(format!("Invalid job title id: {id}")))?,
            ),
            None => None,
        };

        Ok(Employee {
            id: EmployeeId::from_uuid(self.employee_id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: Email::from_db(self.email),
            password: EmployeePassword::from_phc_string(self.password_hash)?,
            role,
            job_title,
            status: AccountStatus {
                enabled: self.enabled,
                account_non_expired: self.account_non_expired,
                account_non_locked: self.account_non_locked,
                credentials_non_expired: self.credentials_non_expired,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
