//! Employee Directory Use Case
//!
//! Administrative read, update and delete over the staff directory.
//! Permission checks happen at the HTTP boundary before these run.

use std::sync::Arc;

use crate::domain::entity::employee::{Employee, EmployeeChanges, normalize_name};
use crate::domain::repository::EmployeeRepository;
use crate::domain::value_object::employee_id::EmployeeId;
use crate::error::{AuthError, AuthResult};

/// Employee directory use case
pub struct EmployeeDirectoryUseCase<R>
where
    R: EmployeeRepository,
{
    repo: Arc<R>,
}

impl<R> EmployeeDirectoryUseCase<R>
where
    R: EmployeeRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> AuthResult<Vec<Employee>> {
        self.repo.list().await
    }

    pub async fn get(&self, id: &EmployeeId) -> AuthResult<Employee> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::EntityNotFound("Employee".to_string()))
    }

    /// Apply changes and persist them if anything differs
    pub async fn update(
        &self,
        id: &EmployeeId,
        mut changes: EmployeeChanges,
    ) -> AuthResult<Employee> {
        if let Some(first_name) = &changes.first_name {
            changes.first_name = Some(normalize_name("First name", first_name)?);
        }
        if let Some(last_name) = &changes.last_name {
            changes.last_name = Some(normalize_name("Last name", last_name)?);
        }

        let mut employee = self.get(id).await?;
        if employee.apply(changes) {
            self.repo.update(&employee).await?;
            tracing::info!(
                employee_id = %employee.id,
                role = %employee.role,
                enabled = employee.status.enabled,
                "Employee updated"
            );
        }

        Ok(employee)
    }

    pub async fn delete(&self, id: &EmployeeId) -> AuthResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AuthError::EntityNotFound("Employee".to_string()));
        }

        tracing::info!(employee_id = %id, "Employee deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email,
        password::{EmployeePassword, RawPassword},
        role::Role,
    };
    use crate::infra::memory::InMemoryEmployeeRepository;

    async fn seeded() -> (EmployeeDirectoryUseCase<InMemoryEmployeeRepository>, EmployeeId) {
        let repo = Arc::new(InMemoryEmployeeRepository::new());
        let raw = RawPassword::new("password1".to_string()).unwrap();
        let employee = Employee::new(
            "Grace".to_string(),
            "Hopper".to_string(),
            Email::new("grace@petwell.vet").unwrap(),
            EmployeePassword::from_raw(&raw, None).unwrap(),
            Role::Client,
            None,
        );
        let id = employee.id;
        repo.create(&employee).await.unwrap();
        (EmployeeDirectoryUseCase::new(repo), id)
    }

    #[tokio::test]
    async fn test_update_promotes_role() {
        let (directory, id) = seeded().await;

        let updated = directory
            .update(
                &id,
                EmployeeChanges {
                    role: Some(Role::Manager),
                    last_name: Some("  Murray Hopper ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Manager);
        assert_eq!(updated.last_name, "Murray Hopper");
        assert_eq!(directory.get(&id).await.unwrap().role, Role::Manager);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let (directory, id) = seeded().await;

        let result = directory
            .update(
                &id,
                EmployeeChanges {
                    first_name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_employee_is_not_found() {
        let (directory, id) = seeded().await;
        let other = EmployeeId::new();

        assert!(matches!(directory.get(&other).await, Err(AuthError::EntityNotFound(_))));
        assert!(matches!(directory.delete(&other).await, Err(AuthError::EntityNotFound(_))));

        directory.delete(&id).await.unwrap();
        assert!(directory.list().await.unwrap().is_empty());
    }
}
