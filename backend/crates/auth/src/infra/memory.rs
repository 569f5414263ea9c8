//! In-memory Employee Repository
//!
//! Used by tests and by database-less development runs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::employee::Employee;
use crate::domain::repository::EmployeeRepository;
use crate::domain::value_object::{email::Email, employee_id::EmployeeId};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct InMemoryEmployeeRepository {
    employees: Arc<RwLock<HashMap<EmployeeId, Employee>>>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.employees.read().await.len()
    }
}

impl EmployeeRepository for InMemoryEmployeeRepository {
    async fn create(&self, employee: &Employee) -> AuthResult<()> {
        let mut employees = self.employees.write().await;

        // Checked under the write lock so concurrent registrations cannot both win
        if employees.values().any(|e| e.email == employee.email) {
            return Err(AuthError::EntityAlreadyExists(employee.email.to_string()));
        }
        employees.insert(employee.id, employee.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EmployeeId) -> AuthResult<Option<Employee>> {
        Ok(self.employees.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Employee>> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .find(|e| &e.email == email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.employees.read().await.values().any(|e| &e.email == email))
    }

    async fn list(&self) -> AuthResult<Vec<Employee>> {
        let mut all: Vec<Employee> = self.employees.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });
        Ok(all)
    }

    async fn update(&self, employee: &Employee) -> AuthResult<()> {
        let mut employees = self.employees.write().await;
        match employees.get_mut(&employee.id) {
            Some(existing) => {
                *existing = employee.clone();
                Ok(())
            }
            None => Err(AuthError::EntityNotFound("Employee".to_string())),
        }
    }

    async fn delete(&self, id: &EmployeeId) -> AuthResult<bool> {
        Ok(self.employees.write().await.remove(id).is_some())
    }
}
