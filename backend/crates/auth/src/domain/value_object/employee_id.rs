//! Employee ID Value Object
//!
//! Re-exports the typed ID from kernel.

pub use kernel::id::EmployeeId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id_unique() {
        let a = EmployeeId::new();
        let b = EmployeeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_employee_id_copy_semantics() {
        let a = EmployeeId::new();
        let b = a;
        assert_eq!(a, b);
    }
}
