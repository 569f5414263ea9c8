//! Value Object Module

pub mod account_status;
pub mod email;
pub mod employee_id;
pub mod job_title;
pub mod password;
pub mod role;
