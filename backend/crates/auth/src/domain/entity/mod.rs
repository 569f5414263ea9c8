//! Entity Module

pub mod employee;
pub mod identity;
