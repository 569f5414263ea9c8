//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate_request;
pub mod config;
pub mod employees;
pub mod login;
pub mod logout;
pub mod register;

// Re-exports
pub use authenticate_request::AuthenticateRequestUseCase;
pub use config::AuthConfig;
pub use employees::EmployeeDirectoryUseCase;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::{LogoutOutcome, LogoutUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
