// Common module - shared types and utilities across all modules

pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod responses;
pub mod state;
pub mod uploads;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{looks_like_email, safe_email_log};
pub use id_generator::*;
pub use responses::{MessageResponse, SearchParams};
pub use state::AppState;
pub use uploads::read_file_field;
pub use validation::{ValidationError, ValidationResult, Validator};
