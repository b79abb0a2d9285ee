//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Local signup/login with the encrypted profile envelope
//! - Google OAuth bridge and provider-token exchange
//! - Password reset via emailed single-use tokens
//! - Guest token issuance
//! - AuthedUser / ReadAccess extractors for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::{AuthedUser, ReadAccess};
pub use models::User;
pub use routes::auth_routes;
