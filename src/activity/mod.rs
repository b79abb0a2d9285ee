//! # Activity Module
//!
//! Immutable audit feed of significant account and catalog actions,
//! surfaced to admins for review.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;

pub use models::Activity;
pub use routes::activity_routes;
pub use service::ActivityService;
