// src/faqs/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::faqs_routes;
