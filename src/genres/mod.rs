// src/genres/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::genres_routes;
