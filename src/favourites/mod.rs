// src/favourites/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::favourites_routes;
