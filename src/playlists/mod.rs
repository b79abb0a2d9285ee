// src/playlists/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::playlists_routes;
