use super::handlers;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Creates the FAQs router
pub fn faqs_routes() -> Router {
    Router::new()
        .route("/api/faqs/add-faq", post(handlers::add_faq))
        .route("/api/faqs/get-all-faq", get(handlers::get_all_faqs))
        .route("/api/faqs/update-faq/:id", put(handlers::update_faq))
        .route("/api/faqs/delete-faq/:id", delete(handlers::delete_faq))
}
