// Shared response and query-parameter shapes

use serde::{Deserialize, Serialize};

/// Plain success acknowledgement for deletes and membership changes
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Optional substring filter accepted by the get-all listing endpoints
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}
