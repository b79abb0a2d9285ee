// Multipart upload helpers shared by the media-carrying modules

use axum::extract::Multipart;

use super::error::ApiError;
use super::validation::ValidationError;

/// Pull the "file" field out of a multipart body.
/// Returns (bytes, declared content type, original filename).
pub async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<(Vec<u8>, Option<String>, String), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::Validation(vec![ValidationError {
            field: "file".to_string(),
            message: format!("Failed to read multipart field: {}", e),
        }])
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let declared_type = field.content_type().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| {
                ApiError::Validation(vec![ValidationError {
                    field: "file".to_string(),
                    message: format!("Failed to read file: {}", e),
                }])
            })?
            .to_vec();

        return Ok((data, declared_type, filename));
    }

    Err(ApiError::Validation(vec![ValidationError {
        field: "file".to_string(),
        message: "No file provided".to_string(),
    }]))
}
