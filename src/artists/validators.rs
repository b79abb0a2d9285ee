use super::models::CreateArtistRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateArtistRequest> for CreateArtistRequest {
    fn validate(&self, data: &CreateArtistRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.name.trim().is_empty() {
            result.add_error("name", "Artist name is required");
        }

        if data.name.len() > 255 {
            result.add_error("name", "Artist name must not exceed 255 characters");
        }

        result
    }
}

/// Validates that an uploaded artist image really is an image
pub fn validate_image_mime_type(mime_type: &str) -> Result<(), String> {
    if !mime_type.starts_with("image/") {
        return Err("Only image files are allowed".to_string());
    }
    Ok(())
}
