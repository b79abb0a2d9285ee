use super::models::CreateAlbumRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateAlbumRequest> for CreateAlbumRequest {
    fn validate(&self, data: &CreateAlbumRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Album title is required");
        }

        if data.artist_id.trim().is_empty() {
            result.add_error("artist_id", "Artist is required");
        }

        if let Some(year) = data.release_year {
            if !(1000..=3000).contains(&year) {
                result.add_error("release_year", "Release year is out of range");
            }
        }

        result
    }
}
