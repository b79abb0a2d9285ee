//! Tests for artists module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::Validator;

    #[test]
    fn test_create_artist_validation_success() {
        let request = models::CreateArtistRequest {
            name: "Miles Davis".to_string(),
            bio: Some("Trumpeter and bandleader".to_string()),
        };

        let result = request.validate(&request);
        assert!(result.is_valid);
    }

    #[test]
    fn test_create_artist_validation_empty_name() {
        let request = models::CreateArtistRequest {
            name: "".to_string(),
            bio: None,
        };

        let result = request.validate(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "name"));
    }

    #[test]
    fn test_create_artist_validation_name_too_long() {
        let request = models::CreateArtistRequest {
            name: "a".repeat(256),
            bio: None,
        };

        let result = request.validate(&request);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_image_mime_validation() {
        assert!(validators::validate_image_mime_type("image/png").is_ok());
        assert!(validators::validate_image_mime_type("image/jpeg").is_ok());
        assert!(validators::validate_image_mime_type("audio/mpeg").is_err());
        assert!(validators::validate_image_mime_type("application/pdf").is_err());
    }
}
