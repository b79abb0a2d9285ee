use super::models::CreateSongRequest;
use crate::common::{ValidationResult, Validator};

impl Validator<CreateSongRequest> for CreateSongRequest {
    fn validate(&self, data: &CreateSongRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Song title is required");
        }

        if data.artist_id.trim().is_empty() {
            result.add_error("artist_id", "Artist is required");
        }

        if let Some(duration) = data.duration_secs {
            if duration <= 0 {
                result.add_error("duration_secs", "Duration must be positive");
            }
        }

        result
    }
}

/// Derive the song's media_type from the uploaded file's mime type
pub fn media_type_for_mime(mime_type: &str) -> Result<&'static str, String> {
    if mime_type.starts_with("audio/") {
        Ok("audio")
    } else if mime_type.starts_with("video/") {
        Ok("video")
    } else {
        Err("Only audio or video files are allowed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_inference() {
        assert_eq!(media_type_for_mime("audio/mpeg").unwrap(), "audio");
        assert_eq!(media_type_for_mime("audio/flac").unwrap(), "audio");
        assert_eq!(media_type_for_mime("video/mp4").unwrap(), "video");
        assert!(media_type_for_mime("image/png").is_err());
        assert!(media_type_for_mime("application/pdf").is_err());
    }
}
