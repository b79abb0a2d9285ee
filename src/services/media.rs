// src/services/media.rs
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use std::env;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media storage not configured")]
    NotConfigured,

    #[error("S3 operation failed: {0}")]
    S3Error(String),
}

#[derive(Debug, Clone)]
struct MediaConfig {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    bucket: String,
    cdn_domain: Option<String>,
}

/// Cloud media store for artist images, album covers, and song files.
///
/// Thin wiring over S3; the catalog only keeps the resulting public URL.
#[derive(Debug)]
pub struct MediaService {
    config: Option<MediaConfig>,
}

impl MediaService {
    /// Build from AWS_* environment variables. Missing credentials leave the
    /// service unconfigured; uploads then fail at request time.
    pub fn from_env() -> Self {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").unwrap_or_default();
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default();
        let bucket = env::var("AWS_S3_BUCKET_NAME").unwrap_or_default();

        if access_key_id.is_empty() || secret_access_key.is_empty() || bucket.is_empty() {
            return Self { config: None };
        }

        let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let cdn_domain = env::var("AWS_CLOUDFRONT_DOMAIN").ok().filter(|d| !d.is_empty());

        info!(bucket = %bucket, region = %region, "Media storage configured");

        Self {
            config: Some(MediaConfig {
                access_key_id,
                secret_access_key,
                region,
                bucket,
                cdn_domain,
            }),
        }
    }

    async fn get_s3_client(&self) -> Result<(S3Client, &MediaConfig), MediaError> {
        let config = self.config.as_ref().ok_or(MediaError::NotConfigured)?;

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "env",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok((S3Client::new(&aws_config), config))
    }

    /// Upload a media object and return its public URL
    pub async fn upload(
        &self,
        file_data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, MediaError> {
        let (client, config) = self.get_s3_client().await?;

        let body = ByteStream::from(Bytes::from(file_data));

        client
            .put_object()
            .bucket(&config.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to upload media to S3");
                MediaError::S3Error(format!("Upload failed: {}", e))
            })?;

        info!(key = %key, bucket = %config.bucket, "Media uploaded");

        Ok(self.public_url(config, key))
    }

    /// Delete a previously uploaded media object
    pub async fn delete(&self, key: &str) -> Result<(), MediaError> {
        let (client, config) = self.get_s3_client().await?;

        client
            .delete_object()
            .bucket(&config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to delete media from S3");
                MediaError::S3Error(format!("Delete failed: {}", e))
            })?;

        info!(key = %key, "Media deleted");
        Ok(())
    }

    fn public_url(&self, config: &MediaConfig, key: &str) -> String {
        match &config.cdn_domain {
            Some(domain) => format!("https://{}/{}", domain, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                config.bucket, config.region, key
            ),
        }
    }
}

/// Sniff a sensible content type for uploaded media, falling back to the
/// multipart-declared type when the bytes are not recognizable
pub fn sniff_content_type(data: &[u8], declared: Option<&str>) -> String {
    infer::get(data)
        .map(|t| t.mime_type().to_string())
        .or_else(|| declared.map(|s| s.to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_prefers_magic_bytes() {
        // PNG magic header
        let png: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(sniff_content_type(png, Some("text/plain")), "image/png");
    }

    #[test]
    fn test_sniff_falls_back_to_declared() {
        assert_eq!(
            sniff_content_type(&[0u8; 4], Some("audio/mpeg")),
            "audio/mpeg"
        );
        assert_eq!(sniff_content_type(&[0u8; 4], None), "application/octet-stream");
    }
}
