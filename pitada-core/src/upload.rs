//! Image upload to the third-party host.
//!
//! Recipe and profile photos are posted as multipart form data (the binary
//! file plus a fixed unsigned preset) to the host's upload endpoint; the
//! `secure_url` of the JSON response becomes the stored photo URL.

use serde::Deserialize;
use std::time::Duration;

use crate::error::UploadError;

const DEFAULT_CLOUD_NAME: &str = "do64wlw72";
const DEFAULT_UPLOAD_PRESET: &str = "PitadaDeSabor";

/// Configuration for [`ImageUploader`].
#[derive(Clone)]
pub struct ImageUploaderBuilder {
    cloud_name: String,
    upload_preset: String,
    timeout: Duration,
}

impl Default for ImageUploaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageUploaderBuilder {
    /// Create a builder with defaults.
    ///
    /// Environment variables:
    /// - `PITADA_UPLOAD_CLOUD`: overrides the host account name
    /// - `PITADA_UPLOAD_PRESET`: overrides the unsigned upload preset
    pub fn new() -> Self {
        Self {
            cloud_name: std::env::var("PITADA_UPLOAD_CLOUD")
                .unwrap_or_else(|_| DEFAULT_CLOUD_NAME.to_string()),
            upload_preset: std::env::var("PITADA_UPLOAD_PRESET")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_PRESET.to_string()),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn cloud_name(mut self, cloud_name: impl Into<String>) -> Self {
        self.cloud_name = cloud_name.into();
        self
    }

    pub fn upload_preset(mut self, preset: impl Into<String>) -> Self {
        self.upload_preset = preset.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ImageUploader, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(ImageUploader {
            client,
            endpoint: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                self.cloud_name
            ),
            upload_preset: self.upload_preset,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

/// Client for the image host's upload endpoint.
pub struct ImageUploader {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
}

impl ImageUploader {
    pub fn new() -> Result<Self, reqwest::Error> {
        ImageUploaderBuilder::new().build()
    }

    pub fn builder() -> ImageUploaderBuilder {
        ImageUploaderBuilder::new()
    }

    /// Upload image bytes, returning the hosted URL. Failures propagate:
    /// a photo that did not land must be visible to the user.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()
            .inspect_err(|error| tracing::error!(%error, "image upload rejected"))?;

        let body: UploadResponse = response.json().await?;
        body.secure_url
            .ok_or_else(|| UploadError::MissingField("secure_url".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_response_parses_secure_url() {
        let body: UploadResponse =
            serde_json::from_str(r#"{"secure_url":"https://res.example/img.jpg","bytes":123}"#)
                .unwrap();
        assert_eq!(
            body.secure_url.as_deref(),
            Some("https://res.example/img.jpg")
        );
    }

    #[test]
    fn builder_formats_the_endpoint_from_the_cloud_name() {
        let uploader = ImageUploaderBuilder::new()
            .cloud_name("acme")
            .upload_preset("Recipes")
            .build()
            .unwrap();
        assert_eq!(
            uploader.endpoint,
            "https://api.cloudinary.com/v1_1/acme/image/upload"
        );
        assert_eq!(uploader.upload_preset, "Recipes");
    }
}
