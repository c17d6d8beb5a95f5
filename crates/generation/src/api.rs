//! REST client for the scene generation backend.
//!
//! The backend address travels inside each [`RegenerationRequest`]
//! (`backendEndpoint`), so one client serves whatever endpoint the operator
//! has configured at the time of the call.

use async_trait::async_trait;
use sceneqa_core::regeneration::{GenerationService, RegenerationRequest, ServiceError};
use serde::Deserialize;

/// Path appended to the configured backend endpoint.
pub const REGENERATE_PATH: &str = "/regenerate";

/// HTTP client for the generation backend.
#[derive(Clone, Default)]
pub struct GenerationApi {
    client: reqwest::Client,
}

/// Success body returned by `POST /regenerate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub image_url: String,
}

/// Errors from the generation REST layer.
#[derive(Debug, thiserror::Error)]
pub enum GenerationApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Generation backend error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend answered 2xx without an image locator.
    #[error("Generation backend returned an empty image URL")]
    MissingImage,
}

impl GenerationApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling, custom
    /// timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Submit a scene regeneration request.
    pub async fn regenerate(
        &self,
        request: &RegenerationRequest,
    ) -> Result<GeneratedImage, GenerationApiError> {
        let url = regenerate_url(&request.backend_endpoint);
        tracing::debug!(%url, "Posting regeneration request");

        let response = self.client.post(url).json(request).send().await?;
        let response = Self::ensure_success(response).await?;
        let image: GeneratedImage = response.json().await?;

        if image.image_url.trim().is_empty() {
            return Err(GenerationApiError::MissingImage);
        }
        Ok(image)
    }

    /// Return the response unchanged on success, or an
    /// [`GenerationApiError::ApiError`] with status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Join the configured endpoint and [`REGENERATE_PATH`].
pub fn regenerate_url(endpoint: &str) -> String {
    format!("{}{REGENERATE_PATH}", endpoint.trim_end_matches('/'))
}

#[async_trait]
impl GenerationService for GenerationApi {
    async fn generate(&self, request: &RegenerationRequest) -> Result<String, ServiceError> {
        let image = self.regenerate(request).await?;
        Ok(image.image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(regenerate_url("http://gen:8000"), "http://gen:8000/regenerate");
        assert_eq!(regenerate_url("http://gen:8000/"), "http://gen:8000/regenerate");
        assert_eq!(
            regenerate_url("https://gen.example/api/"),
            "https://gen.example/api/regenerate"
        );
    }

    #[test]
    fn api_error_display_includes_status_and_body() {
        let err = GenerationApiError::ApiError {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Generation backend error (503): overloaded");
    }

    #[test]
    fn generated_image_parses_camel_case() {
        let image: GeneratedImage =
            serde_json::from_str(r#"{"imageUrl": "https://gen/1.png", "seed": 3}"#).unwrap();
        assert_eq!(image.image_url, "https://gen/1.png");
    }
}
