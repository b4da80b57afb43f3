use super::errors::ApiError;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, error};

mod numbers;
mod operators;
mod places;
mod search;
mod usage;

#[derive(Clone)]
pub struct ApiClient {
    pub client: reqwest::Client,
    api_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ApiError::Validation("backend url is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url: format!("{}/api", base_url),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    // Sends the request and maps non-2xx replies to ApiError::Server
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Backend response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = status.as_u16(), "Backend request failed: {}", body);
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_bytes(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

// Attaches a logo file to a multipart form under `field`
pub(crate) async fn attach_file(form: Form, field: &str, path: &Path) -> Result<Form, ApiError> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Validation(format!("cannot read {}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("logo")
        .to_string();
    let part = Part::bytes(contents)
        .file_name(file_name)
        .mime_str(image_mime(path))
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(form.part(field.to_string(), part))
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_api_prefix() {
        let client = ApiClient::new("https://phones.example.org/").unwrap();
        assert_eq!(client.url("/numbers"), "https://phones.example.org/api/numbers");
        assert!(ApiClient::new("  ").is_err());
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("logo.JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("logo")), "image/png");
    }
}
