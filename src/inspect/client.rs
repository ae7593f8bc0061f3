use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};

use super::InspectError;

/// HTTP client for the provider's read-only describe API. Shared by every
/// inspector; holds the bearer credential as a default header. The base
/// URL comes from configuration (and from the mock server in tests).
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProviderClient {
    pub fn new(token: String, base_url: String) -> Result<Self, InspectError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", token);
        let header_value = HeaderValue::from_str(&auth_value).map_err(|_| InspectError::Auth {
            message: "invalid token format".to_string(),
        })?;
        headers.insert(AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(InspectError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    /// Issue one describe call. `Ok(None)` when the provider reports the
    /// resource gone (404); 401/403/429 map to their dedicated errors.
    pub async fn describe_resource(
        &self,
        path: &str,
    ) -> Result<Option<serde_json::Value>, InspectError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED => {
                return Err(InspectError::Auth {
                    message: Self::error_message(response).await,
                });
            }
            StatusCode::FORBIDDEN => {
                return Err(InspectError::PermissionDenied {
                    message: Self::error_message(response).await,
                });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());
                return Err(InspectError::RateLimited { retry_after });
            }
            s if !s.is_success() => {
                return Err(InspectError::Api {
                    status: s.as_u16(),
                    message: Self::error_message(response).await,
                });
            }
            _ => {}
        }

        let body = response.json().await.map_err(|e| InspectError::Api {
            status: status.as_u16(),
            message: format!("failed to parse response: {}", e),
        })?;
        Ok(Some(body))
    }

    async fn error_message(response: reqwest::Response) -> String {
        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(_) => return "unknown provider error".to_string(),
        };
        body.get("message")
            .or_else(|| body.get("error"))
            .and_then(|m| m.as_str())
            .unwrap_or("unknown provider error")
            .to_string()
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
