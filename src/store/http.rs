use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;

use super::{InventoryStore, StoreError};
use crate::pipeline::MatchCriteria;
use crate::resource::NormalizedResource;

/// Inventory store reached over its REST API.
///
/// `POST {base}/resources/search` takes the criteria and answers
/// `{"results": [...]}`; `POST {base}/resources` takes a record and answers
/// `{"_id": "..."}`.
#[derive(Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let header_value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                StoreError::Auth {
                    message: "Invalid token format".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, header_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(StoreError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, path: &str, body: &impl serde::Serialize) -> Result<Value, StoreError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(StoreError::Auth {
                message: format!("store rejected credentials ({})", status.as_u16()),
            });
        }

        let text = response.text().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(|e| e.as_str())
                .or_else(|| body.get("message").and_then(|m| m.as_str()))
                .map(|m| m.to_string())
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        "Unknown error".to_string()
                    } else {
                        text.clone()
                    }
                });
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| StoreError::Decode {
            message: format!("Failed to parse response: {}", e),
        })?;

        Ok(body)
    }
}

#[async_trait]
impl InventoryStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn get_resource(&self, criteria: &MatchCriteria) -> Result<Vec<Value>, StoreError> {
        let body = self.post_json("/resources/search", criteria.query()).await?;

        let results = body
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| StoreError::Decode {
                message: "search response has no results array".to_string(),
            })?;

        tracing::debug!(count = results.len(), "store search returned");
        Ok(results.clone())
    }

    async fn add_resource(&self, record: &NormalizedResource) -> Result<String, StoreError> {
        let body = self.post_json("/resources", record).await?;

        Ok(body
            .get("_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| record.id.clone()))
    }
}

impl std::fmt::Debug for HttpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStore")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = HttpStore::new("http://localhost:8080", Some("t".to_string()));
        assert!(store.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = HttpStore::new("http://localhost:8080/api/", None).unwrap();
        assert_eq!(store.api_base(), "http://localhost:8080/api");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let err = HttpStore::new("http://localhost", Some("bad\ntoken".to_string())).unwrap_err();
        assert!(matches!(err, StoreError::Auth { .. }));
    }

    #[test]
    fn test_debug_does_not_expose_token() {
        let store = HttpStore::new("http://localhost", Some("super_secret_token_12345".to_string()))
            .unwrap();
        let debug_output = format!("{:?}", store);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token_12345"));
    }
}
