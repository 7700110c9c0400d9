//! HTTP client for the NutriKart storefront backend.
//!
//! Transport failures are translated into [`ServiceError`] here so the core
//! crate never sees reqwest types.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use nutrikart_core::catalog::{CatalogServiceTrait, Category, Product};
use nutrikart_core::errors::{Error, Result, ServiceError};
use nutrikart_core::recommendations::{
    RecommendResponse, RecommendationServiceTrait, SyncRequest,
};

use crate::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_MS};

/// Default base URL of the storefront backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    /// Flattens `detail`, which is either a message or a list of field errors.
    fn message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(message) => Some(message),
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(str::to_string)
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}

/// HTTP client for the catalog and recommendation endpoints.
///
/// ```ignore
/// let client = ApiClient::new("http://localhost:8000", Duration::from_secs(30))?;
/// let categories = client.list_categories().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_url, config.request_timeout)
    }

    /// Client with the default timeout.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Self::new(base_url, Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> std::result::Result<T, ServiceError> {
        let url = self.url(path);
        debug!("[NutriKartApi] GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable_error(&url, e))?;

        self.parse_response(response).await
    }

    /// Reads the body and maps non-2xx statuses to [`ServiceError::ServiceRejected`].
    async fn parse_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> std::result::Result<T, ServiceError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ServiceError::NetworkUnreachable(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(ApiErrorResponse::message);
            warn!(
                "[NutriKartApi] HTTP {}: {}",
                status,
                detail
                    .clone()
                    .unwrap_or_else(|| body.chars().take(200).collect())
            );
            return Err(ServiceError::ServiceRejected {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            ServiceError::MalformedResponse(format!(
                "{} - {}",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

fn unreachable_error(url: &str, err: reqwest::Error) -> ServiceError {
    warn!("[NutriKartApi] Request to {} failed: {}", url, err);
    ServiceError::NetworkUnreachable(err.to_string())
}

#[async_trait]
impl RecommendationServiceTrait for ApiClient {
    async fn recommend(
        &self,
        request: &SyncRequest,
    ) -> std::result::Result<RecommendResponse, ServiceError> {
        let url = self.url("/recommend");
        debug!(
            "[NutriKartApi] POST {} ({} item(s), budget {})",
            url,
            request.items.as_ref().map(Vec::len).unwrap_or(0),
            request.budget
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| unreachable_error(&url, e))?;

        self.parse_response(response).await
    }
}

#[async_trait]
impl CatalogServiceTrait for ApiClient {
    async fn list_categories(&self) -> std::result::Result<Vec<Category>, ServiceError> {
        self.get("/categories").await
    }

    async fn list_products(
        &self,
        category_id: Option<i64>,
    ) -> std::result::Result<Vec<Product>, ServiceError> {
        match category_id {
            Some(id) => self.get(&format!("/products?category_id={}", id)).await,
            None => self.get("/products").await,
        }
    }

    async fn get_product(&self, id: i64) -> std::result::Result<Option<Product>, ServiceError> {
        match self.get(&format!("/products/{}", id)).await {
            Ok(product) => Ok(Some(product)),
            Err(ServiceError::ServiceRejected { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
