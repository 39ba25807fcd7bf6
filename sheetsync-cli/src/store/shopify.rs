//! Shopify Admin REST client for the customer endpoints

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, header};
use std::time::Duration;

use super::models::{CreateRequest, CreateResponse, SearchResponse, ValidationErrors};
use super::{CreateOutcome, CustomerStore, NewCustomer, RemoteCustomer, StoreError};
use crate::config::StoreConfig;

#[derive(Debug, Clone)]
pub struct ShopifyClient {
    http: Client,
    base_url: String,
    api_version: String,
}

impl ShopifyClient {
    /// Build a client for `base_url` (e.g. `https://my-store.myshopify.com`)
    ///
    /// `api_key` is sent as `Authorization: Basic base64(api_key)`, so private-app
    /// credentials are expected in `key:password` form already.
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        api_version: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let mut auth = header::HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(api_key)))
            .map_err(|e| StoreError::Config(format!("API key is not a valid header value: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(
            config.url.clone(),
            &config.api_key,
            config.api_version.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/admin/api/{}/{}", self.base_url, self.api_version, path)
    }
}

#[async_trait]
impl CustomerStore for ShopifyClient {
    async fn find_by_email(&self, email: &str) -> Result<Vec<RemoteCustomer>, StoreError> {
        let url = format!(
            "{}?query={}",
            self.endpoint("customers/search.json"),
            urlencoding::encode(&format!("email:{}", email))
        );
        log::debug!("GET {}", url);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        Ok(parsed.customers)
    }

    async fn create_customer(&self, customer: &NewCustomer) -> Result<CreateOutcome, StoreError> {
        let url = self.endpoint("customers.json");
        log::debug!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .json(&CreateRequest { customer })
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let taken = serde_json::from_str::<ValidationErrors>(&body)
                .map(|v| v.email_taken())
                .unwrap_or(false);
            if taken {
                return Ok(CreateOutcome::AlreadyExists);
            }
        }
        if !status.is_success() {
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        log::debug!("Create response: {}", body);
        let id = serde_json::from_str::<CreateResponse>(&body)
            .ok()
            .map(|r| r.customer.id);
        Ok(CreateOutcome::Created { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &Server) -> ShopifyClient {
        ShopifyClient::new(server.url(), "key:secret", "2020-07", None).unwrap()
    }

    fn ada() -> NewCustomer {
        NewCustomer {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_sends_basic_auth_and_email_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/admin/api/2020-07/customers/search.json")
            .match_query(Matcher::UrlEncoded(
                "query".to_string(),
                "email:ada@example.com".to_string(),
            ))
            // base64("key:secret")
            .match_header("authorization", "Basic a2V5OnNlY3JldA==")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "customers": [{ "id": 1, "email": "ada@example.com" }] }).to_string(),
            )
            .create_async()
            .await;

        let found = client(&server).find_by_email("ada@example.com").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email.as_deref(), Some("ada@example.com"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_empty_result() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/admin/api/2020-07/customers/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"customers": []}"#)
            .create_async()
            .await;

        let found = client(&server).find_by_email("nobody@example.com").await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_search_unauthorized_is_status_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/admin/api/2020-07/customers/search.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errors":"[API] Invalid API key or access token"}"#)
            .create_async()
            .await;

        let err = client(&server).find_by_email("ada@example.com").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/admin/api/2020-07/customers/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client(&server).find_by_email("ada@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_create_posts_customer_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/admin/api/2020-07/customers.json")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "customer": {
                    "email": "ada@example.com",
                    "first_name": "Ada",
                    "last_name": "Lovelace"
                }
            })))
            .with_status(201)
            .with_body(json!({ "customer": { "id": 42, "email": "ada@example.com" } }).to_string())
            .create_async()
            .await;

        let outcome = client(&server).create_customer(&ada()).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created { id: Some(42) });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_conflict_reports_existing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/admin/api/2020-07/customers.json")
            .with_status(422)
            .with_body(json!({ "errors": { "email": ["has already been taken"] } }).to_string())
            .create_async()
            .await;

        let outcome = client(&server).create_customer(&ada()).await.unwrap();
        assert_eq!(outcome, CreateOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn test_create_other_validation_error_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/admin/api/2020-07/customers.json")
            .with_status(422)
            .with_body(json!({ "errors": { "email": ["is invalid"] } }).to_string())
            .create_async()
            .await;

        let err = client(&server).create_customer(&ada()).await.unwrap_err();
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = ShopifyClient::new("https://shop.example.com/", "k", "2024-01", None).unwrap();
        assert_eq!(
            client.endpoint("customers.json"),
            "https://shop.example.com/admin/api/2024-01/customers.json"
        );
    }
}
