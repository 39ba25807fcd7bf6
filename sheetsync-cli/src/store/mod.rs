//! Remote customer store
//!
//! The sync job only needs two calls from the e-commerce backend: look a customer
//! up by email and create one. [`ShopifyClient`] implements them against the
//! Shopify Admin REST API.

pub mod models;
pub mod shopify;

pub use models::{CreateOutcome, NewCustomer, RemoteCustomer};
pub use shopify::ShopifyClient;

use async_trait::async_trait;
use std::fmt;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Customers whose email matches `email`; empty when none exist
    async fn find_by_email(&self, email: &str) -> Result<Vec<RemoteCustomer>, StoreError>;

    /// Create a customer, reporting an email conflict as `AlreadyExists`
    async fn create_customer(&self, customer: &NewCustomer) -> Result<CreateOutcome, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    /// Connection, TLS or body transfer failure
    Http(reqwest::Error),
    /// Store answered with a non-success status
    Status { status: u16, body: String },
    /// Response body did not have the expected shape
    Decode(serde_json::Error),
    /// Client could not be configured
    Config(String),
}

impl StoreError {
    /// HTTP status for status errors, `None` otherwise
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            StoreError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(e) => write!(f, "Request failed: {}", e),
            StoreError::Status { status, body } => {
                write!(f, "Store returned HTTP {}: {}", status, body)
            }
            StoreError::Decode(e) => write!(f, "Unexpected response body: {}", e),
            StoreError::Config(msg) => write!(f, "Invalid store client configuration: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Http(e) => Some(e),
            StoreError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Http(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Decode(e)
    }
}
