//! Shopify Admin REST wire models for customers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A customer as returned by the store
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteCustomer {
    pub id: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Payload for creating a customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCustomer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub customers: Vec<RemoteCustomer>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRequest<'a> {
    pub customer: &'a NewCustomer,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    pub customer: RemoteCustomer,
}

/// Body of a 422 response: `{"errors": {"email": ["has already been taken"]}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ValidationErrors {
    #[serde(default)]
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn email_taken(&self) -> bool {
        self.errors
            .get("email")
            .map(|msgs| msgs.iter().any(|m| m.contains("already been taken")))
            .unwrap_or(false)
    }
}

/// What a create call ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Customer created; id is `None` when the response body was not a customer
    Created { id: Option<u64> },
    /// Store rejected the create because the email is already in use
    AlreadyExists,
}
