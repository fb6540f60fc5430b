//! Mosoblgaz account API
//!
//! The flows only need to log in and list contracts. The client itself lives
//! outside this crate; it is plugged in through an [`ApiFactory`].

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by the account API
#[derive(Debug, Error)]
pub enum MosoblgazError {
    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Some upstream services are unreachable
    #[error("Partially offline: {0}")]
    PartialOffline(String),

    #[error("API error: {0}")]
    Api(String),
}

pub type MosoblgazResult<T> = Result<T, MosoblgazError>;

/// A billing contract of the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,
    /// Detail payload, absent when fetched without data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Contract {
    pub fn new(contract_id: impl Into<String>) -> Self {
        Self {
            contract_id: contract_id.into(),
            data: None,
        }
    }
}

/// Contracts keyed by ID, in the order the API returned them
pub type Contracts = IndexMap<String, Contract>;

/// Authenticated access to one account
#[async_trait]
pub trait MosoblgazApi: Send {
    /// Log in with the credentials the client was built with
    async fn authenticate(&mut self) -> MosoblgazResult<()>;

    /// List the account's contracts
    ///
    /// With `with_data == false` only shallow contracts are returned.
    async fn fetch_contracts(&mut self, with_data: bool) -> MosoblgazResult<Contracts>;
}

/// Builds a client from `(username, password)`
pub type ApiFactory = Arc<dyn Fn(&str, &str) -> Box<dyn MosoblgazApi> + Send + Sync + 'static>;
