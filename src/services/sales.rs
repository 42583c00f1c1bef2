//! Sales endpoints.

use crate::error::ApiError;
use crate::gateway::Gateway;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sale record. Line items and totals come straight from the server; this
/// client never recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: i64,
    #[serde(default)]
    pub shop_id: Option<i64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wrapper for `/sales`. Sales are never deleted, only cancelled.
pub struct SaleService<'a> {
    gateway: &'a Gateway,
}

impl<'a> SaleService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<Sale>, ApiError> {
        self.gateway
            .get_with_query("/sales", query)
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn get(&self, id: i64) -> Result<Sale, ApiError> {
        self.gateway
            .get(&format!("/sales/{id}"))
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn create(&self, sale: Value) -> Result<Sale, ApiError> {
        self.gateway
            .post("/sales", sale)
            .await?
            .require_success()?
            .data_as()
    }

    /// Cancel a sale. The server reverses its stock movements.
    pub async fn cancel(&self, id: i64) -> Result<Sale, ApiError> {
        self.gateway
            .put(&format!("/sales/{id}/cancel"), None)
            .await?
            .require_success()?
            .data_as()
    }
}
