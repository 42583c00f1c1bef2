//! Product catalog endpoints.

use crate::error::ApiError;
use crate::gateway::Gateway;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog product record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub shop_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// CRUD wrapper for `/products`.
pub struct ProductService<'a> {
    gateway: &'a Gateway,
}

impl<'a> ProductService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// List products, with server-side filters passed as query parameters
    /// (e.g. `shop_id`, `search`, `page`).
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<Product>, ApiError> {
        self.gateway
            .get_with_query("/products", query)
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn get(&self, id: i64) -> Result<Product, ApiError> {
        self.gateway
            .get(&format!("/products/{id}"))
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn create(&self, product: Value) -> Result<Product, ApiError> {
        self.gateway
            .post("/products", product)
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn update(&self, id: i64, changes: Value) -> Result<Product, ApiError> {
        self.gateway
            .put(&format!("/products/{id}"), Some(changes))
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn delete(&self, id: i64) -> Result<String, ApiError> {
        let envelope = self
            .gateway
            .delete(&format!("/products/{id}"))
            .await?
            .require_success()?;
        Ok(envelope.message_or("product deleted"))
    }
}
