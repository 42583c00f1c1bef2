//! Shop management endpoints.

use crate::auth::Shop;
use crate::error::ApiError;
use crate::gateway::Gateway;
use serde_json::Value;

/// CRUD wrapper for `/shops`, plus local active-shop selection.
pub struct ShopService<'a> {
    gateway: &'a Gateway,
}

impl<'a> ShopService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Vec<Shop>, ApiError> {
        self.gateway
            .get_with_query("/shops", query)
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn get(&self, id: i64) -> Result<Shop, ApiError> {
        self.gateway
            .get(&format!("/shops/{id}"))
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn create(&self, shop: Value) -> Result<Shop, ApiError> {
        self.gateway
            .post("/shops", shop)
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn update(&self, id: i64, changes: Value) -> Result<Shop, ApiError> {
        self.gateway
            .put(&format!("/shops/{id}"), Some(changes))
            .await?
            .require_success()?
            .data_as()
    }

    pub async fn delete(&self, id: i64) -> Result<String, ApiError> {
        let envelope = self
            .gateway
            .delete(&format!("/shops/{id}"))
            .await?
            .require_success()?;
        Ok(envelope.message_or("shop deleted"))
    }

    /// Make `id` the active shop for subsequent work. Fetches the shop so the
    /// stored record carries its name, then persists the selection locally.
    pub async fn select(&self, id: i64) -> Result<Shop, ApiError> {
        let shop = self.get(id).await?;
        self.gateway.store().set_current_shop(shop.clone())?;
        Ok(shop)
    }
}
