//! Session and profile model types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated user profile as returned by `/users/login`.
///
/// Only the fields the client acts on are modeled; everything else the
/// server sends is kept in `extra` so it survives a save/load cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Home shop for single-shop accounts.
    #[serde(default)]
    pub shop_id: Option<i64>,
    /// Shops this user may operate on.
    #[serde(default)]
    pub shops: Vec<Shop>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Pick the shop a fresh login should start in.
    ///
    /// Prefers the shop matching `shop_id`, then the first listed shop, then
    /// a bare record built from `shop_id` alone.
    pub fn default_shop(&self) -> Option<Shop> {
        if let Some(shop) = self
            .shops
            .iter()
            .find(|shop| Some(shop.id) == self.shop_id)
        {
            return Some(shop.clone());
        }
        if let Some(shop) = self.shops.first() {
            return Some(shop.clone());
        }
        self.shop_id.map(Shop::with_id)
    }
}

/// A shop the user can switch into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shop {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Shop {
    /// Minimal shop record when only the id is known.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            name: None,
            extra: Map::new(),
        }
    }
}

/// Locally persisted session state.
///
/// Field names mirror the server contract's storage keys (`token`, `user`,
/// `currentShop`). The refresh token is deliberately absent: it lives in the
/// HTTP cookie jar and is never written here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(
        default,
        rename = "currentShop",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_shop: Option<Shop>,
}
