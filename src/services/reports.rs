//! Reporting endpoints.
//!
//! Report payloads vary by deployment and are passed through as raw JSON;
//! rendering decisions belong to the caller.

use crate::error::ApiError;
use crate::gateway::Gateway;
use serde_json::Value;

/// Wrapper for `/reports/*`.
pub struct ReportService<'a> {
    gateway: &'a Gateway,
}

impl<'a> ReportService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn sales(&self, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.fetch("/reports/sales", query).await
    }

    pub async fn stock(&self, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.fetch("/reports/stock", query).await
    }

    pub async fn product_sales(&self, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.fetch("/reports/products", query).await
    }

    pub async fn payments(&self, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.fetch("/reports/payments", query).await
    }

    /// Headline numbers for the dashboard (today's sales, low stock, ...).
    pub async fn dashboard_summary(&self, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        self.fetch("/reports/dashboard", query).await
    }

    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let envelope = self
            .gateway
            .get_with_query(path, query)
            .await?
            .require_success()?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;
    use crate::testsupport::{envelope_ok, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    // Verifies each report hits its own route and passes the data through.
    #[tokio::test]
    async fn dashboard_summary_passes_data_through() {
        let transport = Arc::new(MockTransport::new(|req, _| {
            assert_eq!(req.path, "/reports/dashboard");
            assert_eq!(
                req.query,
                vec![("shop_id".to_string(), "1".to_string())]
            );
            Ok(envelope_ok(json!({"today_sales": 310.50, "low_stock": 4})))
        }));
        let store = SessionStore::in_memory();
        store.set_access_token("T1").unwrap();
        let gateway = Gateway::new(transport, store);

        let summary = ReportService::new(&gateway)
            .dashboard_summary(&[("shop_id", "1")])
            .await
            .unwrap();
        assert_eq!(summary["low_stock"], json!(4));
    }
}
