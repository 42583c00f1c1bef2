//! Thin typed wrappers over the gateway, one per API resource family.
//!
//! These carry no business logic: pricing, stock checks, and permissions are
//! all enforced server-side. Each wrapper just shapes requests for its routes
//! and projects the response envelope into typed records.

pub mod auth;
pub mod products;
pub mod reports;
pub mod sales;
pub mod shops;

pub use auth::AuthService;
pub use products::{Product, ProductService};
pub use reports::ReportService;
pub use sales::{Sale, SaleService};
pub use shops::ShopService;
