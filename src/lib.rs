//! shopctl — client for a multi-shop retail management API.
//!
//! The crate wraps a remote REST backend (inventory, sales, shops, reports)
//! behind an authenticated request gateway: every call carries a bearer
//! token, an expired token is renewed transparently through a single-flight
//! refresh handshake, and requests that expire mid-renewal are queued and
//! replayed in order with the fresh credential.
//!
//! # Quick start
//!
//! ```no_run
//! use shopctl::auth::SessionStore;
//! use shopctl::gateway::Gateway;
//! use shopctl::services::ProductService;
//! use shopctl::transport::ReqwestTransport;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport =
//!     ReqwestTransport::new("https://api.example.com/api", Duration::from_secs(30))?;
//! let gateway = Gateway::new(Arc::new(transport), SessionStore::in_memory());
//! let products = ProductService::new(&gateway).list(&[]).await?;
//! println!("{} products", products.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod render;
pub mod services;
#[cfg(test)]
pub mod testsupport;
pub mod transport;
