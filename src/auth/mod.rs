//! Session persistence and auth model types.
//!
//! This module owns the locally stored session (access token, user profile,
//! selected shop) under `~/.config/shopctl/session.json`. The refresh token
//! never passes through here; the server keeps it in an HTTP-only cookie and
//! the transport's cookie jar carries it.

mod error;
mod store;
mod types;

pub use error::AuthError;
pub use store::{default_session_path, SessionStore};
pub use types::{Shop, StoredSession, User};
