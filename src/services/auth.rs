//! Login, logout, and password-recovery endpoints.

use crate::auth::User;
use crate::error::ApiError;
use crate::gateway::{Gateway, LOGIN_ROUTE};
use serde_json::json;

/// Account and session operations.
pub struct AuthService<'a> {
    gateway: &'a Gateway,
}

impl<'a> AuthService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Log in with email and password.
    ///
    /// On success the access token, user profile, and the user's starting
    /// shop are persisted to the session store; the server also sets the
    /// `refreshToken` cookie, which stays in the transport's jar. A 401 here
    /// means bad credentials and is surfaced directly, never recovered.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::Failed("Email and password are required.".into()));
        }

        let envelope = self
            .gateway
            .post(LOGIN_ROUTE, json!({ "email": email, "password": password }))
            .await?
            .require_success()?;

        let token = envelope
            .data_field::<Option<String>>("accessToken")?
            .or(envelope.data_field::<Option<String>>("token")?)
            .ok_or_else(|| {
                ApiError::Decode("login response did not include an access token".into())
            })?;
        let user: User = envelope.data_field("user")?;
        self.gateway.store().set_auth(&token, user.clone())?;
        Ok(user)
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        let envelope = self
            .gateway
            .post("/users/forgot-password", json!({ "email": email.trim() }))
            .await?
            .require_success()?;
        Ok(envelope.message_or("password reset email sent"))
    }

    /// Complete a password reset with the emailed token.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<String, ApiError> {
        let envelope = self
            .gateway
            .post(
                "/users/reset-password",
                json!({
                    "token": token,
                    "password": password,
                    "password_confirmation": password_confirmation,
                }),
            )
            .await?
            .require_success()?;
        Ok(envelope.message_or("password updated"))
    }

    /// Drop the local session. Purely client-side; the refresh cookie is left
    /// to expire on its own.
    pub fn logout(&self) -> Result<(), ApiError> {
        Ok(self.gateway.store().clear()?)
    }
}
