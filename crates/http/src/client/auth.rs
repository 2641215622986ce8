//! Authentication API client methods

use super::{ApiClient, ClientError, OutgoingRequest, paths};
use crate::types::{Credentials, RegisterRequest, TokenPair};
use eva_core::Session;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

impl ApiClient {
    /// Create an account. Sent without credentials even when logged in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        let req = OutgoingRequest::post(paths::REGISTER).json(request)?;
        self.execute(&req).await
    }

    /// Exchange credentials for a token pair without touching the session
    pub async fn obtain_token(&self, credentials: &Credentials) -> Result<TokenPair, ClientError> {
        let req = OutgoingRequest::post(paths::TOKEN).json(credentials)?;
        self.execute(&req).await
    }

    /// Log in and store the access token in the session
    ///
    /// On failure the session is left as it was.
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Arc<Session>, ClientError> {
        let credentials = Credentials {
            username: username.into(),
            password: password.into(),
        };
        let tokens = self.obtain_token(&credentials).await?;
        info!(username = %credentials.username, "Token obtained");

        self.session().login(tokens.access);
        Ok(self.session().current())
    }

    /// Forget the stored token. No request is made.
    pub fn logout(&self) {
        self.session().logout();
    }

    /// Events the logged-in user is enrolled in
    pub async fn enrolled_events(&self) -> Result<Value, ClientError> {
        self.execute(&OutgoingRequest::get(paths::ENROLLED_EVENTS))
            .await
    }

    /// Registered users
    pub async fn users(&self) -> Result<Value, ClientError> {
        self.execute(&OutgoingRequest::get(paths::USERS)).await
    }
}
