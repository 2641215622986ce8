//! Eva HTTP client
//!
//! [`ApiClient`] is the single gateway for outbound API calls. It resolves
//! request paths against a fixed base endpoint, sets the JSON content type and
//! runs [`gateway::attach_credentials`] with the current session snapshot.
//! Responses are never retried; error statuses come back as [`ClientError`].

pub mod auth;
pub mod error;
pub mod gateway;
pub mod resource;

pub use error::ClientError;
pub use gateway::{CredentialPolicy, OutgoingRequest, attach_credentials};
pub use resource::Resource;

use eva_core::{ClientConfig, SessionStore};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Collection and endpoint paths, relative to the base URL
pub mod paths {
    pub const EVENTS: &str = "eventos/";
    pub const CATEGORIES: &str = "categorias/";
    pub const PARTICIPANTS: &str = "participantes/";
    pub const REGISTER: &str = "register/";
    pub const TOKEN: &str = "token/";
    pub const ENROLLED_EVENTS: &str = "eventos-inscritos/";
    pub const USERS: &str = "usuarios/";
}

/// Events API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<SessionStore>,
    policy: CredentialPolicy,
}

impl ApiClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).session(session).build()
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is not valid
    pub fn from_config(
        config: &ClientConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, ClientError> {
        let mut builder = Self::builder()
            .base_url(&config.base_url)
            .user_agent(&config.user_agent)
            .session(session);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session store whose token is attached to requests
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Turn an [`OutgoingRequest`] into a ready-to-send request builder
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve against the base URL or
    /// the token is not a valid header value
    pub fn prepare(&self, request: &OutgoingRequest) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = self.base_url.join(request.path.trim_start_matches('/'))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let session = self.session.current();
        let authenticated =
            attach_credentials(&mut headers, &request.path, &session, &self.policy)?;

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated,
            "Dispatching request"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    /// Send a request and return the raw successful response
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx statuses are returned unchanged as [`ClientError`]
    pub async fn send(&self, request: &OutgoingRequest) -> Result<Response, ClientError> {
        let response = self.prepare(request)?.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            debug!(status = status.as_u16(), path = %request.path, "Request rejected");
            Err(ClientError::from_status(status, message))
        }
    }

    /// Send a request and decode its JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]; additionally fails if the body is not the expected JSON
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: &OutgoingRequest,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Send a request whose response body is irrelevant
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`]
    pub async fn execute_empty(&self, request: &OutgoingRequest) -> Result<(), ClientError> {
        self.send(request).await?;
        Ok(())
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    session: Option<Arc<SessionStore>>,
    policy: Option<CredentialPolicy>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the session store that supplies the bearer token
    pub fn session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    /// Override which path is sent without credentials
    pub fn credential_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was set or it does not parse
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Paths are joined onto the base, so it must end with a slash
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| concat!("eva-client/", env!("CARGO_PKG_VERSION")).to_string());
        client_builder = client_builder.user_agent(user_agent);

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            session: self
                .session
                .unwrap_or_else(|| Arc::new(SessionStore::in_memory())),
            policy: self.policy.unwrap_or_default(),
        })
    }
}
