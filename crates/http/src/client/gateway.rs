//! Outgoing request description and the credential middleware
//!
//! Every call made by [`ApiClient`](super::ApiClient) is described by an
//! [`OutgoingRequest`] and passes through [`attach_credentials`] before it is
//! dispatched. The middleware takes the session snapshot as an argument, so
//! the decision to send a bearer token depends only on its inputs.

use super::ClientError;
use eva_core::Session;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::Value;

/// A single API call, built by the resource wrappers
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingRequest {
    pub method: Method,
    /// Path relative to the base endpoint, e.g. `eventos/3/`
    pub path: String,
    pub body: Option<Value>,
    pub params: Vec<(String, String)>,
}

impl OutgoingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            params: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if `body` cannot be represented as JSON
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append query-string parameters
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Decides which paths may be called without a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPolicy {
    exempt_path: String,
}

impl CredentialPolicy {
    /// Account-creation endpoint, reachable without a session
    pub const ACCOUNT_CREATION_PATH: &'static str = "register/";

    pub fn new(exempt_path: impl Into<String>) -> Self {
        Self {
            exempt_path: normalize(&exempt_path.into()).to_string(),
        }
    }

    /// Whether requests to `path` must go out without credentials
    pub fn is_exempt(&self, path: &str) -> bool {
        normalize(path) == self.exempt_path
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self::new(Self::ACCOUNT_CREATION_PATH)
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_start_matches('/')
}

/// Add `Authorization: Bearer <token>` to `headers` when the session holds a
/// token and `path` is not exempt. Returns whether the header was attached.
///
/// # Errors
///
/// Returns [`ClientError::InvalidHeader`] if the token contains characters that
/// are not allowed in a header value.
pub fn attach_credentials(
    headers: &mut HeaderMap,
    path: &str,
    session: &Session,
    policy: &CredentialPolicy,
) -> Result<bool, ClientError> {
    let Some(token) = session.token() else {
        return Ok(false);
    };
    if policy.is_exempt(path) {
        return Ok(false);
    }

    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_attaches_token_to_collection_paths() {
        let session = Session::from_token("a.b.c");
        let mut headers = HeaderMap::new();

        let attached =
            attach_credentials(&mut headers, "eventos/", &session, &CredentialPolicy::default())
                .unwrap();

        assert!(attached);
        assert_eq!(bearer(&headers), Some("Bearer a.b.c"));
    }

    #[test]
    fn test_skips_account_creation() {
        let session = Session::from_token("a.b.c");
        let policy = CredentialPolicy::default();

        for path in ["register/", "/register/", "register/?next=home"] {
            let mut headers = HeaderMap::new();
            let attached = attach_credentials(&mut headers, path, &session, &policy).unwrap();
            assert!(!attached, "path {path}");
            assert!(headers.get(AUTHORIZATION).is_none());
        }
    }

    #[test]
    fn test_nothing_to_attach_when_logged_out() {
        let mut headers = HeaderMap::new();
        let attached = attach_credentials(
            &mut headers,
            "categorias/",
            &Session::anonymous(),
            &CredentialPolicy::default(),
        )
        .unwrap();

        assert!(!attached);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_rejects_token_with_control_characters() {
        let session = Session::from_token("a.b\nc");
        let mut headers = HeaderMap::new();
        let result =
            attach_credentials(&mut headers, "eventos/", &session, &CredentialPolicy::default());
        assert!(matches!(result, Err(ClientError::InvalidHeader(_))));
    }

    #[test]
    fn test_policy_matches_whole_path() {
        let policy = CredentialPolicy::default();
        assert!(policy.is_exempt("register/"));
        assert!(!policy.is_exempt("eventos/"));
        assert!(!policy.is_exempt("register/extra/"));
        assert!(!policy.is_exempt("token/"));
    }

    #[test]
    fn test_request_builder_helpers() {
        let request = OutgoingRequest::put("eventos/4/")
            .json(&json!({"titulo": "Feria"}))
            .unwrap()
            .params([("page", "2")]);

        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "eventos/4/");
        assert_eq!(request.body, Some(json!({"titulo": "Feria"})));
        assert_eq!(request.params, vec![("page".to_string(), "2".to_string())]);
    }
}
