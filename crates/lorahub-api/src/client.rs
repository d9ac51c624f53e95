// App-server HTTP client
//
// Wraps `reqwest::Client` with LoRa App Server URL construction, JWT
// session handling, and version-aware body shaping. All endpoint
// groups (organizations, applications, devices, etc.) are implemented
// as inherent methods via separate files under `endpoints/` to keep
// this module focused on transport mechanics.

use std::sync::{Arc, RwLock};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::version::ApiVersion;

const AUTH_HEADER: &str = "Grpc-Metadata-Authorization";

/// Admin credentials for the app server's internal login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Raw HTTP client for a LoRa App Server instance.
///
/// Handles login, JWT renewal on session expiry, and the v1/v2 shape
/// differences via its [`ApiVersion`] strategy. Endpoint methods return
/// unwrapped payloads -- the version-specific nesting is stripped
/// before the caller sees it.
pub struct AppServerClient {
    http: reqwest::Client,
    base_url: Url,
    version: Arc<dyn ApiVersion>,
    credentials: Credentials,
    jwt: RwLock<Option<SecretString>>,
}

impl std::fmt::Debug for AppServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServerClient")
            .field("base_url", &self.base_url.as_str())
            .field("version", &self.version.name())
            .field("username", &self.credentials.username)
            .finish_non_exhaustive()
    }
}

impl AppServerClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the app server root (e.g. `https://lora.example:8080`).
    /// No request is made until the first call needs a session.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        version: Arc<dyn ApiVersion>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            version,
            credentials,
            jwt: RwLock::new(None),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Credentials,
        version: Arc<dyn ApiVersion>,
    ) -> Self {
        Self {
            http,
            base_url,
            version,
            credentials,
            jwt: RwLock::new(None),
        }
    }

    /// The app server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The version strategy in effect.
    pub fn version(&self) -> &dyn ApiVersion {
        self.version.as_ref()
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Authenticate against `/api/internal/login` and cache the JWT.
    ///
    /// Safe to call repeatedly; each call replaces the cached token.
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.api_url("internal/login")?;
        debug!(url = %url, version = self.version.name(), "logging in");

        let resp = self
            .http
            .post(url)
            .json(&serde_json::json!({
                "username": self.credentials.username,
                "password": self.credentials.password.expose_secret(),
            }))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Authentication {
                message: extract_error_message(&body)
                    .unwrap_or_else(|| format!("login rejected with HTTP {status}")),
            });
        }

        #[derive(serde::Deserialize)]
        struct LoginResponse {
            jwt: String,
        }

        let login: LoginResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        *self.jwt.write().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Some(SecretString::from(login.jwt));
        Ok(())
    }

    /// Log in only if no session token is cached yet.
    pub async fn ensure_session(&self) -> Result<(), Error> {
        let has_jwt = self
            .jwt
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some();
        if has_jwt {
            return Ok(());
        }
        self.login().await
    }

    fn auth_header_value(&self) -> Result<String, Error> {
        let guard = self
            .jwt
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_ref() {
            Some(jwt) => Ok(self.version.auth_header(jwt.expose_secret())),
            None => Err(Error::SessionExpired),
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    ///
    /// Path segments include remote-supplied ids, so a malformed id
    /// surfaces as `Error::InvalidUrl` rather than a panic.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{path}");
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let body = self.get_raw(path, query).await?;
        serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_string(),
        })
    }

    /// GET a single resource, stripping the v2 nesting under `key`.
    pub(crate) async fn get_resource<T: DeserializeOwned>(
        &self,
        path: &str,
        key: &str,
    ) -> Result<T, Error> {
        let body = self.get_raw(path, &[]).await?;
        let inner = self.version.unwrap_resource(body, key);
        serde_json::from_value(inner.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: inner.to_string(),
        })
    }

    pub(crate) async fn get_raw(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, Error> {
        self.ensure_session().await?;
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .header(AUTH_HEADER, self.auth_header_value()?)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    /// POST a JSON body, wrapping it per the version strategy first.
    ///
    /// `key` names the resource type for v2 nesting (`"application"`,
    /// `"device"`, ...).
    pub(crate) async fn post_resource(
        &self,
        path: &str,
        key: &str,
        resource: &impl Serialize,
    ) -> Result<Value, Error> {
        let value = serde_json::to_value(resource).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        self.post_raw(path, &self.version.wrap_resource(key, value))
            .await
    }

    /// PUT a JSON body, wrapping it per the version strategy first.
    pub(crate) async fn put_resource(
        &self,
        path: &str,
        key: &str,
        resource: &impl Serialize,
    ) -> Result<Value, Error> {
        let value = serde_json::to_value(resource).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;
        self.put_raw(path, &self.version.wrap_resource(key, value))
            .await
    }

    pub(crate) async fn post_raw(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Value, Error> {
        self.ensure_session().await?;
        let url = self.api_url(path)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(AUTH_HEADER, self.auth_header_value()?)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    pub(crate) async fn put_raw(&self, path: &str, body: &impl Serialize) -> Result<Value, Error> {
        self.ensure_session().await?;
        let url = self.api_url(path)?;
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .header(AUTH_HEADER, self.auth_header_value()?)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    /// Send a DELETE request, discarding any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.ensure_session().await?;
        let url = self.api_url(path)?;
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .header(AUTH_HEADER, self.auth_header_value()?)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await.map(|_| ())
    }

    /// Map the response to JSON, converting non-2xx statuses to errors.
    ///
    /// A 401 clears the cached JWT so the next call re-authenticates.
    async fn parse_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            *self
                .jwt
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: extract_error_message(&body)
                    .unwrap_or_else(|| format!("HTTP {status}")),
                status: status.as_u16(),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Parse a create response into the new remote id.
pub(crate) fn created_id(body: Value) -> Result<String, Error> {
    let created: crate::types::CreatedResource =
        serde_json::from_value(body.clone()).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.to_string(),
        })?;
    Ok(created.id)
}

/// Pull a human-readable message out of an app-server error body.
///
/// Both versions report gRPC-gateway style `{ "error": ..., "message":
/// ... }` objects; either field may be missing.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .or_else(|| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::version::V1;

    fn client(base: &str) -> AppServerClient {
        AppServerClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Credentials::new("admin", "admin"),
            Arc::new(V1),
        )
    }

    #[test]
    fn api_url_joins_without_doubling_slashes() {
        let url = client("https://lora.example:8080/").api_url("applications/7");
        assert_eq!(
            url.unwrap().as_str(),
            "https://lora.example:8080/api/applications/7"
        );
    }

    #[test]
    fn api_url_tolerates_hostile_path_segments() {
        // Remote-supplied ids land in the path; odd characters get
        // percent-encoded and anything unparseable comes back as an
        // error, never a panic.
        let url = client("http://lora.example")
            .api_url("devices/{bad id}")
            .unwrap();
        assert_eq!(url.path(), "/api/devices/%7Bbad%20id%7D");
    }

    #[test]
    fn error_message_prefers_error_field() {
        let body = r#"{"error":"object does not exist","message":"fallback","code":5}"#;
        assert_eq!(
            extract_error_message(body).as_deref(),
            Some("object does not exist")
        );
    }

    #[test]
    fn error_message_handles_non_json_bodies() {
        assert_eq!(extract_error_message("<html>bad gateway</html>"), None);
    }
}
