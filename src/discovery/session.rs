use uuid::Uuid;

use crate::{discovery::auth::AuthMode, error::NabuError};

/// Connection context for one gateway: scheme, host, port, and auth mode.
///
/// Every operation takes the session explicitly, so independent connections
/// can run side by side with no shared state. A session holds no live socket;
/// the transport collaborator owns those. Dropping the session ends its
/// lifecycle.
#[derive(Clone, Debug)]
pub struct Session {
    session_id: String,
    host: String,
    port: u16,
    https: bool,
    auth: AuthMode,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for a gateway path.
    pub fn endpoint(&self, path: &str) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, path)
    }

    /// Headers for one request: JSON accept/cache directives plus the
    /// Authorization header for the configured mode. Negotiated tokens are
    /// exchanged per request.
    pub async fn request_headers(&self) -> Result<Vec<(String, String)>, NabuError> {
        let mut headers = vec![
            ("Accept".to_owned(), "application/json".to_owned()),
            ("Cache-Control".to_owned(), "no-cache".to_owned()),
        ];

        if let Some(authorization) = self.auth.authorization().await? {
            headers.push(("Authorization".to_owned(), authorization));
        }

        Ok(headers)
    }

    /// Proves the configured credentials can produce a header. For the
    /// negotiated mode this performs one token exchange; an auth fault here
    /// is fatal for the connection attempt.
    pub async fn open(self) -> Result<Session, NabuError> {
        self.auth.authorization().await?;
        Ok(self)
    }

    pub fn close(self) {}
}

#[derive(Debug, Default)]
pub struct SessionBuilder {
    host: Option<String>,
    port: Option<u16>,
    https: bool,
    auth: Option<AuthMode>,
}

impl SessionBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn build(self) -> Result<Session, NabuError> {
        let host = validate_host(self.host)?;

        let port = self
            .port
            .ok_or(NabuError::Missing("Port cannot be empty".into()))?;
        validate_port(port)?;

        let auth = self.auth.unwrap_or(AuthMode::None);
        if let AuthMode::Basic { username, password } = &auth {
            validate_credentials(username, password)?;
        }

        Ok(Session {
            session_id: format!("{}-{}", host, Uuid::now_v7()),
            host,
            port,
            https: self.https,
            auth,
        })
    }
}

/// The `validate_host` function runs specific validations on the gateway host.
///
/// Returns:
///
/// A String Result on success or NabuError if validation fails.
fn validate_host(host: Option<String>) -> Result<String, NabuError> {
    let host = host.ok_or(NabuError::Missing("Host cannot be empty".into()))?;

    if host.trim().is_empty() {
        return Err(NabuError::Missing("Host cannot be empty string".into()));
    }

    if host.contains(|c: char| c.is_whitespace() || c == '@' || c == '/') {
        return Err(NabuError::Invalid(
            "Host contains invalid characters".into(),
        ));
    }

    Ok(host)
}

/// The `validate_port` function runs specific validations on the gateway port.
///
/// Returns:
///
/// A Result of unit on success or NabuError if validation fails.
fn validate_port(port: u16) -> Result<(), NabuError> {
    if port == 0 {
        return Err(NabuError::Invalid("Port cannot be 0".into()));
    }
    Ok(())
}

/// The `validate_credentials` function runs specific validations on static
/// basic-auth credentials.
///
/// Returns:
///
/// A Result of unit on success or NabuError if validation fails.
fn validate_credentials(username: &str, password: &str) -> Result<(), NabuError> {
    if username.trim().is_empty() {
        return Err(NabuError::Missing("Username cannot be empty".into()));
    }

    if password.trim().is_empty() {
        return Err(NabuError::Missing("Password cannot be empty".into()));
    }

    Ok(())
}
