use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::NabuError;

/// Principal/service/password triple handed to the credential-exchange
/// collaborator when the negotiated mode is configured.
#[derive(Clone, PartialEq, Eq)]
pub struct ServicePrincipal {
    pub principal: String,
    pub service: String,
    pub password: String,
}

impl ServicePrincipal {
    /// Shapes the service principal for a gateway host, `HTTP@<host>`.
    pub fn for_host(
        principal: impl Into<String>,
        host: &str,
        password: impl Into<String>,
    ) -> ServicePrincipal {
        ServicePrincipal {
            principal: principal.into(),
            service: format!("HTTP@{host}"),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("principal", &self.principal)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

/// Collaborator that negotiates a bearer token for the configured principal.
///
/// A failure here is fatal for the connection attempt and is surfaced
/// immediately with no retry.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn token(&self) -> Result<String, NabuError>;
}

/// How requests to the gateway authenticate.
#[derive(Clone)]
pub enum AuthMode {
    /// No Authorization header.
    None,
    /// Static `Basic` header built from username and password.
    Basic { username: String, password: String },
    /// `Negotiate` header carrying a token from the credential-exchange
    /// collaborator, fetched per request.
    Negotiate(Arc<dyn CredentialExchange>),
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Negotiate(_) => write!(f, "Negotiate"),
        }
    }
}

impl AuthMode {
    /// The Authorization header value for one request, if any.
    pub async fn authorization(&self) -> Result<Option<String>, NabuError> {
        match self {
            AuthMode::None => Ok(None),
            AuthMode::Basic { username, password } => {
                let credentials = BASE64.encode(format!("{username}:{password}"));
                Ok(Some(format!("Basic {credentials}")))
            }
            AuthMode::Negotiate(exchange) => {
                let token = exchange.token().await?;
                Ok(Some(format!("Negotiate {token}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticExchange(Result<String, String>);

    #[async_trait]
    impl CredentialExchange for StaticExchange {
        async fn token(&self) -> Result<String, NabuError> {
            self.0
                .clone()
                .map_err(NabuError::Auth)
        }
    }

    #[tokio::test]
    async fn test_no_auth_sends_no_header() {
        assert_eq!(AuthMode::None.authorization().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_basic_auth_header() {
        let mode = AuthMode::Basic {
            username: "scout".into(),
            password: "secret".into(),
        };

        let header = mode.authorization().await.unwrap().unwrap();
        assert_eq!(header, format!("Basic {}", BASE64.encode("scout:secret")));
    }

    #[tokio::test]
    async fn test_negotiate_header_carries_exchanged_token() {
        let mode = AuthMode::Negotiate(Arc::new(StaticExchange(Ok("tok-123".into()))));

        let header = mode.authorization().await.unwrap().unwrap();
        assert_eq!(header, "Negotiate tok-123");
    }

    #[tokio::test]
    async fn test_exchange_fault_surfaces_immediately() {
        let mode = AuthMode::Negotiate(Arc::new(StaticExchange(Err("no ticket".into()))));

        assert!(matches!(
            mode.authorization().await,
            Err(NabuError::Auth(_))
        ));
    }

    #[test]
    fn test_service_principal_shaping() {
        let principal = ServicePrincipal::for_host("scout@REALM", "gateway.internal", "pw");
        assert_eq!(principal.service, "HTTP@gateway.internal");
    }
}
