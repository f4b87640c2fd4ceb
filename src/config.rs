use std::env;
use std::fmt;

use thiserror::Error;

use crate::gateway::{BraintreeConfig, BraintreeEnvironment};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    Missing(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub braintree: BraintreeConfig,
    /// Gate `GET /braintree/token` behind sign-in. Off unless set.
    pub client_token_requires_auth: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("braintree", &self.braintree)
            .field("client_token_requires_auth", &self.client_token_requires_auth)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let environment = match lookup("BRAINTREE_ENVIRONMENT") {
            Some(raw) => raw
                .parse::<BraintreeEnvironment>()
                .map_err(|reason| ConfigError::Invalid {
                    name: "BRAINTREE_ENVIRONMENT",
                    reason,
                })?,
            None => BraintreeEnvironment::Sandbox,
        };

        let client_token_requires_auth = match lookup("CLIENT_TOKEN_REQUIRES_AUTH") {
            Some(raw) => raw.parse::<bool>().map_err(|e| ConfigError::Invalid {
                name: "CLIENT_TOKEN_REQUIRES_AUTH",
                reason: e.to_string(),
            })?,
            None => false,
        };

        Ok(Self {
            host,
            port,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            braintree: BraintreeConfig {
                environment,
                merchant_id: required("BRAINTREE_MERCHANT_ID")?,
                public_key: required("BRAINTREE_PUBLIC_KEY")?,
                private_key: required("BRAINTREE_PRIVATE_KEY")?,
            },
            client_token_requires_auth,
        })
    }
}
