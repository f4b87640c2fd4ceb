//! Bearer-token verification for buyer-facing routes.
//!
//! Tokens are issued by the storefront's login flow (not this service) as
//! HS256 JWTs carrying the user id in `_id`.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::middleware::Next;
use actix_web::{web, HttpMessage};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::order::Buyer;
use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "_id")]
    pub id: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Buyer, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(Buyer::new(data.claims.id))
    }
}

/// Token from `Authorization`, with or without the `Bearer ` prefix.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Middleware: verify the bearer token and attach the [`Buyer`] to the
/// request extensions. Answers 401 itself when the token is missing or bad,
/// so the handler never runs.
pub async fn require_sign_in(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    match authenticate(&req) {
        Ok(buyer) => {
            req.extensions_mut().insert(buyer);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        Err(err) => Ok(req.error_response(err).map_into_right_body()),
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Buyer, AppError> {
    let auth = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| AppError::Internal("auth configuration missing".to_string()))?;

    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    auth.verify(token).map_err(|e| {
        log::warn!("auth.token_rejected path={} error={}", req.path(), e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}
