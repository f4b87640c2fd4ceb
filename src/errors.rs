use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::application::checkout_service::CheckoutError;
use crate::domain::errors::DomainError;
use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid cart")]
    InvalidCart,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Persistence error: {0}")]
    Persist(String),

    #[error("Buyer identity missing from request context")]
    Unauthenticated,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::Persist(e.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Unauthenticated => AppError::Unauthenticated,
            CheckoutError::InvalidCart(_) => AppError::InvalidCart,
            CheckoutError::Gateway(err) => AppError::Gateway(err),
            CheckoutError::Persist(err) => err.into(),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::InvalidCart => HttpResponse::BadRequest().json(json!({
                "error": "Invalid cart"
            })),
            // Storefront integrations read the gateway's own error object.
            AppError::Gateway(err) => HttpResponse::InternalServerError().json(err.to_payload()),
            AppError::Persist(message) => HttpResponse::InternalServerError().json(json!({
                "name": "PersistError",
                "message": message
            })),
            AppError::Unauthenticated => HttpResponse::InternalServerError().json(json!({
                "error": self.to_string()
            })),
            AppError::Unauthorized(message) => HttpResponse::Unauthorized().json(json!({
                "error": message
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })),
        }
    }
}
