use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::application::checkout_service::CheckoutService;
use crate::domain::order::Buyer;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Checkout submission from the storefront. Both fields are optional at this
/// layer: a missing cart is answered with `Invalid cart`, a missing nonce is
/// passed on to the gateway as an empty string.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Payment method nonce from the gateway's drop-in UI.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub nonce: Option<Value>,
    /// Cart lines; each needs a `price`, other fields are stored as sent.
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub cart: Option<Value>,
}

impl PaymentRequest {
    fn nonce_string(&self) -> Option<String> {
        match &self.nonce {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub ok: bool,
}

/// Unparseable payment bodies are treated as an invalid cart.
pub fn payment_json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("checkout.invalid_body error={}", err);
        AppError::InvalidCart.into()
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/v1/product/braintree/token
///
/// Issues a client token for the storefront's drop-in payment UI. The body is
/// the gateway's response, which carries `clientToken`.
#[utoipa::path(
    get,
    path = "/api/v1/product/braintree/token",
    responses(
        (status = 200, description = "Gateway response carrying `clientToken`"),
        (status = 500, description = "Gateway error object"),
    ),
    tag = "payment"
)]
pub async fn braintree_token(checkout: web::Data<CheckoutService>) -> Result<HttpResponse, AppError> {
    let token = checkout.client_token().await?;
    Ok(HttpResponse::Ok().json(token.response))
}

/// POST /api/v1/product/braintree/payment
///
/// Charges the cart total against the nonce and records the order. A 500
/// means the payment must be treated as not completed; it must not be retried
/// automatically.
#[utoipa::path(
    post,
    path = "/api/v1/product/braintree/payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment captured and order recorded", body = PaymentResponse),
        (status = 400, description = "Invalid cart"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Gateway or persistence error"),
    ),
    security(("bearer" = [])),
    tag = "payment"
)]
pub async fn braintree_payment(
    checkout: web::Data<CheckoutService>,
    buyer: Option<web::ReqData<Buyer>>,
    body: web::Json<PaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let nonce = body.nonce_string();

    checkout
        .finalize(buyer.map(web::ReqData::into_inner), nonce, body.cart)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_passed_through_as_text() {
        let req: PaymentRequest = serde_json::from_value(json!({"nonce": "abc"})).unwrap();
        assert_eq!(req.nonce_string(), Some("abc".to_string()));

        let req: PaymentRequest = serde_json::from_value(json!({"nonce": ""})).unwrap();
        assert_eq!(req.nonce_string(), Some(String::new()));

        let req: PaymentRequest = serde_json::from_value(json!({"nonce": 42})).unwrap();
        assert_eq!(req.nonce_string(), Some("42".to_string()));

        let req: PaymentRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.nonce_string(), None);
        assert!(req.cart.is_none());
    }
}
