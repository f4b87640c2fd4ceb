//! Payment gateway boundary: the callback-style SDK seam, the adapter that
//! bridges it into futures, and the concrete Braintree SDK.

pub mod adapter;
pub mod braintree;
pub mod sdk;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

pub use adapter::GatewayAdapter;
pub use braintree::{BraintreeConfig, BraintreeEnvironment, BraintreeSdk};
pub use sdk::{GatewaySdk, SaleOptions, SaleRequest, SdkCallback, SdkError};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The SDK reported an error through its callback.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(SdkError),
    /// The SDK panicked before it could report back.
    #[error("Payment gateway threw: {0}")]
    Threw(String),
    /// The SDK answered with neither an error nor a usable result.
    #[error("Payment gateway returned no result")]
    NullResult,
}

impl GatewayError {
    /// The body sent back to the storefront. SDK errors are forwarded as-is.
    pub fn to_payload(&self) -> Value {
        match self {
            GatewayError::Unavailable(err) => err.payload().clone(),
            GatewayError::Threw(message) => json!({
                "name": "GatewayThrew",
                "message": message,
            }),
            GatewayError::NullResult => json!({
                "name": "GatewayNullResult",
                "message": self.to_string(),
            }),
        }
    }
}

/// Opaque gateway response for an approved call. Stored verbatim on the order.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResult(Value);

impl GatewayResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The gateway's own `success` flag, when it sends one. Informational only.
    pub fn success_flag(&self) -> Option<bool> {
        self.0.get("success").and_then(Value::as_bool)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// Credential for the storefront's drop-in UI, plus the full gateway response
/// it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientToken {
    pub token: String,
    pub response: Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn issue_client_token(&self) -> Result<ClientToken, GatewayError>;

    /// Authorize and capture `amount` against the payment method behind `nonce`.
    /// Not idempotent.
    async fn charge_sale(&self, amount: f64, nonce: &str) -> Result<GatewayResult, GatewayError>;
}
