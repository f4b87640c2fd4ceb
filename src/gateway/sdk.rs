use std::fmt;

use serde_json::{json, Value};

/// `(err, result)` completion, invoked at most once by the SDK.
pub type SdkCallback = Box<dyn FnOnce(Option<SdkError>, Option<Value>) + Send + 'static>;

/// An error object as the SDK reports it. Kept opaque so it can be returned to
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkError(Value);

impl SdkError {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn message(name: &str, message: impl Into<String>) -> Self {
        Self(json!({ "name": name, "message": message.into() }))
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.get("message").and_then(Value::as_str) {
            Some(message) => f.write_str(message),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleOptions {
    pub submit_for_settlement: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleRequest {
    pub amount: f64,
    pub payment_method_nonce: String,
    pub options: SaleOptions,
}

/// A third-party payment SDK with a completion-callback API.
///
/// Either call may panic instead of invoking `done`; callers are expected to
/// guard against that.
pub trait GatewaySdk: Send + Sync + 'static {
    fn generate_client_token(&self, done: SdkCallback);

    fn sale(&self, request: SaleRequest, done: SdkCallback);
}
