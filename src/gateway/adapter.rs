use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use super::sdk::{GatewaySdk, SaleOptions, SaleRequest, SdkCallback, SdkError};
use super::{ClientToken, GatewayError, GatewayResult, PaymentGateway};

type Completion = (Option<SdkError>, Option<Value>);

/// Turns a callback-style [`GatewaySdk`] into the awaitable [`PaymentGateway`]
/// port. Built once at startup and shared across requests.
pub struct GatewayAdapter<S> {
    sdk: S,
}

impl<S: GatewaySdk> GatewayAdapter<S> {
    pub fn new(sdk: S) -> Self {
        Self { sdk }
    }

    /// Run one SDK call and wait for its completion. Resolves exactly once:
    /// with the callback's outcome, or with an error if the SDK panics or
    /// drops the callback without calling it.
    async fn call<F>(&self, invoke: F) -> Result<Value, GatewayError>
    where
        F: FnOnce(&S, SdkCallback) + Send,
    {
        let (tx, rx) = oneshot::channel::<Completion>();
        let done: SdkCallback = Box::new(move |err, result| {
            // Receiver is gone only if the request was cancelled.
            let _ = tx.send((err, result));
        });

        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| invoke(&self.sdk, done))) {
            return Err(GatewayError::Threw(panic_message(panic.as_ref())));
        }

        match rx.await {
            Ok((Some(err), _)) => Err(GatewayError::Unavailable(err)),
            Ok((None, Some(result))) if !result.is_null() => Ok(result),
            Ok((None, _)) => Err(GatewayError::NullResult),
            Err(_) => Err(GatewayError::Unavailable(SdkError::message(
                "GatewayUnavailable",
                "payment gateway dropped the request without answering",
            ))),
        }
    }
}

#[async_trait]
impl<S: GatewaySdk> PaymentGateway for GatewayAdapter<S> {
    async fn issue_client_token(&self) -> Result<ClientToken, GatewayError> {
        let response = self.call(|sdk, done| sdk.generate_client_token(done)).await?;
        let token = response
            .get("clientToken")
            .and_then(Value::as_str)
            .ok_or(GatewayError::NullResult)?
            .to_string();
        Ok(ClientToken { token, response })
    }

    async fn charge_sale(&self, amount: f64, nonce: &str) -> Result<GatewayResult, GatewayError> {
        let request = SaleRequest {
            amount,
            payment_method_nonce: nonce.to_string(),
            options: SaleOptions {
                submit_for_settlement: true,
            },
        };
        let result = self.call(move |sdk, done| sdk.sale(request, done)).await?;
        Ok(GatewayResult::new(result))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "payment SDK panicked".to_string()
    }
}
