//! Braintree GraphQL client exposed through the callback-style [`GatewaySdk`]
//! interface.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use serde_json::{json, Value};

use super::sdk::{GatewaySdk, SaleRequest, SdkCallback, SdkError};

const BRAINTREE_VERSION: &str = "2019-01-01";

const CLIENT_TOKEN_MUTATION: &str = "mutation CreateClientToken($input: CreateClientTokenInput) { \
     createClientToken(input: $input) { clientToken } }";

const CHARGE_MUTATION: &str = "mutation ChargePaymentMethod($input: ChargePaymentMethodInput!) { \
     chargePaymentMethod(input: $input) { transaction { \
     id legacyId status createdAt merchantAccountId \
     amount { value currencyCode } } } }";

const AUTHORIZE_MUTATION: &str = "mutation AuthorizePaymentMethod($input: AuthorizePaymentMethodInput!) { \
     authorizePaymentMethod(input: $input) { transaction { \
     id legacyId status createdAt merchantAccountId \
     amount { value currencyCode } } } }";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraintreeEnvironment {
    Sandbox,
    Production,
}

impl BraintreeEnvironment {
    pub fn graphql_url(&self) -> &'static str {
        match self {
            BraintreeEnvironment::Sandbox => "https://payments.sandbox.braintree-api.com/graphql",
            BraintreeEnvironment::Production => "https://payments.braintree-api.com/graphql",
        }
    }
}

impl FromStr for BraintreeEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(BraintreeEnvironment::Sandbox),
            "production" => Ok(BraintreeEnvironment::Production),
            other => Err(format!("unknown Braintree environment '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct BraintreeConfig {
    pub environment: BraintreeEnvironment,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for BraintreeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BraintreeConfig")
            .field("environment", &self.environment)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &"[REDACTED]")
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    ClientToken,
    Charge,
    Authorize,
}

impl Operation {
    fn field(&self) -> &'static str {
        match self {
            Operation::ClientToken => "createClientToken",
            Operation::Charge => "chargePaymentMethod",
            Operation::Authorize => "authorizePaymentMethod",
        }
    }
}

struct Inner {
    http: reqwest::Client,
    config: BraintreeConfig,
}

/// Talks to Braintree over HTTPS. Each call runs on its own tokio task and
/// reports back through the supplied callback, so it must be used from inside
/// a runtime.
#[derive(Clone)]
pub struct BraintreeSdk {
    inner: Arc<Inner>,
}

impl BraintreeSdk {
    pub fn new(config: BraintreeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: BraintreeConfig) -> Self {
        Self {
            inner: Arc::new(Inner { http, config }),
        }
    }

    fn spawn(&self, operation: Operation, variables: Value, done: SdkCallback) {
        let inner = Arc::clone(&self.inner);
        let query = match operation {
            Operation::ClientToken => CLIENT_TOKEN_MUTATION,
            Operation::Charge => CHARGE_MUTATION,
            Operation::Authorize => AUTHORIZE_MUTATION,
        };
        tokio::spawn(async move {
            log::debug!(
                "braintree.request merchant={} operation={}",
                inner.config.merchant_id,
                operation.field()
            );
            let (err, result) = match inner.post(query, variables).await {
                Ok((status, body)) => interpret_response(operation, status, body),
                Err(e) => (
                    Some(SdkError::new(json!({
                        "name": "BraintreeConnectionError",
                        "message": e.to_string(),
                    }))),
                    None,
                ),
            };
            done(err, result);
        });
    }
}

impl Inner {
    async fn post(&self, query: &str, variables: Value) -> Result<(u16, Value), reqwest::Error> {
        let response = self
            .http
            .post(self.config.environment.graphql_url())
            .basic_auth(&self.config.public_key, Some(&self.config.private_key))
            .header("Braintree-Version", BRAINTREE_VERSION)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        let status = response.status().as_u16();
        // Error pages are not always JSON; keep going with an empty body.
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }
}

impl GatewaySdk for BraintreeSdk {
    fn generate_client_token(&self, done: SdkCallback) {
        self.spawn(Operation::ClientToken, json!({ "input": {} }), done);
    }

    fn sale(&self, request: SaleRequest, done: SdkCallback) {
        let operation = if request.options.submit_for_settlement {
            Operation::Charge
        } else {
            Operation::Authorize
        };
        let Some(amount) = format_amount(request.amount) else {
            done(
                Some(SdkError::new(json!({
                    "name": "BraintreeInvalidAmount",
                    "message": format!("amount {} cannot be charged", request.amount),
                }))),
                None,
            );
            return;
        };
        let variables = json!({
            "input": {
                "paymentMethodId": request.payment_method_nonce,
                "transaction": { "amount": amount },
            }
        });
        self.spawn(operation, variables, done);
    }
}

/// Render an amount the way Braintree expects it: a decimal string with two
/// fractional digits. `None` for amounts that have no decimal form.
pub fn format_amount(amount: f64) -> Option<String> {
    let cents = (BigDecimal::from_f64(amount)? * BigDecimal::from(100))
        .round(0)
        .to_i128()?;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    Some(format!("{}{}.{:02}", sign, cents / 100, cents % 100))
}

/// Map an HTTP exchange onto the SDK's `(err, result)` convention. Transport
/// and authentication failures are errors; GraphQL-level failures such as a
/// processor decline come back as a result with `success: false`.
fn interpret_response(
    operation: Operation,
    status: u16,
    body: Value,
) -> (Option<SdkError>, Option<Value>) {
    let first_message = body
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if !(200..300).contains(&status) {
        let message = first_message.unwrap_or_else(|| format!("HTTP {}", status));
        return (
            Some(SdkError::new(json!({
                "name": "BraintreeHttpError",
                "status": status,
                "message": message,
            }))),
            None,
        );
    }

    if let Some(message) = first_message {
        return (
            None,
            Some(json!({
                "success": false,
                "message": message,
                "errors": body["errors"].clone(),
            })),
        );
    }

    let payload = &body["data"][operation.field()];
    if payload.is_null() {
        return (None, None);
    }

    let result = match operation {
        Operation::ClientToken => json!({
            "success": true,
            "clientToken": payload["clientToken"].clone(),
        }),
        Operation::Charge | Operation::Authorize => json!({
            "success": true,
            "transaction": payload["transaction"].clone(),
        }),
    };
    (None, Some(result))
}
