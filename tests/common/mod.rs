#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use vault_checkout::auth::Claims;
use vault_checkout::domain::errors::DomainError;
use vault_checkout::domain::order::{Buyer, NewOrder, OrderView};
use vault_checkout::domain::ports::OrderRepository;
use vault_checkout::gateway::{GatewayAdapter, GatewaySdk, SaleRequest, SdkCallback, SdkError};
use vault_checkout::CheckoutService;

pub const JWT_SECRET: &str = "test-secret";

/// `Authorization` header value for `buyer`, valid for an hour.
pub fn bearer(buyer: &str) -> String {
    let claims = Claims {
        id: buyer.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes");
    format!("Bearer {}", token)
}

#[derive(Default)]
pub struct MemoryRepo {
    pub orders: Mutex<Vec<OrderView>>,
    pub fail: AtomicBool,
}

impl MemoryRepo {
    pub fn reject_writes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

impl OrderRepository for MemoryRepo {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("write concern timed out".to_string()));
        }
        let now = Utc::now();
        let view = OrderView {
            id: Uuid::new_v4(),
            buyer: order.buyer,
            products: order.products.to_json(),
            payment: order.payment,
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().push(view.clone());
        Ok(view)
    }

    fn list_for_buyer(&self, buyer: &Buyer) -> Result<Vec<OrderView>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|o| &o.buyer == buyer)
            .cloned()
            .collect())
    }
}

/// What the scripted SDK does on every call.
#[derive(Clone)]
pub enum Reply {
    Approve(Value),
    Fail(Value),
    Empty,
    Panic(&'static str),
}

pub struct ScriptedSdk {
    reply: Reply,
    sales: Arc<Mutex<Vec<SaleRequest>>>,
}

impl ScriptedSdk {
    fn play(&self, done: SdkCallback) {
        match self.reply.clone() {
            Reply::Approve(result) => {
                tokio::spawn(async move { done(None, Some(result)) });
            }
            Reply::Fail(err) => done(Some(SdkError::new(err)), None),
            Reply::Empty => done(None, None),
            Reply::Panic(msg) => panic!("{}", msg),
        }
    }
}

impl GatewaySdk for ScriptedSdk {
    fn generate_client_token(&self, done: SdkCallback) {
        match &self.reply {
            Reply::Approve(_) => done(
                None,
                Some(json!({"success": true, "clientToken": "client-token-123"})),
            ),
            _ => self.play(done),
        }
    }

    fn sale(&self, request: SaleRequest, done: SdkCallback) {
        self.sales.lock().unwrap().push(request);
        self.play(done);
    }
}

pub struct Harness {
    pub repo: Arc<MemoryRepo>,
    pub sales: Arc<Mutex<Vec<SaleRequest>>>,
    pub checkout: CheckoutService,
}

/// Real gateway adapter over a scripted SDK, plus a handle on the recorded sales.
pub fn scripted_gateway(reply: Reply) -> (GatewayAdapter<ScriptedSdk>, Arc<Mutex<Vec<SaleRequest>>>) {
    let sales = Arc::new(Mutex::new(Vec::new()));
    let sdk = ScriptedSdk {
        reply,
        sales: Arc::clone(&sales),
    };
    (GatewayAdapter::new(sdk), sales)
}

pub fn harness(reply: Reply) -> Harness {
    let repo = Arc::new(MemoryRepo::default());
    let (gateway, sales) = scripted_gateway(reply);
    let checkout = CheckoutService::new(repo.clone(), Arc::new(gateway));
    Harness {
        repo,
        sales,
        checkout,
    }
}
