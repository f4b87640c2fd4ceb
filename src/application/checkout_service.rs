use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::domain::order::{Buyer, NewOrder, OrderView};
use crate::domain::ports::OrderRepository;
use crate::domain::pricing::{price_cart, InvalidCart};
use crate::gateway::{ClientToken, GatewayError, PaymentGateway};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Buyer identity missing from request context")]
    Unauthenticated,
    #[error(transparent)]
    InvalidCart(#[from] InvalidCart),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Persist(#[from] DomainError),
}

/// Checkout orchestration: validate and price the cart, charge it, then
/// record the order. Holds only shared, read-only handles.
#[derive(Clone)]
pub struct CheckoutService {
    repo: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(repo: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { repo, gateway }
    }

    pub async fn client_token(&self) -> Result<ClientToken, GatewayError> {
        self.gateway.issue_client_token().await.map_err(|e| {
            log::error!("checkout.client_token_failed error={}", e);
            e
        })
    }

    /// Finalize a checkout. Stages run strictly in order and the first failure
    /// ends the request; an order is written only after the gateway approved
    /// the charge. A failed write after a successful charge is not
    /// compensated.
    pub async fn finalize(
        &self,
        buyer: Option<Buyer>,
        nonce: Option<String>,
        cart: Option<Value>,
    ) -> Result<(), CheckoutError> {
        let Some(buyer) = buyer else {
            log::error!("checkout.unauthenticated");
            return Err(CheckoutError::Unauthenticated);
        };

        let priced = price_cart(cart.as_ref()).map_err(|e| {
            log::warn!("checkout.invalid_cart buyer={}", buyer);
            e
        })?;

        log::debug!(
            "checkout.priced buyer={} products={:?} amount={}",
            buyer,
            priced
                .cart
                .lines()
                .iter()
                .map(|line| line.product_id().unwrap_or("-"))
                .collect::<Vec<_>>(),
            priced.amount
        );

        let nonce = nonce.unwrap_or_default();
        let payment = self
            .gateway
            .charge_sale(priced.amount, &nonce)
            .await
            .map_err(|e| {
                log::error!(
                    "checkout.charge_failed buyer={} amount={} error={}",
                    buyer,
                    priced.amount,
                    e
                );
                e
            })?;

        if payment.success_flag() == Some(false) {
            log::warn!(
                "checkout.charge_declined buyer={} amount={}; recording order with declined result",
                buyer,
                priced.amount
            );
        }

        let order = NewOrder::new(buyer.clone(), priced.cart, payment.as_value().clone());
        let repo = Arc::clone(&self.repo);
        let created = tokio::task::spawn_blocking(move || repo.create(order))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))
            .and_then(|res| res);

        match created {
            Ok(order) => {
                log::info!(
                    "checkout.order_created buyer={} order_id={} amount={}",
                    buyer,
                    order.id,
                    priced.amount
                );
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "checkout.persist_after_charge_failed buyer={} amount={} payment={} error={}",
                    buyer,
                    priced.amount,
                    payment.as_value(),
                    e
                );
                Err(CheckoutError::Persist(e))
            }
        }
    }

    /// Orders belonging to `buyer`, newest first.
    pub async fn orders_for(&self, buyer: Buyer) -> Result<Vec<OrderView>, DomainError> {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || repo.list_for_buyer(&buyer))
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?
    }
}
