use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout_service::CheckoutService;
use crate::domain::order::{Buyer, OrderStatus, OrderView};
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer: String,
    /// Cart snapshot as it was charged.
    #[schema(value_type = Vec<Object>)]
    pub products: Value,
    /// Gateway result stored at checkout.
    #[schema(value_type = Object)]
    pub payment: Value,
    pub status: OrderStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            buyer: o.buyer.as_str().to_string(),
            products: o.products,
            payment: o.payment,
            status: o.status,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/v1/auth/orders
///
/// Returns the signed-in buyer's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/auth/orders",
    responses(
        (status = 200, description = "Orders of the signed-in buyer", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn buyer_orders(
    checkout: web::Data<CheckoutService>,
    buyer: Option<web::ReqData<Buyer>>,
) -> Result<HttpResponse, AppError> {
    let buyer = buyer
        .map(web::ReqData::into_inner)
        .ok_or(AppError::Unauthenticated)?;

    let orders: Vec<OrderResponse> = checkout
        .orders_for(buyer)
        .await?
        .into_iter()
        .map(OrderResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(orders))
}
