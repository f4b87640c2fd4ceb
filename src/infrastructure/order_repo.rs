use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Buyer, NewOrder, OrderView};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl TryFrom<OrderRow> for OrderView {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| DomainError::Corrupt(format!("order {}: {}", row.id, e)))?;
        Ok(OrderView {
            id: row.id,
            buyer: Buyer::new(row.buyer),
            products: row.products,
            payment: row.payment,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                buyer: order.buyer.as_str().to_string(),
                products: order.products.to_json(),
                payment: order.payment,
                status: order.status.as_str().to_string(),
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;

        row.try_into()
    }

    fn list_for_buyer(&self, buyer: &Buyer) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .filter(orders::buyer.eq(buyer.as_str()))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(OrderView::try_from)
            .collect()
    }
}
