use super::errors::DomainError;
use super::order::{Buyer, NewOrder, OrderView};

/// Append-only order storage. Implementations are blocking; async callers
/// should drive them from a blocking pool.
pub trait OrderRepository: Send + Sync + 'static {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError>;
    fn list_for_buyer(&self, buyer: &Buyer) -> Result<Vec<OrderView>, DomainError>;
}
