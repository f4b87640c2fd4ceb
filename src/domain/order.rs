use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity of the authenticated buyer, as attached to the request by the
/// auth middleware. Never taken from the request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Buyer(String);

impl Buyer {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Buyer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated cart line: the submitted object with `price` replaced by its
/// coerced numeric value. Every other field passes through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    price: f64,
    fields: Map<String, Value>,
}

impl CartLine {
    pub(crate) fn new(price: f64, mut fields: Map<String, Value>) -> Self {
        fields.insert("price".to_string(), Value::from(price));
        Self { price, fields }
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// The product reference, under either `productId` or the storefront's `_id`.
    pub fn product_id(&self) -> Option<&str> {
        self.fields
            .get("productId")
            .or_else(|| self.fields.get("_id"))
            .and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for CartLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Non-empty, ordered sequence of validated lines. Only `pricing::price_cart`
/// builds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Cart(Vec<CartLine>);

impl Cart {
    pub(crate) fn from_lines(lines: Vec<CartLine>) -> Option<Self> {
        if lines.is_empty() {
            None
        } else {
            Some(Self(lines))
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The snapshot written to the order's `products` column.
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|line| Value::Object(line.fields.clone()))
                .collect(),
        )
    }
}

/// Order lifecycle. The string forms are shared with the admin tooling and
/// must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Not Process")]
    NotProcess,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "deliverd")]
    Delivered,
    #[serde(rename = "cancel")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotProcess => "Not Process",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "deliverd",
            OrderStatus::Cancelled => "cancel",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Process" => Ok(OrderStatus::NotProcess),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "deliverd" => Ok(OrderStatus::Delivered),
            "cancel" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// An order about to be written. Always starts in `NotProcess`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer: Buyer,
    pub products: Cart,
    pub payment: Value,
    pub status: OrderStatus,
}

impl NewOrder {
    pub fn new(buyer: Buyer, products: Cart, payment: Value) -> Self {
        Self {
            buyer,
            products,
            payment,
            status: OrderStatus::NotProcess,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub buyer: Buyer,
    pub products: Value,
    pub payment: Value,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_strings_match_admin_values() {
        for status in [
            OrderStatus::NotProcess,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                json!(status.as_str())
            );
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("Delivered".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn new_order_starts_not_processed() {
        let cart = Cart::from_lines(vec![CartLine::new(1.0, Map::new())]).unwrap();
        let order = NewOrder::new(Buyer::new("u1"), cart, json!({"success": true}));
        assert_eq!(order.status, OrderStatus::NotProcess);
    }

    #[test]
    fn cart_line_reads_product_id_from_either_key() {
        let mut fields = Map::new();
        fields.insert("_id".into(), json!("p-1"));
        assert_eq!(CartLine::new(0.0, fields).product_id(), Some("p-1"));

        let mut fields = Map::new();
        fields.insert("productId".into(), json!("p-2"));
        fields.insert("_id".into(), json!("p-1"));
        assert_eq!(CartLine::new(0.0, fields).product_id(), Some("p-2"));
    }

    #[test]
    fn cart_serializes_as_snapshot_array() {
        let mut fields = Map::new();
        fields.insert("name".into(), json!("Lamp"));
        let cart = Cart::from_lines(vec![CartLine::new(12.5, fields)]).unwrap();
        assert_eq!(
            serde_json::to_value(&cart).unwrap(),
            json!([{"name": "Lamp", "price": 12.5}])
        );
        assert_eq!(cart.to_json(), serde_json::to_value(&cart).unwrap());
    }
}
