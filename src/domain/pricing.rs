//! Cart validation and sale-amount computation.
//!
//! Prices are taken from the client as submitted. Nothing here looks a product
//! up server-side; the amount charged is exactly the sum of what the
//! storefront sent, after numeric coercion.

use serde_json::Value;
use thiserror::Error;

use super::order::{Cart, CartLine};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid cart")]
pub struct InvalidCart;

#[derive(Debug, Clone, PartialEq)]
pub struct PricedCart {
    pub cart: Cart,
    pub amount: f64,
}

/// Validate a raw cart payload and compute the amount to charge.
///
/// The amount is the plain floating-point sum of the coerced line prices. It is
/// not rounded; the gateway rounds to its own minor unit.
pub fn price_cart(raw: Option<&Value>) -> Result<PricedCart, InvalidCart> {
    let items = match raw {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(InvalidCart),
    };

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(fields) = item else {
            return Err(InvalidCart);
        };
        let price = coerce_price(fields.get("price"));
        lines.push(CartLine::new(price, fields.clone()));
    }

    let amount: f64 = lines.iter().map(CartLine::price).sum();
    // Finite lines can still overflow when summed.
    if !amount.is_finite() {
        return Err(InvalidCart);
    }
    let cart = Cart::from_lines(lines).ok_or(InvalidCart)?;
    Ok(PricedCart { cart, amount })
}

/// Numeric coercion of a submitted price. Anything that does not yield a
/// finite number becomes 0.
pub fn coerce_price(value: Option<&Value>) -> f64 {
    let n = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn sums_numeric_prices() {
        let raw = json!([{"price": 29.99}, {"price": 49.99}]);
        let priced = price_cart(Some(&raw)).unwrap();
        assert!(close(priced.amount, 79.98));
        assert_eq!(priced.cart.len(), 2);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let raw = json!([{"price": "10"}, {"price": " 20 "}]);
        let priced = price_cart(Some(&raw)).unwrap();
        assert!(close(priced.amount, 30.0));
        assert_eq!(priced.cart.lines()[0].fields()["price"], json!(10.0));
    }

    #[test]
    fn non_numeric_price_becomes_zero() {
        let raw = json!([{"price": "abc"}, {"price": 5}]);
        let priced = price_cart(Some(&raw)).unwrap();
        assert!(close(priced.amount, 5.0));
        assert_eq!(priced.cart.lines()[0].price(), 0.0);
    }

    #[test]
    fn missing_and_odd_prices_become_zero() {
        let raw = json!([
            {"name": "no price"},
            {"price": null},
            {"price": [1]},
            {"price": {"amount": 3}},
            {"price": "Infinity"},
            {"price": "NaN"},
            {"price": ""}
        ]);
        let priced = price_cart(Some(&raw)).unwrap();
        assert_eq!(priced.amount, 0.0);
        assert!(priced.cart.lines().iter().all(|l| l.price() == 0.0));
    }

    #[test]
    fn booleans_coerce_to_one_and_zero() {
        assert_eq!(coerce_price(Some(&json!(true))), 1.0);
        assert_eq!(coerce_price(Some(&json!(false))), 0.0);
    }

    #[test]
    fn negative_prices_are_kept() {
        let raw = json!([{"price": 10}, {"price": -4}]);
        let priced = price_cart(Some(&raw)).unwrap();
        assert!(close(priced.amount, 6.0));
    }

    #[test]
    fn rejects_missing_null_empty_and_non_array() {
        assert_eq!(price_cart(None), Err(InvalidCart));
        assert_eq!(price_cart(Some(&Value::Null)), Err(InvalidCart));
        assert_eq!(price_cart(Some(&json!([]))), Err(InvalidCart));
        assert_eq!(price_cart(Some(&json!({"price": 1}))), Err(InvalidCart));
        assert_eq!(price_cart(Some(&json!("cart"))), Err(InvalidCart));
    }

    #[test]
    fn total_that_overflows_is_rejected() {
        let raw = json!([{"price": 1e308}, {"price": 1e308}]);
        assert_eq!(price_cart(Some(&raw)), Err(InvalidCart));
        let raw = json!([{"price": -1e308}, {"price": "-1e308"}]);
        assert_eq!(price_cart(Some(&raw)), Err(InvalidCart));
    }

    #[test]
    fn rejects_non_object_lines() {
        assert_eq!(price_cart(Some(&json!([{"price": 1}, 7]))), Err(InvalidCart));
    }

    #[test]
    fn pass_through_fields_and_line_order_are_preserved() {
        let raw = json!([
            {"_id": "a", "name": "Desk", "price": 100, "photo": "desk.png"},
            {"_id": "b", "name": "Chair", "price": 50}
        ]);
        let priced = price_cart(Some(&raw)).unwrap();
        let lines = priced.cart.lines();
        assert_eq!(lines[0].product_id(), Some("a"));
        assert_eq!(lines[1].product_id(), Some("b"));
        assert_eq!(lines[0].fields()["photo"], json!("desk.png"));
        assert_eq!(lines[1].fields()["name"], json!("Chair"));
    }

    #[test]
    fn pricing_is_pure() {
        let raw = json!([{"price": "1.5"}, {"price": 2}]);
        let first = price_cart(Some(&raw)).unwrap();
        let second = price_cart(Some(&raw)).unwrap();
        assert_eq!(first, second);
        assert_eq!(raw, json!([{"price": "1.5"}, {"price": 2}]));
    }
}
