//! Order: a customer buying a quantity of one product.
//!
//! The product model and unit price are copied into the order when it is
//! placed, so later catalog edits do not rewrite order history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::customer::Customer;
use crate::error::{MiniShopError, ValidationError};
use crate::id::{CustomerId, OrderId, ProductId};
use crate::product::Product;
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub product_model: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub total_price: Decimal,
    pub ordered_at: Timestamp,
}

impl Order {
    /// Prepare an order of `quantity` units of `product` for `customer`.
    ///
    /// Stock is not checked here; see [`Product::ensure_available`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ZeroQuantity`] when `quantity` is zero.
    pub fn for_product(
        customer: &Customer,
        product: &Product,
        quantity: u32,
    ) -> Result<Self, MiniShopError> {
        let order = Self {
            id: OrderId::new(),
            customer_id: customer.id,
            product_id: product.id,
            product_model: product.model.clone(),
            unit_price: product.price,
            quantity,
            total_price: product.price * Decimal::from(quantity),
            ordered_at: now(),
        };
        order.validate()?;
        Ok(order)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniShopError::Validation`] when `quantity` is zero.
    pub fn validate(&self) -> Result<(), MiniShopError> {
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }
        Ok(())
    }
}
