//! Order Requests
//!
//! Shape validation for incoming orders. Pricing never fails, so everything
//! that can be wrong with a request is rejected here, before a cart reaches
//! [`crate::pricing::compute`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    items::{LineItem, ProductId},
    promotions::PromotionId,
};

/// Errors raised while validating an order request.
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    /// The order has no items
    #[error("order must contain at least one item")]
    EmptyCart,

    /// A line has a negative unit price
    #[error("item {index} has a negative unit price: {unit_price}")]
    NegativePrice {
        /// Position of the line in the request
        index: usize,
        /// The rejected price
        unit_price: Decimal,
    },

    /// A line has a quantity below one
    #[error("item {index} must have a quantity of at least 1")]
    ZeroQuantity {
        /// Position of the line in the request
        index: usize,
    },

    /// A line has a negative unit weight
    #[error("item {index} has a negative unit weight: {unit_weight_grams}g")]
    NegativeWeight {
        /// Position of the line in the request
        index: usize,
        /// The rejected weight
        unit_weight_grams: Decimal,
    },

    /// The shipping cost is negative
    #[error("shipping cost cannot be negative: {0}")]
    NegativeShipping(Decimal),
}

/// A single requested line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    /// Product being ordered
    pub product_id: ProductId,

    /// Display name at the time of ordering
    #[serde(default)]
    pub name: String,

    /// Price of one unit
    pub unit_price: Decimal,

    /// Number of units
    pub quantity: u32,

    /// Shipping weight of one unit in grams
    #[serde(default)]
    pub unit_weight_grams: Decimal,
}

/// Order creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Requested lines, in cart order
    pub items: Vec<OrderItemRequest>,

    /// Promotion to price the order with
    #[serde(default)]
    pub promotion_id: Option<PromotionId>,

    /// Shipping charged on top of the discounted subtotal
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
}

impl OrderRequest {
    /// Validate the request and convert it into priceable line items.
    ///
    /// # Errors
    ///
    /// Returns the first shape violation found: an empty cart, a negative
    /// price or weight, a zero quantity, or a negative shipping cost.
    pub fn validate(&self) -> Result<Vec<LineItem>, RequestError> {
        if self.items.is_empty() {
            return Err(RequestError::EmptyCart);
        }

        if let Some(shipping_cost) = self.shipping_cost
            && shipping_cost < Decimal::ZERO
        {
            return Err(RequestError::NegativeShipping(shipping_cost));
        }

        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| item.validate(index))
            .collect()
    }
}

impl OrderItemRequest {
    fn validate(&self, index: usize) -> Result<LineItem, RequestError> {
        if self.unit_price < Decimal::ZERO {
            return Err(RequestError::NegativePrice {
                index,
                unit_price: self.unit_price,
            });
        }

        if self.quantity == 0 {
            return Err(RequestError::ZeroQuantity { index });
        }

        if self.unit_weight_grams < Decimal::ZERO {
            return Err(RequestError::NegativeWeight {
                index,
                unit_weight_grams: self.unit_weight_grams,
            });
        }

        Ok(LineItem::new(
            self.product_id,
            self.name.clone(),
            self.unit_price,
            self.quantity,
            self.unit_weight_grams,
        ))
    }
}
