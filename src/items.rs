//! Items

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier.
///
/// Opaque to the engine; it is carried through so callers can line results
/// back up with their catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit a product's weight was recorded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Grams (`g`)
    #[default]
    #[serde(alias = "g")]
    Grams,

    /// Kilograms (`kg`)
    #[serde(alias = "kg")]
    Kilograms,
}

impl WeightUnit {
    /// Convert a weight recorded in this unit into grams.
    pub fn to_grams(self, value: Decimal) -> Decimal {
        match self {
            WeightUnit::Grams => value,
            WeightUnit::Kilograms => value * Decimal::ONE_THOUSAND,
        }
    }
}

/// A single cart entry, already shape-validated by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    product_id: ProductId,
    name: String,
    unit_price: Decimal,
    quantity: u32,
    unit_weight_grams: Decimal,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        unit_weight_grams: Decimal,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            unit_weight_grams,
        }
    }

    /// Returns the product identifier.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unit price.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Returns the quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the weight of a single unit in grams.
    pub fn unit_weight_grams(&self) -> Decimal {
        self.unit_weight_grams
    }

    /// Price of the whole line before any discount.
    pub fn line_subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Shipping weight of the whole line in grams.
    pub fn line_weight_grams(&self) -> Decimal {
        self.unit_weight_grams * Decimal::from(self.quantity)
    }
}

/// Sum of every line's subtotal.
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::line_subtotal).sum()
}

/// Total shipment weight of the cart in grams.
pub fn total_weight_grams(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::line_weight_grams).sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn item(unit_price: Decimal, quantity: u32, unit_weight_grams: Decimal) -> LineItem {
        LineItem::new(ProductId(1), "Flour", unit_price, quantity, unit_weight_grams)
    }

    #[test]
    fn line_subtotal_multiplies_price_by_quantity() {
        assert_eq!(item(dec!(2.50), 3, dec!(0)).line_subtotal(), dec!(7.50));
    }

    #[test]
    fn line_weight_multiplies_unit_weight_by_quantity() {
        assert_eq!(item(dec!(1), 2, dec!(1500)).line_weight_grams(), dec!(3000));
    }

    #[test]
    fn cart_totals_sum_every_line() {
        let items = [item(dec!(10), 2, dec!(250)), item(dec!(4.25), 1, dec!(100))];

        assert_eq!(subtotal(&items), dec!(24.25));
        assert_eq!(total_weight_grams(&items), dec!(600));
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
        assert_eq!(total_weight_grams(&[]), Decimal::ZERO);
    }

    #[test]
    fn kilograms_convert_to_grams() {
        assert_eq!(WeightUnit::Kilograms.to_grams(dec!(1.5)), dec!(1500));
        assert_eq!(WeightUnit::Grams.to_grams(dec!(1.5)), dec!(1.5));
    }
}
