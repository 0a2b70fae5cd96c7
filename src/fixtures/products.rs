//! Product Fixtures

use rust_decimal::Decimal;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    items::{LineItem, ProductId, WeightUnit},
};

/// Product Fixture
#[derive(Debug, Clone, Deserialize)]
pub struct ProductFixture {
    /// Catalog identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product price (e.g., "2.99 GBP")
    pub price: String,

    /// Shipping weight of one unit, in `weight_unit`
    #[serde(default)]
    pub weight: Decimal,

    /// Unit the weight is recorded in
    #[serde(default)]
    pub weight_unit: WeightUnit,
}

impl ProductFixture {
    /// Build a cart line for `quantity` units of this product.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn line_item(&self, quantity: u32) -> Result<LineItem, FixtureError> {
        let (unit_price, _currency) = parse_price(&self.price)?;

        Ok(LineItem::new(
            self.id,
            self.name.clone(),
            unit_price,
            quantity,
            self.weight_unit.to_grams(self.weight),
        ))
    }
}

/// Parse price string (e.g., "2.99 GBP") into an amount and currency
///
/// The amount keeps whatever precision was written.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number, or if the currency code is not
/// recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((amount, parse_currency(currency_code)?))
}

/// Look up a supported ISO currency by code.
///
/// # Errors
///
/// Returns an error if the code is not one of `GBP`, `USD` or `EUR`.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_keeps_full_precision() -> TestResult {
        let (amount, currency) = parse_price("3.333 GBP")?;

        assert_eq!(amount, dec!(3.333));
        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_non_numeric_amount() {
        let result = parse_price("abc GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn kilogram_weights_are_converted_to_grams() -> TestResult {
        let product: ProductFixture = serde_norway::from_str(
            "id: 4\nname: Rice\nprice: 12.00 GBP\nweight: 1.5\nweight_unit: kg\n",
        )?;

        let item = product.line_item(2)?;

        assert_eq!(item.unit_weight_grams(), dec!(1500));
        assert_eq!(item.line_weight_grams(), dec!(3000));
        assert_eq!(item.line_subtotal(), dec!(24));

        Ok(())
    }

    #[test]
    fn weight_defaults_to_zero_grams() -> TestResult {
        let product: ProductFixture =
            serde_norway::from_str("id: 5\nname: Gift Card\nprice: 10 USD\n")?;

        assert_eq!(product.line_item(1)?.unit_weight_grams(), Decimal::ZERO);

        Ok(())
    }
}
