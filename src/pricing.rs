//! Pricing
//!
//! The order pricing pipeline: resolve the promotion, allocate discounts to
//! lines, then aggregate totals. Every stage is a pure function of its inputs,
//! so the same cart and promotion snapshot always price identically, whichever
//! caller (order creation or dashboard preview) runs it.

use jiff::Timestamp;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::{
    discounts::{allocate, cap_to_line},
    items::LineItem,
    promotions::{DiscountStrategy, PromotionSnapshot},
    receipt::{LineResult, PricingResult},
};

/// Price a cart against an optional promotion snapshot at `now`.
///
/// A promotion that cannot be used (disabled, expired, malformed) contributes
/// no discount; pricing itself never fails.
#[instrument(level = "debug", skip_all, fields(lines = items.len()))]
pub fn compute(
    items: &[LineItem],
    promotion: Option<&PromotionSnapshot>,
    shipping_cost: Option<Decimal>,
    now: Timestamp,
) -> PricingResult {
    let strategy = promotion.map_or(DiscountStrategy::None, |snapshot| snapshot.resolve(now));

    price(items, &strategy, shipping_cost)
}

/// Price a cart against an already resolved strategy.
pub fn price(
    items: &[LineItem],
    strategy: &DiscountStrategy,
    shipping_cost: Option<Decimal>,
) -> PricingResult {
    let allocations = allocate(strategy, items);

    aggregate(items, &allocations, shipping_cost)
}

/// Combine per-line discounts into line results and order totals.
///
/// Each allocation is clamped into `[0, line subtotal]` and lines without an
/// allocation are treated as undiscounted. The summed discount is capped
/// again at the subtotal, shipping is floored at zero and the grand total is
/// never negative.
pub fn aggregate(
    items: &[LineItem],
    allocations: &[Decimal],
    shipping_cost: Option<Decimal>,
) -> PricingResult {
    let lines: Vec<LineResult> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let line_subtotal = item.line_subtotal();
            let allocation = allocations.get(idx).copied().unwrap_or_default();

            LineResult::new(line_subtotal, cap_to_line(allocation, line_subtotal))
        })
        .collect();

    let subtotal: Decimal = lines.iter().map(LineResult::line_subtotal).sum();
    let discount_sum: Decimal = lines.iter().map(LineResult::line_discount).sum();
    let total_discount = discount_sum.min(subtotal);
    let shipping_cost = shipping_cost.unwrap_or_default().max(Decimal::ZERO);
    let grand_total = (subtotal - total_discount + shipping_cost).max(Decimal::ZERO);

    debug!(
        %subtotal,
        %total_discount,
        %shipping_cost,
        %grand_total,
        "order priced"
    );

    PricingResult::new(lines, subtotal, total_discount, shipping_cost, grand_total)
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use crate::{
        items::ProductId,
        promotions::{DiscountType, PromotionId, PromotionRecord},
    };

    use super::*;

    fn cart() -> [LineItem; 1] {
        [LineItem::new(ProductId(1), "Widget", dec!(10), 2, dec!(1500))]
    }

    fn snapshot(discount_type: DiscountType) -> TestResult<PromotionSnapshot> {
        Ok(PromotionSnapshot::created(PromotionRecord {
            id: PromotionId(1),
            title: String::new(),
            discount_type: Some(discount_type),
            percentage_rate: Some(dec!(10)),
            fixed_amount_per_unit: Some(dec!(1)),
            enabled: true,
            start_date: "2026-01-01T00:00:00Z".parse()?,
            end_date: "2026-12-31T00:00:00Z".parse()?,
        }))
    }

    fn now() -> TestResult<Timestamp> {
        Ok("2026-03-01T09:30:00Z".parse()?)
    }

    #[test]
    fn no_promotion_charges_subtotal_plus_shipping() -> TestResult {
        let result = compute(&cart(), None, Some(dec!(5)), now()?);

        assert_eq!(result.subtotal(), dec!(20));
        assert_eq!(result.total_discount(), Decimal::ZERO);
        assert_eq!(result.grand_total(), dec!(25));

        Ok(())
    }

    #[test]
    fn percentage_promotion_discounts_order() -> TestResult {
        let promotion = snapshot(DiscountType::Percentage)?;
        let result = compute(&cart(), Some(&promotion), Some(dec!(5)), now()?);

        assert_eq!(
            result.lines().first().map(LineResult::line_discount),
            Some(dec!(2))
        );
        assert_eq!(result.total_discount(), dec!(2));
        assert_eq!(result.grand_total(), dec!(23));

        Ok(())
    }

    #[test]
    fn weighted_promotion_uses_slabs_from_snapshot() -> TestResult {
        let promotion = snapshot(DiscountType::Weighted)?;
        let result = compute(&cart(), Some(&promotion), None, now()?);

        assert_eq!(result.total_discount(), dec!(12));
        assert_eq!(result.grand_total(), dec!(8));

        Ok(())
    }

    #[test]
    fn expired_promotion_contributes_nothing() -> TestResult {
        let promotion = snapshot(DiscountType::Percentage)?;
        let result = compute(
            &cart(),
            Some(&promotion),
            Some(dec!(5)),
            "2027-02-01T00:00:00Z".parse()?,
        );

        assert_eq!(result.total_discount(), Decimal::ZERO);
        assert_eq!(result.grand_total(), dec!(25));

        Ok(())
    }

    #[test]
    fn negative_shipping_is_treated_as_zero() {
        let result = price(&cart(), &DiscountStrategy::None, Some(dec!(-3)));

        assert_eq!(result.shipping_cost(), Decimal::ZERO);
        assert_eq!(result.grand_total(), dec!(20));
    }

    #[test]
    fn missing_shipping_is_zero() {
        let result = price(&cart(), &DiscountStrategy::None, None);

        assert_eq!(result.shipping_cost(), Decimal::ZERO);
    }

    #[test]
    fn aggregate_clamps_line_allocations() {
        let items = cart();
        let result = aggregate(&items, &[dec!(50)], Some(dec!(5)));

        let line = result.lines().first().cloned();

        assert_eq!(
            line.map(|line| (line.line_discount(), line.line_total())),
            Some((dec!(20), Decimal::ZERO))
        );
        assert_eq!(result.total_discount(), dec!(20));
        assert_eq!(result.grand_total(), dec!(5));
    }

    #[test]
    fn aggregate_treats_negative_allocation_as_zero() {
        let result = aggregate(&cart(), &[dec!(-4)], None);

        assert!(
            result
                .lines()
                .iter()
                .all(|line| line.line_discount() == Decimal::ZERO && line.line_total() == dec!(20))
        );
        assert_eq!(result.grand_total(), dec!(20));
    }

    #[test]
    fn oversized_promotion_amounts_discount_whole_cart() -> TestResult {
        let mut promotion = snapshot(DiscountType::Fixed)?;

        promotion.promotion.fixed_amount_per_unit = Some(Decimal::MAX);
        promotion.promotion.percentage_rate = Some(Decimal::MAX);

        for discount_type in [DiscountType::Fixed, DiscountType::Percentage] {
            promotion.promotion.discount_type = Some(discount_type);

            let result = compute(&cart(), Some(&promotion), Some(dec!(5)), now()?);

            assert!(result.lines().iter().all(|line| {
                line.line_discount() <= line.line_subtotal() && line.line_total() >= Decimal::ZERO
            }));
            assert_eq!(result.total_discount(), dec!(20));
            assert_eq!(result.grand_total(), dec!(5));
        }

        Ok(())
    }

    #[test]
    fn aggregate_treats_missing_allocation_as_zero() {
        let items = [
            LineItem::new(ProductId(1), "A", dec!(3), 1, dec!(0)),
            LineItem::new(ProductId(2), "B", dec!(4), 1, dec!(0)),
        ];
        let result = aggregate(&items, &[dec!(1)], None);

        assert_eq!(result.lines().len(), 2);
        assert_eq!(result.total_discount(), dec!(1));
        assert_eq!(result.grand_total(), dec!(6));
    }

    #[test]
    fn line_totals_subtract_line_discounts() {
        let strategy = DiscountStrategy::Percentage(Percentage::from(dec!(0.25)));
        let result = price(&cart(), &strategy, None);

        let line = result.lines().first().cloned();

        assert_eq!(
            line.map(|line| (line.line_subtotal(), line.line_discount(), line.line_total())),
            Some((dec!(20), dec!(5), dec!(15)))
        );
    }

    #[test]
    fn empty_cart_prices_to_shipping_only() {
        let result = price(&[], &DiscountStrategy::Fixed(dec!(1)), Some(dec!(4)));

        assert!(result.lines().is_empty());
        assert_eq!(result.grand_total(), dec!(4));
    }
}
