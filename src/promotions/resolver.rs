//! Promotion Resolver
//!
//! Decides whether a promotion is usable at a point in time and, if so, which
//! discount strategy it carries. All defaulting of malformed promotion data
//! happens here, so the allocation stage only ever sees validated values.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use tracing::debug;

use crate::promotions::{
    DiscountType, PromotionRecord,
    slabs::{WeightSlabRecord, WeightSlabs, normalize_slabs},
};

/// Resolved discount strategy, one variant per discount type.
#[derive(Debug, Clone)]
pub enum DiscountStrategy {
    /// No discount applies.
    None,

    /// Percentage of each line's subtotal (`Percentage(0.1)` is 10% off).
    Percentage(Percentage),

    /// Fixed amount off per unit purchased.
    Fixed(Decimal),

    /// Weight-tiered discount, allocated across lines by weight share.
    Weighted(WeightSlabs),
}

impl DiscountStrategy {
    /// Whether this strategy can never grant a discount.
    pub fn is_none(&self) -> bool {
        matches!(self, DiscountStrategy::None)
    }
}

/// Resolve an optional promotion into a discount strategy at `now`.
///
/// A missing, disabled or out-of-window promotion, or one without a
/// recognised discount type, resolves to [`DiscountStrategy::None`]. A missing
/// or negative rate or amount resolves to a zero-valued strategy of the
/// promotion's type. `slabs` are only consulted for weighted promotions.
pub fn resolve(
    promotion: Option<&PromotionRecord>,
    slabs: &[WeightSlabRecord],
    now: Timestamp,
) -> DiscountStrategy {
    let Some(promotion) = promotion else {
        return DiscountStrategy::None;
    };

    if !promotion.enabled {
        debug!(promotion_id = %promotion.id, "promotion disabled, no discount applied");

        return DiscountStrategy::None;
    }

    if !promotion.is_within_window(now) {
        debug!(
            promotion_id = %promotion.id,
            start_date = %promotion.start_date,
            end_date = %promotion.end_date,
            %now,
            "promotion outside validity window, no discount applied"
        );

        return DiscountStrategy::None;
    }

    match promotion.discount_type {
        None => {
            debug!(promotion_id = %promotion.id, "promotion has no discount type, no discount applied");

            DiscountStrategy::None
        }
        Some(DiscountType::Percentage) => {
            let rate = non_negative_or_zero(promotion.percentage_rate);

            DiscountStrategy::Percentage(Percentage::from(rate / Decimal::ONE_HUNDRED))
        }
        Some(DiscountType::Fixed) => {
            DiscountStrategy::Fixed(non_negative_or_zero(promotion.fixed_amount_per_unit))
        }
        Some(DiscountType::Weighted) => DiscountStrategy::Weighted(normalize_slabs(slabs)),
    }
}

/// Missing or negative values become zero.
fn non_negative_or_zero(value: Option<Decimal>) -> Decimal {
    value
        .filter(|value| !value.is_sign_negative())
        .unwrap_or_default()
}
