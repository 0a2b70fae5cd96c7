//! Discounts
//!
//! Allocation of a resolved [`DiscountStrategy`] across the lines of a cart.
//! Every allocated line discount lies in `[0, line subtotal]`.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    items::{LineItem, subtotal, total_weight_grams},
    promotions::{
        DiscountStrategy,
        slabs::{WeightSlab, select_slab},
    },
};

/// Per-line discounts, in the same order as the cart lines.
pub type Allocations = SmallVec<[Decimal; 8]>;

/// Compute the discount attributable to each line of `items` under `strategy`.
pub fn allocate(strategy: &DiscountStrategy, items: &[LineItem]) -> Allocations {
    match strategy {
        DiscountStrategy::None => zero_allocations(items),
        DiscountStrategy::Percentage(percent) => items
            .iter()
            .map(|item| {
                let line_subtotal = item.line_subtotal();

                percent_of(percent, line_subtotal)
                    .map_or(line_subtotal, |discount| cap_to_line(discount, line_subtotal))
            })
            .collect(),
        DiscountStrategy::Fixed(amount_per_unit) => items
            .iter()
            .map(|item| {
                let line_subtotal = item.line_subtotal();

                amount_per_unit
                    .checked_mul(Decimal::from(item.quantity()))
                    .map_or(line_subtotal, |discount| cap_to_line(discount, line_subtotal))
            })
            .collect(),
        DiscountStrategy::Weighted(slabs) => allocate_weighted(slabs, items),
    }
}

/// Apply a percentage to an amount. `None` if the product overflows.
pub fn percent_of(percent: &Percentage, amount: Decimal) -> Option<Decimal> {
    (*percent * Decimal::ONE).checked_mul(amount)
}

/// Allocate a slab discount across lines in proportion to their weight.
///
/// The order discount is capped at the cart subtotal before allocation, and an
/// order discount too large to represent counts as the whole subtotal. Each
/// line's share is then capped at its own subtotal; whatever a cap removes is
/// not passed on to other lines.
fn allocate_weighted(slabs: &[WeightSlab], items: &[LineItem]) -> Allocations {
    let total_weight = total_weight_grams(items);

    if total_weight <= Decimal::ZERO {
        debug!("cart has no shipping weight, no weighted discount applied");

        return zero_allocations(items);
    }

    let Some(slab) = select_slab(slabs, total_weight) else {
        debug!(%total_weight, "no weight slab matched, no weighted discount applied");

        return zero_allocations(items);
    };

    let cart_subtotal = subtotal(items);
    let order_discount = slab
        .order_discount(total_weight)
        .map_or(cart_subtotal, |discount| discount.min(cart_subtotal));

    debug!(
        %total_weight,
        slab_min = %slab.min_weight_grams(),
        slab_max = %slab.max_weight_grams(),
        %order_discount,
        "weight slab matched"
    );

    items
        .iter()
        .map(|item| {
            let line_subtotal = item.line_subtotal();

            weight_share(order_discount, item.line_weight_grams(), total_weight)
                .map_or(order_discount.min(line_subtotal), |share| {
                    cap_to_line(share, line_subtotal)
                })
        })
        .collect()
}

/// `order_discount * line_weight / total_weight`. Multiplies first so exact
/// shares stay exact, and divides first only when the product overflows.
fn weight_share(
    order_discount: Decimal,
    line_weight: Decimal,
    total_weight: Decimal,
) -> Option<Decimal> {
    order_discount
        .checked_mul(line_weight)
        .and_then(|scaled| scaled.checked_div(total_weight))
        .or_else(|| {
            order_discount
                .checked_div(total_weight)
                .and_then(|per_gram| per_gram.checked_mul(line_weight))
        })
}

/// Clamp a line discount into `[0, line_subtotal]`.
pub(crate) fn cap_to_line(discount: Decimal, line_subtotal: Decimal) -> Decimal {
    discount.min(line_subtotal).max(Decimal::ZERO)
}

fn zero_allocations(items: &[LineItem]) -> Allocations {
    items.iter().map(|_| Decimal::ZERO).collect()
}
