//! Weight Slabs
//!
//! A weighted promotion owns an ordered list of inclusive weight ranges. The
//! cart's total shipping weight selects at most one range, whose per-unit rate
//! converts the weight into an order-level discount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::promotions::lenient::lenient;

/// Upper bound of the open-ended top slab in the standard table (grams).
pub const DEFAULT_MAX_WEIGHT_GRAMS: u64 = 1_000_000_000;

/// Weight slab as stored alongside a weighted promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSlabRecord {
    /// Lower bound of the range in grams (inclusive)
    #[serde(default, deserialize_with = "lenient", alias = "min_weight")]
    pub min_weight_grams: Option<Decimal>,

    /// Upper bound of the range in grams (inclusive)
    #[serde(default, deserialize_with = "lenient", alias = "max_weight")]
    pub max_weight_grams: Option<Decimal>,

    /// Size of one discount unit in grams
    #[serde(default, deserialize_with = "lenient", alias = "unit_weight")]
    pub unit_weight_grams: Option<Decimal>,

    /// Discount granted per unit
    #[serde(default, deserialize_with = "lenient", alias = "unit_discount")]
    pub unit_discount_amount: Option<Decimal>,
}

impl WeightSlabRecord {
    /// Creates a fully populated slab record.
    pub fn new(
        min_weight_grams: Decimal,
        max_weight_grams: Decimal,
        unit_weight_grams: Decimal,
        unit_discount_amount: Decimal,
    ) -> Self {
        Self {
            min_weight_grams: Some(min_weight_grams),
            max_weight_grams: Some(max_weight_grams),
            unit_weight_grams: Some(unit_weight_grams),
            unit_discount_amount: Some(unit_discount_amount),
        }
    }
}

/// The slab table installed when a weighted promotion is created.
pub fn default_weight_slabs() -> Vec<WeightSlabRecord> {
    let unit_weight = Decimal::from(500);

    [
        (1_000, 5_500, 2),
        (6_000, 8_500, 3),
        (9_000, 11_500, 4),
        (12_000, DEFAULT_MAX_WEIGHT_GRAMS, 5),
    ]
    .into_iter()
    .map(|(min, max, discount)| {
        WeightSlabRecord::new(
            Decimal::from(min),
            Decimal::from(max),
            unit_weight,
            Decimal::from(discount),
        )
    })
    .collect()
}

/// Per-unit rate of a slab. Both parts are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabRate {
    unit_weight_grams: Decimal,
    unit_discount_amount: Decimal,
}

impl SlabRate {
    /// Creates a rate, or `None` unless both parts are strictly positive.
    pub fn new(unit_weight_grams: Decimal, unit_discount_amount: Decimal) -> Option<Self> {
        (unit_weight_grams > Decimal::ZERO && unit_discount_amount > Decimal::ZERO).then_some(
            Self {
                unit_weight_grams,
                unit_discount_amount,
            },
        )
    }

    /// Size of one discount unit in grams.
    pub fn unit_weight_grams(&self) -> Decimal {
        self.unit_weight_grams
    }

    /// Discount granted per unit.
    pub fn unit_discount_amount(&self) -> Decimal {
        self.unit_discount_amount
    }

    /// Whole discount units in `total_weight_grams`, never fewer than one.
    /// `None` if the count does not fit a `Decimal`.
    pub fn discount_units(&self, total_weight_grams: Decimal) -> Option<Decimal> {
        total_weight_grams
            .checked_div(self.unit_weight_grams)
            .map(|units| units.floor().max(Decimal::ONE))
    }

    /// Order-level discount for `total_weight_grams`, before any cap.
    /// `None` if the discount does not fit a `Decimal`.
    pub fn order_discount(&self, total_weight_grams: Decimal) -> Option<Decimal> {
        self.discount_units(total_weight_grams)?
            .checked_mul(self.unit_discount_amount)
    }
}

/// A normalised weight slab.
///
/// A slab without a usable rate still occupies its range: it matches, but
/// grants nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSlab {
    min_weight_grams: Decimal,
    max_weight_grams: Decimal,
    rate: Option<SlabRate>,
}

impl WeightSlab {
    /// Creates a slab covering `[min_weight_grams, max_weight_grams]`.
    pub fn new(
        min_weight_grams: Decimal,
        max_weight_grams: Decimal,
        unit_weight_grams: Decimal,
        unit_discount_amount: Decimal,
    ) -> Self {
        Self {
            min_weight_grams,
            max_weight_grams,
            rate: SlabRate::new(unit_weight_grams, unit_discount_amount),
        }
    }

    /// Normalise a stored record. Records without both bounds can never
    /// match any weight and yield `None`.
    pub fn from_record(record: &WeightSlabRecord) -> Option<Self> {
        let min_weight_grams = record.min_weight_grams?;
        let max_weight_grams = record.max_weight_grams?;

        let rate = record
            .unit_weight_grams
            .zip(record.unit_discount_amount)
            .and_then(|(unit_weight, unit_discount)| SlabRate::new(unit_weight, unit_discount));

        Some(Self {
            min_weight_grams,
            max_weight_grams,
            rate,
        })
    }

    /// Lower bound in grams (inclusive).
    pub fn min_weight_grams(&self) -> Decimal {
        self.min_weight_grams
    }

    /// Upper bound in grams (inclusive).
    pub fn max_weight_grams(&self) -> Decimal {
        self.max_weight_grams
    }

    /// Per-unit rate, if usable.
    pub fn rate(&self) -> Option<&SlabRate> {
        self.rate.as_ref()
    }

    /// Whether `weight_grams` lies within this slab, both bounds inclusive.
    pub fn contains(&self, weight_grams: Decimal) -> bool {
        self.min_weight_grams <= weight_grams && weight_grams <= self.max_weight_grams
    }

    /// Order-level discount this slab grants for `total_weight_grams`: zero
    /// without a usable rate, `None` if it overflows.
    pub fn order_discount(&self, total_weight_grams: Decimal) -> Option<Decimal> {
        self.rate
            .as_ref()
            .map_or(Some(Decimal::ZERO), |rate| rate.order_discount(total_weight_grams))
    }
}

/// Normalised slabs of a single promotion.
pub type WeightSlabs = SmallVec<[WeightSlab; 4]>;

/// Normalise stored records, ordered ascending by minimum weight.
///
/// The sort is stable, so records that share a lower bound keep their stored
/// order and first-match-wins still holds.
pub fn normalize_slabs(records: &[WeightSlabRecord]) -> WeightSlabs {
    let mut slabs: WeightSlabs = records.iter().filter_map(WeightSlab::from_record).collect();

    slabs.sort_by_key(|slab| slab.min_weight_grams);

    slabs
}

/// Find the first slab whose inclusive range contains `total_weight_grams`.
///
/// There is no interpolation between slabs: a weight in a gap, or beyond the
/// last slab, selects nothing.
pub fn select_slab(slabs: &[WeightSlab], total_weight_grams: Decimal) -> Option<&WeightSlab> {
    let slab = slabs.iter().find(|slab| slab.contains(total_weight_grams));

    trace!(
        %total_weight_grams,
        matched = slab.is_some(),
        "weight slab selection"
    );

    slab
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn standard_slabs() -> WeightSlabs {
        normalize_slabs(&default_weight_slabs())
    }

    #[test]
    fn selects_slab_at_lower_bound() {
        let slabs = standard_slabs();
        let slab = select_slab(&slabs, dec!(6000));

        assert_eq!(slab.map(WeightSlab::min_weight_grams), Some(dec!(6000)));
    }

    #[test]
    fn selects_slab_at_upper_bound() {
        let slabs = standard_slabs();
        let slab = select_slab(&slabs, dec!(5500));

        assert_eq!(slab.map(WeightSlab::min_weight_grams), Some(dec!(1000)));
    }

    #[test]
    fn weight_in_gap_selects_nothing() {
        let slabs = standard_slabs();

        assert!(select_slab(&slabs, dec!(5750)).is_none());
        assert!(select_slab(&slabs, dec!(5500.01)).is_none());
    }

    #[test]
    fn zero_and_oversized_weights_select_nothing() {
        let slabs = standard_slabs();

        assert!(select_slab(&slabs, Decimal::ZERO).is_none());
        assert!(select_slab(&slabs, dec!(999)).is_none());
        assert!(select_slab(&slabs, dec!(1000000001)).is_none());
    }

    #[test]
    fn first_matching_slab_wins_on_overlap() {
        let slabs: WeightSlabs = [
            WeightSlab::new(dec!(0), dec!(2000), dec!(100), dec!(1)),
            WeightSlab::new(dec!(1000), dec!(3000), dec!(100), dec!(9)),
        ]
        .into_iter()
        .collect();

        let slab = select_slab(&slabs, dec!(1500));

        assert_eq!(
            slab.and_then(WeightSlab::rate)
                .map(SlabRate::unit_discount_amount),
            Some(dec!(1))
        );
    }

    #[test]
    fn normalize_orders_by_minimum_weight_and_drops_unbounded_records() {
        let records = [
            WeightSlabRecord::new(dec!(6000), dec!(8500), dec!(500), dec!(3)),
            WeightSlabRecord {
                min_weight_grams: None,
                ..WeightSlabRecord::new(dec!(0), dec!(100), dec!(1), dec!(1))
            },
            WeightSlabRecord::new(dec!(1000), dec!(5500), dec!(500), dec!(2)),
        ];

        let slabs = normalize_slabs(&records);
        let mins: Vec<Decimal> = slabs.iter().map(WeightSlab::min_weight_grams).collect();

        assert_eq!(mins, vec![dec!(1000), dec!(6000)]);
    }

    #[test]
    fn slab_without_usable_rate_matches_but_grants_nothing() -> TestResult {
        let record = WeightSlabRecord {
            unit_weight_grams: Some(Decimal::ZERO),
            ..WeightSlabRecord::new(dec!(1000), dec!(5000), dec!(500), dec!(2))
        };

        let slab = WeightSlab::from_record(&record).ok_or("bounded slab should normalise")?;

        assert!(slab.contains(dec!(3000)));
        assert!(slab.rate().is_none());
        assert_eq!(slab.order_discount(dec!(3000)), Some(Decimal::ZERO));

        Ok(())
    }

    #[test]
    fn discount_units_floor_whole_units() -> TestResult {
        let rate = SlabRate::new(dec!(500), dec!(2)).ok_or("positive rate")?;

        assert_eq!(rate.discount_units(dec!(3000)), Some(dec!(6)));
        assert_eq!(rate.discount_units(dec!(3499)), Some(dec!(6)));
        assert_eq!(rate.order_discount(dec!(3000)), Some(dec!(12)));

        Ok(())
    }

    #[test]
    fn discount_units_never_fall_below_one() -> TestResult {
        let rate = SlabRate::new(dec!(500), dec!(2)).ok_or("positive rate")?;

        assert_eq!(rate.discount_units(dec!(120)), Some(Decimal::ONE));
        assert_eq!(rate.order_discount(dec!(120)), Some(dec!(2)));

        Ok(())
    }

    #[test]
    fn order_discount_past_decimal_range_is_none() -> TestResult {
        let rate = SlabRate::new(dec!(0.001), dec!(10000000000000000000000000000))
            .ok_or("positive rate")?;

        assert_eq!(rate.discount_units(dec!(1500)), Some(dec!(1500000)));
        assert_eq!(rate.order_discount(dec!(1500)), None);

        Ok(())
    }

    #[test]
    fn rate_requires_strictly_positive_parts() {
        assert!(SlabRate::new(Decimal::ZERO, dec!(2)).is_none());
        assert!(SlabRate::new(dec!(500), Decimal::ZERO).is_none());
        assert!(SlabRate::new(dec!(-500), dec!(2)).is_none());
    }

    #[test]
    fn record_reads_short_column_names() -> TestResult {
        let yaml = "min_weight: 1000\nmax_weight: 5500\nunit_weight: 500\nunit_discount: 2\n";
        let record: WeightSlabRecord = serde_norway::from_str(yaml)?;

        assert_eq!(
            record,
            WeightSlabRecord::new(dec!(1000), dec!(5500), dec!(500), dec!(2))
        );

        Ok(())
    }
}
