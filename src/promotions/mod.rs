//! Promotions
//!
//! Read-only promotion snapshots as handed over by the persistence layer,
//! plus the resolver that turns them into a [`DiscountStrategy`].

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::promotions::{
    lenient::lenient,
    slabs::{WeightSlabRecord, default_weight_slabs},
};

mod lenient;
pub mod resolver;
pub mod slabs;

pub use resolver::{DiscountStrategy, resolve};

/// Promotion identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromotionId(pub u64);

impl fmt::Display for PromotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discount type recorded on a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Percentage of each line's subtotal
    Percentage,

    /// Fixed amount off per unit purchased
    Fixed,

    /// Weight-tiered slab discount allocated across lines
    Weighted,
}

impl DiscountType {
    /// Wire name of the discount type.
    pub const fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
            DiscountType::Weighted => "weighted",
        }
    }
}

/// Promotion record.
///
/// Numeric fields are read leniently: a value that is missing or is not a
/// number is kept as `None` rather than rejecting the record, and the
/// resolver later degrades it to a zero discount. An unrecognised
/// `discount_type` is likewise read as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    /// Promotion identifier
    pub id: PromotionId,

    /// Promotion title
    #[serde(default)]
    pub title: String,

    /// Discount type, if recognised
    #[serde(default, deserialize_with = "lenient")]
    pub discount_type: Option<DiscountType>,

    /// Percentage rate in percent points (`10` is 10%)
    #[serde(default, deserialize_with = "lenient")]
    pub percentage_rate: Option<Decimal>,

    /// Fixed amount off per unit
    #[serde(default, deserialize_with = "lenient", alias = "fixed_amount")]
    pub fixed_amount_per_unit: Option<Decimal>,

    /// Whether the promotion is switched on
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Start of the validity window (inclusive)
    pub start_date: Timestamp,

    /// End of the validity window (inclusive)
    pub end_date: Timestamp,
}

const fn enabled_by_default() -> bool {
    true
}

impl PromotionRecord {
    /// Whether `now` falls inside the inclusive validity window.
    pub fn is_within_window(&self, now: Timestamp) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// Whether the promotion is enabled and currently valid.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.enabled && self.is_within_window(now)
    }

    /// Human-readable label: the title, falling back to the discount type.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            self.discount_type.map_or("-", DiscountType::as_str)
        } else {
            &self.title
        }
    }
}

/// Immutable promotion snapshot: the record and, for weighted promotions,
/// its slabs, fetched together once before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionSnapshot {
    /// Promotion record
    pub promotion: PromotionRecord,

    /// Weight slabs, ascending by minimum weight
    #[serde(default)]
    pub slabs: Vec<WeightSlabRecord>,
}

impl PromotionSnapshot {
    /// Creates a snapshot from a record and its slabs.
    pub fn new(promotion: PromotionRecord, slabs: Vec<WeightSlabRecord>) -> Self {
        Self { promotion, slabs }
    }

    /// Creates a snapshot for a newly created promotion.
    ///
    /// Weighted promotions are installed with the standard slab table; every
    /// other type carries no slabs.
    pub fn created(promotion: PromotionRecord) -> Self {
        let slabs = if promotion.discount_type == Some(DiscountType::Weighted) {
            default_weight_slabs()
        } else {
            Vec::new()
        };

        Self { promotion, slabs }
    }

    /// Resolve this snapshot into a discount strategy at `now`.
    pub fn resolve(&self, now: Timestamp) -> DiscountStrategy {
        resolve(Some(&self.promotion), &self.slabs, now)
    }

    /// Find the snapshot for `id` among `snapshots`.
    pub fn find(snapshots: &[PromotionSnapshot], id: PromotionId) -> Option<&PromotionSnapshot> {
        snapshots
            .iter()
            .find(|snapshot| snapshot.promotion.id == id)
    }
}
