//! Storefront Pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    discounts::{Allocations, allocate},
    fixtures::{Fixture, FixtureError},
    items::{LineItem, ProductId, WeightUnit},
    pricing::{aggregate, compute, price},
    promotions::{
        DiscountStrategy, DiscountType, PromotionId, PromotionRecord, PromotionSnapshot, resolve,
        slabs::{WeightSlab, WeightSlabRecord, WeightSlabs, default_weight_slabs, select_slab},
    },
    receipt::{LineResult, PricingResult, ReceiptError},
    requests::{OrderItemRequest, OrderRequest, RequestError},
};
