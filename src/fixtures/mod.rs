//! Fixtures
//!
//! YAML order scenarios: a product catalog, an order placed against it and
//! the promotion snapshots the order may reference.

use std::{
    fs,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    fixtures::products::{ProductFixture, parse_price},
    items::LineItem,
    pricing::compute,
    promotions::{PromotionId, PromotionRecord, PromotionSnapshot, slabs::WeightSlabRecord},
    receipt::PricingResult,
    requests::{OrderItemRequest, OrderRequest, RequestError},
};

pub mod products;

/// Directory order scenarios are read from by default.
pub const DEFAULT_FIXTURES_DIR: &str = "./fixtures/orders";

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded; currency unknown
    #[error("No products loaded; currency unknown")]
    NoCurrency,

    /// The order failed shape validation
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] RequestError),
}

/// Wrapper for an order scenario in YAML
#[derive(Debug, Deserialize)]
struct OrderFixtureFile {
    products: FxHashMap<String, ProductFixture>,
    order: OrderFixture,
    #[serde(default)]
    promotions: Vec<PromotionFixture>,
}

/// Order placed against the fixture's products
#[derive(Debug, Deserialize)]
struct OrderFixture {
    items: Vec<OrderItemFixture>,
    #[serde(default)]
    promotion_id: Option<PromotionId>,
    #[serde(default)]
    shipping_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct OrderItemFixture {
    product: String,
    quantity: u32,
}

/// Promotion with optional slabs. A weighted promotion without a `slabs`
/// key gets the table installed at creation.
#[derive(Debug, Deserialize)]
struct PromotionFixture {
    promotion: PromotionRecord,
    #[serde(default)]
    slabs: Option<Vec<WeightSlabRecord>>,
}

impl From<PromotionFixture> for PromotionSnapshot {
    fn from(fixture: PromotionFixture) -> Self {
        match fixture.slabs {
            Some(slabs) => PromotionSnapshot::new(fixture.promotion, slabs),
            None => PromotionSnapshot::created(fixture.promotion),
        }
    }
}

/// A loaded order scenario.
#[derive(Debug)]
pub struct Fixture {
    name: String,
    currency: &'static Currency,
    request: OrderRequest,
    items: Vec<LineItem>,
    promotions: Vec<PromotionSnapshot>,
}

impl Fixture {
    /// Load `<name>.yml` from the default fixtures directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in(DEFAULT_FIXTURES_DIR, name)
    }

    /// Load `<name>.yml` from `base_path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_set_in(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        Self::from_path(base_path.as_ref().join(format!("{name}.yml")))
    }

    /// Load a scenario from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, FixtureError> {
        let path = path.into();
        let contents = fs::read_to_string(&path)?;

        let name = path
            .file_stem()
            .map_or_else(String::new, |stem| stem.to_string_lossy().into_owned());

        Self::from_yaml(name, &contents)
    }

    /// Parse a scenario from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, references unknown products,
    /// mixes currencies or describes an invalid order.
    pub fn from_yaml(name: impl Into<String>, yaml: &str) -> Result<Self, FixtureError> {
        let fixture: OrderFixtureFile = serde_norway::from_str(yaml)?;

        let mut currency: Option<&'static Currency> = None;

        for product in fixture.products.values() {
            let (_amount, product_currency) = parse_price(&product.price)?;

            // Validate currency consistency
            if let Some(existing_currency) = currency {
                if existing_currency != product_currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        product_currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                currency = Some(product_currency);
            }
        }

        let currency = currency.ok_or(FixtureError::NoCurrency)?;

        let items = fixture
            .order
            .items
            .iter()
            .map(|item| {
                let product = fixture
                    .products
                    .get(&item.product)
                    .ok_or_else(|| FixtureError::ProductNotFound(item.product.clone()))?;

                let line = product.line_item(item.quantity)?;

                Ok(OrderItemRequest {
                    product_id: line.product_id(),
                    name: line.name().to_string(),
                    unit_price: line.unit_price(),
                    quantity: line.quantity(),
                    unit_weight_grams: line.unit_weight_grams(),
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let request = OrderRequest {
            items,
            promotion_id: fixture.order.promotion_id,
            shipping_cost: fixture.order.shipping_cost,
        };

        let items = request.validate()?;

        Ok(Self {
            name: name.into(),
            currency,
            request,
            items,
            promotions: fixture
                .promotions
                .into_iter()
                .map(PromotionSnapshot::from)
                .collect(),
        })
    }

    /// Scenario name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currency shared by every product in the scenario
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The order as it would arrive from a caller
    pub fn request(&self) -> &OrderRequest {
        &self.request
    }

    /// Validated cart lines, in order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Every promotion snapshot defined by the scenario
    pub fn promotions(&self) -> &[PromotionSnapshot] {
        &self.promotions
    }

    /// Snapshot of the promotion the order references, if it exists
    pub fn promotion(&self) -> Option<&PromotionSnapshot> {
        let id = self.request.promotion_id?;
        let snapshot = PromotionSnapshot::find(&self.promotions, id);

        if snapshot.is_none() {
            debug!(promotion_id = %id, "order references unknown promotion");
        }

        snapshot
    }

    /// Price the order at `now`
    pub fn price(&self, now: Timestamp) -> PricingResult {
        compute(
            &self.items,
            self.promotion(),
            self.request.shipping_cost,
            now,
        )
    }
}
