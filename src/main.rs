//! Storefront Pricing CLI
//!
//! Loads an order scenario, prices it against the promotion it references and
//! prints either a receipt table or the pricing result as JSON.

use std::{
    io::{self, Write},
    time::Instant,
};

use anyhow::Result;
use humanize_duration::{Truncate, prelude::DurationExt};
use tracing::info;

use storefront_pricing::fixtures::Fixture;

use crate::config::{OutputFormat, PricingConfig};

mod config;
mod observability;

/// Storefront Pricing CLI entry point
pub fn main() -> Result<()> {
    let config = PricingConfig::load();

    observability::init_subscriber(&config.logging)?;

    let fixture = Fixture::from_path(config.fixture_path())?;
    let now = config.evaluation_time();

    info!(fixture = fixture.name(), %now, "pricing order");

    let start = Instant::now();
    let result = fixture.price(now);
    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match config.output {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut handle, &result)?;
            writeln!(handle)?;
        }
        OutputFormat::Table => {
            let label = fixture
                .promotion()
                .map(|snapshot| snapshot.promotion.label());

            result.write_to(&mut handle, fixture.items(), fixture.currency(), label)?;

            writeln!(
                handle,
                " {} ({}s)",
                elapsed.human(Truncate::Nano),
                elapsed.as_secs_f32()
            )?;
        }
    }

    Ok(())
}
