//! Receipt
//!
//! The priced order as returned to both the persistence layer and the API
//! caller, plus a console rendering of it.

use std::io;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::items::{LineItem, total_weight_grams};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The result does not have one line per cart item.
    #[error("receipt has {lines} lines but the cart has {items} items")]
    LineCountMismatch {
        /// Number of cart items
        items: usize,
        /// Number of priced lines
        lines: usize,
    },

    /// An amount cannot be represented in the currency's minor units.
    #[error("amount {0} cannot be represented in minor units")]
    AmountOutOfRange(Decimal),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Pricing of a single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineResult {
    line_subtotal: Decimal,
    line_discount: Decimal,
    line_total: Decimal,
}

impl LineResult {
    /// Create a line result; the line total is the subtotal less the discount.
    pub fn new(line_subtotal: Decimal, line_discount: Decimal) -> Self {
        Self {
            line_subtotal,
            line_discount,
            line_total: line_subtotal - line_discount,
        }
    }

    /// Price of the line before discount.
    pub fn line_subtotal(&self) -> Decimal {
        self.line_subtotal
    }

    /// Discount attributed to the line.
    pub fn line_discount(&self) -> Decimal {
        self.line_discount
    }

    /// Price of the line after discount.
    pub fn line_total(&self) -> Decimal {
        self.line_total
    }
}

/// Priced order: one [`LineResult`] per cart item, in cart order, plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    lines: Vec<LineResult>,
    subtotal: Decimal,
    total_discount: Decimal,
    shipping_cost: Decimal,
    grand_total: Decimal,
}

impl PricingResult {
    /// Create a pricing result from already aggregated values.
    pub fn new(
        lines: Vec<LineResult>,
        subtotal: Decimal,
        total_discount: Decimal,
        shipping_cost: Decimal,
        grand_total: Decimal,
    ) -> Self {
        Self {
            lines,
            subtotal,
            total_discount,
            shipping_cost,
            grand_total,
        }
    }

    /// Line results, in cart order.
    pub fn lines(&self) -> &[LineResult] {
        &self.lines
    }

    /// Sum of line subtotals.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Order discount, never more than the subtotal.
    pub fn total_discount(&self) -> Decimal {
        self.total_discount
    }

    /// Shipping charged, never negative.
    pub fn shipping_cost(&self) -> Decimal {
        self.shipping_cost
    }

    /// Amount payable, never negative.
    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    /// Prints the receipt for `items` in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if `items` does not line up with the priced lines, an
    /// amount does not fit the currency's minor units, or writing fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        items: &[LineItem],
        currency: &'static Currency,
        promotion_label: Option<&str>,
    ) -> Result<(), ReceiptError> {
        if items.len() != self.lines.len() {
            return Err(ReceiptError::LineCountMismatch {
                items: items.len(),
                lines: self.lines.len(),
            });
        }

        let mut builder = Builder::default();
        let mut color_ops: SmallVec<[(usize, usize, Color); 16]> = smallvec![];

        push_receipt_header(&mut builder);

        for (idx, (item, line)) in items.iter().zip(&self.lines).enumerate() {
            let row = idx + 1;

            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.name().to_string(),
                item.quantity().to_string(),
                format_weight(item.line_weight_grams()),
                money(item.unit_price(), currency)?.to_string(),
                money(line.line_subtotal(), currency)?.to_string(),
                format_discount(line.line_discount(), currency)?,
                money(line.line_total(), currency)?.to_string(),
            ]);

            color_ops.push((row, 3, Color::new(DARK_GREY, RESET)));

            if line.line_discount() > Decimal::ZERO {
                color_ops.push((row, 6, Color::FG_GREEN));
            }
        }

        write_receipt_table(&mut out, builder, color_ops)?;

        write_receipt_summary(
            &mut out,
            self,
            currency,
            promotion_label,
            total_weight_grams(items),
        )
    }
}

fn push_receipt_header(builder: &mut Builder) {
    builder.push_record([
        "",
        "Item",
        "Qty",
        "Weight",
        "Unit Price",
        "Subtotal",
        "Discount",
        "Total",
    ]);
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: SmallVec<[(usize, usize, Color); 16]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..8), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = dim_frame(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    result: &PricingResult,
    currency: &'static Currency,
    promotion_label: Option<&str>,
    total_weight: Decimal,
) -> Result<(), ReceiptError> {
    let rows = [
        ("Promotion:", promotion_label.unwrap_or("-").to_string(), false),
        ("Weight:", format_weight(total_weight), false),
        ("Subtotal:", money(result.subtotal(), currency)?.to_string(), false),
        ("Discount:", format_discount(result.total_discount(), currency)?, false),
        ("Shipping:", money(result.shipping_cost(), currency)?.to_string(), false),
        ("Total:", money(result.grand_total(), currency)?.to_string(), true),
    ];

    let label_width = rows
        .iter()
        .map(|(label, ..)| label.chars().count())
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value, _)| value.chars().count())
        .max()
        .unwrap_or_default();

    for (label, value, bold) in &rows {
        let line = format!(" {label:>label_width$}  {value:>value_width$}  ");

        if *bold {
            writeln!(out, "{BOLD}{line}{RESET}")
        } else {
            writeln!(out, "{line}")
        }
        .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Convert a full-precision amount into displayable money, rounding half away
/// from zero to the currency's minor units.
fn money(amount: Decimal, currency: &'static Currency) -> Result<Money<'static, Currency>, ReceiptError> {
    let minor_units = amount
        .round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .and_then(|minor| minor.to_i64())
        .ok_or(ReceiptError::AmountOutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}

fn format_discount(amount: Decimal, currency: &'static Currency) -> Result<String, ReceiptError> {
    if amount > Decimal::ZERO {
        Ok(format!("-{}", money(amount, currency)?))
    } else {
        Ok(String::new())
    }
}

fn format_weight(grams: Decimal) -> String {
    format!("{} kg", (grams / Decimal::ONE_THOUSAND).round_dp(3).normalize())
}

const DARK_GREY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Box-drawing block (U+2500..U+257F), used for the table frame.
fn is_frame_char(ch: char) -> bool {
    matches!(ch, '\u{2500}'..='\u{257F}')
}

/// Dim the table frame. Runs of frame characters share one escape pair.
fn dim_frame(table: &str) -> String {
    let mut out = String::with_capacity(table.len() * 2);
    let mut dimmed = false;

    for ch in table.chars() {
        if is_frame_char(ch) != dimmed {
            dimmed = !dimmed;
            out.push_str(if dimmed { DARK_GREY } else { RESET });
        }

        out.push(ch);
    }

    if dimmed {
        out.push_str(RESET);
    }

    out
}
