//! # CSV Reporting Engine
//!
//! Turns a receipt list into spreadsheet-ready CSV text. Stateless: receipts
//! in, strings out, no failure path.
//!
//! ## Artifacts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  receipts ──┬──► detailed          one row per line, receipt order     │
//! │             ├──► by item           Σ per item name, sorted             │
//! │             ├──► by item+variants  Σ per (name, rendered variants)     │
//! │             ├──► per variant       one section per (item, variant key) │
//! │             └──► combined          all four under === banners ===      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cell Quoting
//! Text cells (dates, names, variant labels, payment methods) are always
//! double-quoted with embedded quotes doubled. Quantity and price cells are
//! bare, except the price cell of a "Grand Total" row, which is quoted.
//! Every row ends with `\n`.
//!
//! ## Example
//! ```rust
//! use retreat_core::{report, CheckoutItem, Money, ReceiptData};
//!
//! let mut receipt = ReceiptData::new();
//! receipt.buyer_name = "Jane".to_string();
//! receipt.checkout_list.push(CheckoutItem::new("Bible", 2, Money::from_cents(4000)));
//!
//! let csv = report::generate_by_item_csv(&[receipt]);
//! assert_eq!(
//!     csv,
//!     "Item Name,Total Quantity,Total Price\n\"Bible\",2,40.00\n\"Grand Total\",2,\"40.00\"\n"
//! );
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::money::Money;
use crate::types::{CheckoutItem, ReceiptData, UnknownVariant};
use crate::{NOT_AVAILABLE, UNKNOWN_BUYER};

const DATE_FORMAT: &str = "%Y/%m/%d %H:%M";
const GRAND_TOTAL: &str = "Grand Total";

const DETAILED_HEADER: &str =
    "Date Time,Buyer Name,Item Name,Variants,Quantity,Unit Price,Payment Method,Total Price";
const BY_ITEM_HEADER: &str = "Item Name,Total Quantity,Total Price";
const WITH_VARIANTS_HEADER: &str = "Item Name,Variants,Total Quantity,Total Price";

// =============================================================================
// Report Kind
// =============================================================================

/// Which artifact to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportKind {
    Detailed,
    ByItem,
    ByItemWithVariants,
    PerVariant,
    #[default]
    Combined,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::Detailed,
        ReportKind::ByItem,
        ReportKind::ByItemWithVariants,
        ReportKind::PerVariant,
        ReportKind::Combined,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Detailed => "detailed",
            ReportKind::ByItem => "by-item",
            ReportKind::ByItemWithVariants => "by-item-variants",
            ReportKind::PerVariant => "per-variant",
            ReportKind::Combined => "combined",
        }
    }

    /// Banner line heading this section of the combined document.
    /// `None` for the combined document itself.
    const fn banner(&self) -> Option<&'static str> {
        match self {
            ReportKind::Detailed => Some("=== DETAILED PURCHASE HISTORY ==="),
            ReportKind::ByItem => Some("=== PURCHASES GROUPED BY ITEM ==="),
            ReportKind::ByItemWithVariants => Some("=== PURCHASES GROUPED BY ITEM AND VARIANTS ==="),
            ReportKind::PerVariant => Some("=== PURCHASES GROUPED BY ITEM PER VARIANT ==="),
            ReportKind::Combined => None,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

// =============================================================================
// Reporter
// =============================================================================

/// Renders reports with dates shown in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct CsvReporter {
    offset: FixedOffset,
}

impl Default for CsvReporter {
    fn default() -> Self {
        CsvReporter::utc()
    }
}

impl CsvReporter {
    pub fn new(offset: FixedOffset) -> Self {
        CsvReporter { offset }
    }

    pub fn utc() -> Self {
        CsvReporter {
            offset: Utc.fix(),
        }
    }

    /// Offset given in minutes east of UTC; out-of-range values mean UTC.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        match minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
            Some(offset) => CsvReporter { offset },
            None => {
                tracing::warn!(minutes, "UTC offset out of range, using UTC");
                CsvReporter::utc()
            }
        }
    }

    pub fn render(&self, kind: ReportKind, receipts: &[ReceiptData]) -> String {
        match kind {
            ReportKind::Detailed => self.detailed_csv(receipts),
            ReportKind::ByItem => by_item_csv(receipts),
            ReportKind::ByItemWithVariants => by_item_with_variants_csv(receipts),
            ReportKind::PerVariant => per_variant_csv(receipts),
            ReportKind::Combined => self.combined_csv(receipts),
        }
    }

    fn format_date(&self, at: &DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(DATE_FORMAT).to_string()
    }

    /// One row per checkout line, receipt order then line order.
    ///
    /// A receipt without lines still gets one row, with `N/A` item and
    /// variants and zero amounts. The grand-total row is written only when
    /// the summed line totals are positive.
    pub fn detailed_csv(&self, receipts: &[ReceiptData]) -> String {
        let mut csv = String::new();
        let _ = writeln!(csv, "{}", DETAILED_HEADER);

        let mut grand_total = Money::zero();
        for receipt in receipts {
            let date = quote(&self.format_date(&receipt.date_time));
            let buyer = if receipt.buyer_name.trim().is_empty() {
                quote(UNKNOWN_BUYER)
            } else {
                quote(&receipt.buyer_name)
            };
            let method = quote(receipt.payment_method.as_str());

            if receipt.checkout_list.is_empty() {
                let _ = writeln!(
                    csv,
                    "{},{},{},{},0,{},{},{}",
                    date,
                    buyer,
                    quote(NOT_AVAILABLE),
                    quote(NOT_AVAILABLE),
                    Money::zero().to_decimal_string(),
                    method,
                    Money::zero().to_decimal_string(),
                );
                continue;
            }

            for line in &receipt.checkout_list {
                grand_total += line.total_price;
                let _ = writeln!(
                    csv,
                    "{},{},{},{},{},{},{},{}",
                    date,
                    buyer,
                    quote(&line.item_name),
                    quote(&line.variants_label()),
                    line.quantity,
                    unit_price_cell(line),
                    method,
                    line.total_price.to_decimal_string(),
                );
            }
        }

        if grand_total.is_positive() {
            let _ = writeln!(
                csv,
                ",,,,,,{},{}",
                quote(GRAND_TOTAL),
                quote(&grand_total.to_decimal_string())
            );
        }

        csv
    }

    /// The four artifacts under their banners, separated by blank lines.
    pub fn combined_csv(&self, receipts: &[ReceiptData]) -> String {
        let sections = [
            (ReportKind::Detailed, self.detailed_csv(receipts)),
            (ReportKind::ByItem, by_item_csv(receipts)),
            (ReportKind::ByItemWithVariants, by_item_with_variants_csv(receipts)),
            (ReportKind::PerVariant, per_variant_csv(receipts)),
        ];

        let mut csv = String::new();
        for (index, (kind, body)) in sections.iter().enumerate() {
            if index > 0 {
                csv.push('\n');
            }
            if let Some(banner) = kind.banner() {
                let _ = writeln!(csv, "{}", banner);
            }
            csv.push_str(body);
        }
        csv
    }
}

// =============================================================================
// Aggregated Artifacts
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    quantity: i64,
    total: Money,
}

impl Tally {
    fn add(&mut self, line: &CheckoutItem) {
        self.quantity += line.quantity;
        self.total += line.total_price;
    }
}

fn lines(receipts: &[ReceiptData]) -> impl Iterator<Item = &CheckoutItem> {
    receipts.iter().flat_map(|r| r.checkout_list.iter())
}

fn grand_tally<'a>(tallies: impl Iterator<Item = &'a Tally>) -> Tally {
    tallies.fold(Tally::default(), |acc, t| Tally {
        quantity: acc.quantity + t.quantity,
        total: acc.total + t.total,
    })
}

/// Σ quantity and total per item name, sorted by name.
pub fn by_item_csv(receipts: &[ReceiptData]) -> String {
    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    for line in lines(receipts) {
        groups.entry(line.item_name.as_str()).or_default().add(line);
    }

    let mut csv = String::new();
    let _ = writeln!(csv, "{}", BY_ITEM_HEADER);
    for (name, tally) in &groups {
        let _ = writeln!(
            csv,
            "{},{},{}",
            quote(name),
            tally.quantity,
            tally.total.to_decimal_string()
        );
    }

    let grand = grand_tally(groups.values());
    if grand.total.is_positive() {
        let _ = writeln!(
            csv,
            "{},{},{}",
            quote(GRAND_TOTAL),
            grand.quantity,
            quote(&grand.total.to_decimal_string())
        );
    }

    csv
}

/// Σ per (item name, rendered variant label), sorted by that pair.
///
/// Grouping uses the rendered label, so selections listed in a different
/// order land in different rows.
pub fn by_item_with_variants_csv(receipts: &[ReceiptData]) -> String {
    let mut groups: BTreeMap<(String, String), Tally> = BTreeMap::new();
    for line in lines(receipts) {
        groups
            .entry((line.item_name.clone(), line.variants_label()))
            .or_default()
            .add(line);
    }

    let mut csv = String::new();
    let _ = writeln!(csv, "{}", WITH_VARIANTS_HEADER);
    for ((name, label), tally) in &groups {
        let _ = writeln!(
            csv,
            "{},{},{},{}",
            quote(name),
            quote(label),
            tally.quantity,
            tally.total.to_decimal_string()
        );
    }

    let grand = grand_tally(groups.values());
    if grand.total.is_positive() {
        let _ = writeln!(
            csv,
            "{},,,{}",
            quote(GRAND_TOTAL),
            quote(&grand.total.to_decimal_string())
        );
    }

    csv
}

/// One section per (item, variant key), each a small table of that key's
/// values. Items without variants get a single aggregate section.
///
/// ```text
/// --- Shirt (by Size) ---
/// Size,Total Quantity,Total Price
/// "L",2,30.00
/// "M",1,15.00
/// "Grand Total",3,"45.00"
/// ```
///
/// A line that lacks a key seen on other lines of the same item is counted
/// under `N/A` in that key's section.
pub fn per_variant_csv(receipts: &[ReceiptData]) -> String {
    let mut by_item: BTreeMap<&str, Vec<&CheckoutItem>> = BTreeMap::new();
    for line in lines(receipts) {
        by_item.entry(line.item_name.as_str()).or_default().push(line);
    }

    let mut sections = Vec::new();
    for (name, item_lines) in &by_item {
        let keys: BTreeSet<&str> = item_lines
            .iter()
            .flat_map(|line| line.variants.iter().map(|v| v.key.as_str()))
            .collect();

        if keys.is_empty() {
            let mut tally = Tally::default();
            item_lines.iter().for_each(|line| tally.add(line));

            let mut section = String::new();
            let _ = writeln!(section, "--- {} ---", name);
            let _ = writeln!(section, "Total Quantity,Total Price");
            let _ = writeln!(section, "{},{}", tally.quantity, tally.total.to_decimal_string());
            sections.push(section);
            continue;
        }

        for key in keys {
            let mut values: BTreeMap<&str, Tally> = BTreeMap::new();
            for line in item_lines {
                let value = line
                    .variants
                    .iter()
                    .find(|v| v.key == key)
                    .map(|v| v.selected_value.as_str())
                    .unwrap_or(NOT_AVAILABLE);
                values.entry(value).or_default().add(line);
            }

            let mut section = String::new();
            let _ = writeln!(section, "--- {} (by {}) ---", name, key);
            let _ = writeln!(section, "{},Total Quantity,Total Price", escape_if_needed(key));
            for (value, tally) in &values {
                let _ = writeln!(
                    section,
                    "{},{},{}",
                    quote(value),
                    tally.quantity,
                    tally.total.to_decimal_string()
                );
            }
            let grand = grand_tally(values.values());
            let _ = writeln!(
                section,
                "{},{},{}",
                quote(GRAND_TOTAL),
                grand.quantity,
                quote(&grand.total.to_decimal_string())
            );
            sections.push(section);
        }
    }

    sections.join("\n")
}

// =============================================================================
// UTC Convenience Wrappers
// =============================================================================

pub fn generate_detailed_csv(receipts: &[ReceiptData]) -> String {
    CsvReporter::utc().detailed_csv(receipts)
}

pub fn generate_by_item_csv(receipts: &[ReceiptData]) -> String {
    by_item_csv(receipts)
}

pub fn generate_by_item_with_variants_csv(receipts: &[ReceiptData]) -> String {
    by_item_with_variants_csv(receipts)
}

pub fn generate_per_variant_csv(receipts: &[ReceiptData]) -> String {
    per_variant_csv(receipts)
}

pub fn generate_combined_csv(receipts: &[ReceiptData]) -> String {
    CsvReporter::utc().combined_csv(receipts)
}

/// `purchase_history_<epoch-millis>.csv`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("purchase_history_{}.csv", now.timestamp_millis())
}

// =============================================================================
// Cell Helpers
// =============================================================================

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn escape_if_needed(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        quote(text)
    } else {
        text.to_string()
    }
}

fn unit_price_cell(line: &CheckoutItem) -> String {
    line.unit_price()
        .unwrap_or_else(Money::zero)
        .to_decimal_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
