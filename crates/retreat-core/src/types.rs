//! # Domain Types
//!
//! Core domain types used throughout Retreat POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DisplayItem    │   │  CheckoutItem   │   │  ReceiptData    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  id (UUID)      │──►│  id (UUID)      │       │
//! │  │  name (unique)  │   │  item_name      │   │  buyer_name     │       │
//! │  │  price          │   │  quantity       │   │  checkout_list  │       │
//! │  │  variants       │   │  variants       │   │  payment_method │       │
//! │  │  is_in_cart     │   │  total_price    │   │  status, time   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ PaymentMethod   │   │ CheckoutStatus  │   Unknown persisted values  │
//! │  │  CASH (default) │   │ PENDING (dflt)  │   degrade to the default    │
//! │  │  ZELLE, VENMO   │   │ SAVE_FOR_LATER  │   via `parse_or_default`.   │
//! │  │  CARD, CHECK    │   │ CHECKED_OUT     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence Tolerance
//! Every persisted struct is `#[serde(default)]`: blobs written by older
//! versions with missing fields still load. Enum strings and timestamps that
//! cannot be parsed fall back to documented defaults instead of failing.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::{NOT_AVAILABLE, UNKNOWN_BUYER};

// =============================================================================
// Fallback Parsing
// =============================================================================

/// Parses `raw`, returning `default` when it is not a recognised value.
///
/// Used at every deserialization boundary for enum strings so that data
/// written by older builds keeps loading.
///
/// ## Example
/// ```rust
/// use retreat_core::types::{parse_or_default, PaymentMethod};
///
/// assert_eq!(parse_or_default("venmo", PaymentMethod::Cash), PaymentMethod::Venmo);
/// assert_eq!(parse_or_default("BITCOIN", PaymentMethod::Cash), PaymentMethod::Cash);
/// ```
pub fn parse_or_default<T>(raw: &str, default: T) -> T
where
    T: FromStr + fmt::Debug,
{
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(raw = %raw, fallback = ?default, "Unrecognised value, using default");
            default
        }
    }
}

/// Error returned by the enum `FromStr` impls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// =============================================================================
// Payment Method
// =============================================================================

/// How the buyer paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    Zelle,
    Venmo,
    /// Card payment on an external terminal.
    Card,
    Check,
}

impl PaymentMethod {
    /// All methods, in display order.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Cash,
        PaymentMethod::Zelle,
        PaymentMethod::Venmo,
        PaymentMethod::Card,
        PaymentMethod::Check,
    ];

    /// The persisted (and exported) spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Zelle => "ZELLE",
            PaymentMethod::Venmo => "VENMO",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Check => "CHECK",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        parse_or_default(&raw, PaymentMethod::default())
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

// =============================================================================
// Checkout Status
// =============================================================================

/// Where a receipt is in its lifecycle.
///
/// ```text
/// PENDING ──► SAVE_FOR_LATER ──► (resumed into cart) ──► CHECKED_OUT
///    └───────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckoutStatus {
    /// Cart in progress.
    #[default]
    Pending,
    /// Parked receipt the buyer will come back for.
    SaveForLater,
    /// Paid and final.
    CheckedOut,
}

impl CheckoutStatus {
    pub const ALL: [CheckoutStatus; 3] = [
        CheckoutStatus::Pending,
        CheckoutStatus::SaveForLater,
        CheckoutStatus::CheckedOut,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Pending => "PENDING",
            CheckoutStatus::SaveForLater => "SAVE_FOR_LATER",
            CheckoutStatus::CheckedOut => "CHECKED_OUT",
        }
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckoutStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CheckoutStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl From<String> for CheckoutStatus {
    fn from(raw: String) -> Self {
        parse_or_default(&raw, CheckoutStatus::default())
    }
}

impl From<CheckoutStatus> for String {
    fn from(status: CheckoutStatus) -> Self {
        status.as_str().to_string()
    }
}

// =============================================================================
// Variants
// =============================================================================

/// A named option axis on a catalog item, e.g. `Size: [S, M, L]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemVariant {
    pub key: String,
    pub value_list: Vec<String>,
}

impl ItemVariant {
    pub fn new<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ItemVariant {
            key: key.into(),
            value_list: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A variant axis frozen into a line item together with the chosen value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectedVariant {
    pub key: String,
    pub value_list: Vec<String>,
    pub selected_value: String,
}

impl SelectedVariant {
    /// A selection with no recorded alternatives.
    pub fn new(key: impl Into<String>, selected_value: impl Into<String>) -> Self {
        let selected_value = selected_value.into();
        SelectedVariant {
            key: key.into(),
            value_list: vec![selected_value.clone()],
            selected_value,
        }
    }
}

// =============================================================================
// Display Item
// =============================================================================

/// A catalog entry shown on the item grid.
///
/// `name` is the business key: unique within the catalog, compared
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, also the cart merge key.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// Option axes in display order.
    pub variants: Vec<ItemVariant>,

    /// Whether a line for this item is in the current cart.
    pub is_in_cart: bool,
}

impl DisplayItem {
    /// Creates a new catalog entry with a fresh id.
    pub fn new(name: impl Into<String>, price: Money, variants: Vec<ItemVariant>) -> Self {
        DisplayItem {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            price,
            variants,
            is_in_cart: false,
        }
    }
}

impl Default for DisplayItem {
    fn default() -> Self {
        DisplayItem {
            id: String::new(),
            name: String::new(),
            price: Money::zero(),
            variants: Vec::new(),
            is_in_cart: false,
        }
    }
}

// =============================================================================
// Checkout Item
// =============================================================================

/// A line item in a cart or frozen inside a receipt.
///
/// ## Invariant
/// `total_price` is the amount for the whole `quantity`, not a unit price.
/// Any quantity change re-derives the total from the current unit price
/// (see [`crate::cart::update_quantity`]) so the two never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutItem {
    pub id: String,
    pub item_name: String,
    pub quantity: i64,
    pub variants: Vec<SelectedVariant>,
    pub total_price: Money,
}

impl Default for CheckoutItem {
    fn default() -> Self {
        CheckoutItem {
            id: String::new(),
            item_name: String::new(),
            quantity: 0,
            variants: Vec::new(),
            total_price: Money::zero(),
        }
    }
}

impl CheckoutItem {
    /// Creates a line with no variants and a fresh id.
    pub fn new(item_name: impl Into<String>, quantity: i64, total_price: Money) -> Self {
        CheckoutItem {
            id: Uuid::new_v4().to_string(),
            item_name: item_name.into(),
            quantity,
            variants: Vec::new(),
            total_price,
        }
    }

    /// Replaces the variant selections.
    pub fn with_variants(mut self, variants: Vec<SelectedVariant>) -> Self {
        self.variants = variants;
        self
    }

    /// Builds a cart line from a catalog entry.
    ///
    /// Every variant axis of `item` receives exactly one selected value: the
    /// one named in `selections` if present, otherwise the first value of the
    /// axis. Selecting a key the item does not have, or a value outside the
    /// axis' list, is a validation error; so is a quantity whose total
    /// does not fit in `Money`.
    ///
    /// ## Example
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use retreat_core::{CheckoutItem, DisplayItem, ItemVariant, Money};
    ///
    /// let shirt = DisplayItem::new(
    ///     "Retreat Shirt",
    ///     Money::from_cents(1500),
    ///     vec![ItemVariant::new("Size", ["S", "M", "L"])],
    /// );
    /// let picks = BTreeMap::from([("Size".to_string(), "L".to_string())]);
    /// let line = CheckoutItem::from_display_item(&shirt, 2, &picks).unwrap();
    ///
    /// assert_eq!(line.total_price.cents(), 3000);
    /// assert_eq!(line.variants_label(), "Size: L");
    /// ```
    pub fn from_display_item(
        item: &DisplayItem,
        quantity: i64,
        selections: &BTreeMap<String, String>,
    ) -> CoreResult<Self> {
        if let Some(unknown) = selections
            .keys()
            .find(|key| !item.variants.iter().any(|v| &v.key == *key))
        {
            return Err(ValidationError::NotAllowed {
                field: format!("variant '{}'", unknown),
                allowed: item.variants.iter().map(|v| v.key.clone()).collect(),
            }
            .into());
        }

        let mut variants = Vec::with_capacity(item.variants.len());
        for variant in &item.variants {
            let selected_value = match selections.get(&variant.key) {
                Some(value) if variant.value_list.contains(value) => value.clone(),
                Some(_) => {
                    return Err(ValidationError::NotAllowed {
                        field: variant.key.clone(),
                        allowed: variant.value_list.clone(),
                    }
                    .into())
                }
                None => variant.value_list.first().cloned().unwrap_or_default(),
            };

            variants.push(SelectedVariant {
                key: variant.key.clone(),
                value_list: variant.value_list.clone(),
                selected_value,
            });
        }

        let total_price = item
            .price
            .multiply_quantity(quantity)
            .ok_or_else(|| ValidationError::too_large("total price"))?;

        Ok(CheckoutItem {
            id: Uuid::new_v4().to_string(),
            item_name: item.name.clone(),
            quantity,
            variants,
            total_price,
        })
    }

    /// Per-unit price rounded half-up to the cent; `None` for a zero quantity.
    pub fn unit_price(&self) -> Option<Money> {
        self.total_price.div_round_half_up(self.quantity)
    }

    /// Variant key → selected value.
    pub fn variants_map(&self) -> BTreeMap<String, String> {
        self.variants
            .iter()
            .map(|v| (v.key.clone(), v.selected_value.clone()))
            .collect()
    }

    /// `key1: value1; key2: value2` in line order, or `N/A` without variants.
    pub fn variants_label(&self) -> String {
        if self.variants.is_empty() {
            return NOT_AVAILABLE.to_string();
        }

        self.variants
            .iter()
            .map(|v| format!("{}: {}", v.key, v.selected_value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Stable key for list diffing: id plus a hash of the selections.
    pub fn unique_key(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.variants_map().hash(&mut hasher);
        format!("{}-{:016x}", self.id, hasher.finish())
    }
}

// =============================================================================
// Receipt Data
// =============================================================================

/// The current cart, or a receipt persisted to history.
///
/// ## Lifecycle
/// ```text
/// ReceiptData::new()  ──► cart mutations ──► process_checkout()
///   (fresh id, PENDING)                         │ copy + stamp buyer,
///                                               │ status, date_time
///                                               ▼
///                                        appended to history;
///                                        host resets to new()
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptData {
    pub id: String,
    pub buyer_name: String,
    pub checkout_list: Vec<CheckoutItem>,
    pub payment_method: PaymentMethod,
    pub checkout_status: CheckoutStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date_time: DateTime<Utc>,
}

impl Default for ReceiptData {
    /// Deterministic defaults used for fields missing from persisted data.
    fn default() -> Self {
        ReceiptData {
            id: String::new(),
            buyer_name: UNKNOWN_BUYER.to_string(),
            checkout_list: Vec::new(),
            payment_method: PaymentMethod::default(),
            checkout_status: CheckoutStatus::default(),
            date_time: DateTime::<Utc>::default(),
        }
    }
}

impl ReceiptData {
    /// Creates an empty cart with a fresh id, stamped now.
    pub fn new() -> Self {
        ReceiptData {
            id: Uuid::new_v4().to_string(),
            date_time: Utc::now(),
            ..ReceiptData::default()
        }
    }

    /// Sum of all line totals.
    pub fn total_price(&self) -> Money {
        self.checkout_list.iter().map(|item| item.total_price).sum()
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.checkout_list.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.checkout_list.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.checkout_list.is_empty()
    }
}

// =============================================================================
// Timestamp Tolerance
// =============================================================================

/// Reads a persisted timestamp, degrading to the Unix epoch.
///
/// Accepted shapes:
/// - RFC 3339 text (`2024-03-05T09:07:00Z`)
/// - offset-less text (`2024-03-05T09:07:00`), taken as UTC
/// - epoch milliseconds (`1709629620000`)
pub fn parse_timestamp_or_epoch(raw: &serde_json::Value) -> DateTime<Utc> {
    let parsed = match raw {
        serde_json::Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }),
        serde_json::Value::Number(number) => {
            number.as_i64().and_then(DateTime::from_timestamp_millis)
        }
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        tracing::warn!(raw = %raw, "Unparseable timestamp, using epoch");
        DateTime::<Utc>::default()
    })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_timestamp_or_epoch(&raw))
}

// =============================================================================
// Unit Tests
// =============================================================================
