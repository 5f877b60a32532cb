//! # Validation Module
//!
//! Field-level rules shared by the cart, checkout and catalog use cases.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Register host                                                │
//! │  ├── Argument parsing (types, required flags)                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Use case (cart / checkout / catalog)                         │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Persisted data                                               │
//! │  └── Tolerant decoding, defaults instead of failures                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use retreat_core::validation::{validate_item_name, validate_quantity};
//!
//! assert!(validate_item_name("Bible").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ItemVariant;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("item name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "item name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates the name on a cart line: it must not be blank.
///
/// Lines can come from older data or other registers, so the catalog's
/// length limit does not apply here.
pub fn validate_line_name(name: &str) -> ValidationResult<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::required("item name"));
    }

    Ok(())
}

/// Validates a buyer name and returns it trimmed.
pub fn validate_buyer_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("buyer name"));
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    Ok(())
}

/// Validates a price (> 0).
pub fn validate_price(price: Money, field: &str) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::must_be_positive(field));
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the variant axes of a catalog item.
///
/// ## Rules
/// - Keys are non-blank and unique (case-insensitive)
/// - Each axis offers at least one non-blank value
pub fn validate_variants(variants: &[ItemVariant]) -> ValidationResult<()> {
    for (index, variant) in variants.iter().enumerate() {
        let key = variant.key.trim();
        if key.is_empty() {
            return Err(ValidationError::required("variant key"));
        }

        let repeated = variants
            .iter()
            .take(index)
            .any(|earlier| earlier.key.trim().eq_ignore_ascii_case(key));
        if repeated {
            return Err(ValidationError::Duplicate {
                field: "variant key".to_string(),
                value: key.to_string(),
            });
        }

        if variant.value_list.is_empty() || variant.value_list.iter().any(|v| v.trim().is_empty()) {
            return Err(ValidationError::Required {
                field: format!("values for variant '{}'", key),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Book of Hours").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_line_name_only_rejects_blank() {
        assert!(validate_line_name("Book of Hours").is_ok());
        assert!(validate_line_name(&"A".repeat(300)).is_ok());
        assert!(validate_line_name(" \t").is_err());
    }

    #[test]
    fn test_validate_buyer_name_trims() {
        assert_eq!(validate_buyer_name("  Jane ").unwrap(), "Jane");
        assert!(validate_buyer_name(" \t").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::from_cents(1), "price").is_ok());
        assert!(validate_price(Money::zero(), "price").is_err());
        assert!(validate_price(Money::from_cents(-100), "price").is_err());
    }

    #[test]
    fn test_validate_variants() {
        assert!(validate_variants(&[]).is_ok());
        assert!(validate_variants(&[ItemVariant::new("Size", ["S", "M"])]).is_ok());

        assert!(validate_variants(&[ItemVariant::new(" ", ["S"])]).is_err());
        assert!(validate_variants(&[ItemVariant::new("Size", Vec::<String>::new())]).is_err());
        assert!(validate_variants(&[
            ItemVariant::new("Size", ["S"]),
            ItemVariant::new("size", ["L"]),
        ])
        .is_err());
    }
}
