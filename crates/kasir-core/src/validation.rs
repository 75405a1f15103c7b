//! # Validation Module
//!
//! Input validation for everything the operator types into the console.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console panel                                                │
//! │  └── Splits the command line into raw text fields                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Parses amounts, stock, ids                                        │
//! │  └── Rejects empty / oversized / negative input                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Stock checks, uniqueness, foreign keys                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{parse_payment, validate_product_name};
//!
//! validate_product_name("Pulpen Biru").unwrap();
//! assert!(parse_payment("abc").is_err());
//! assert!(parse_payment("50000").is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NewProduct, NewUser, NewWarehouse, ProductUpdate, RecordId};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_USERNAME_LEN: usize = 50;
const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, MAX_NAME_LEN)
}

/// Validates a warehouse name.
pub fn validate_warehouse_name(name: &str) -> ValidationResult<()> {
    require_text("warehouse name", name, MAX_NAME_LEN)
}

/// Validates a login or new-user username.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    require_text("username", username, MAX_USERNAME_LEN)
}

/// Passwords are only checked for presence; the backend owns the policy.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns every product)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Parsers
// =============================================================================

fn parse_amount(field: &str, input: &str) -> ValidationResult<Money> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let value: f64 = input.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not a number", input),
    })?;

    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    Money::from_wire(value).ok_or_else(|| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is out of range", input),
    })
}

/// Parses the amount tendered at checkout.
///
/// ## Rules
/// - Whole rupiah; `.` is a thousands separator (`50.000` is fifty thousand)
/// - Must be numeric, finite and within range
/// - Must be positive (> 0)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POS: pay <amount>                                                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  parse_payment("50000") ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── "abc"?  → Error: "payment has invalid format"                 │
/// │       ├── "0"?    → Error: "payment must be positive"                   │
/// │       └── OK      → checkout proceeds                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn parse_payment(input: &str) -> ValidationResult<Money> {
    let amount = parse_amount("payment", &input.replace('.', ""))?;
    validate_payment_amount(amount)?;
    Ok(amount)
}

/// Rejects zero and negative payments.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "payment".to_string(),
        });
    }
    Ok(())
}

/// Parses a purchase or selling price.
///
/// Zero is allowed (free items); negatives are not.
pub fn parse_price(field: &str, input: &str) -> ValidationResult<Money> {
    let amount = parse_amount(field, input)?;
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(amount)
}

/// Parses a stock level.
pub fn parse_stock(input: &str) -> ValidationResult<i64> {
    let stock: i64 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "stock".to_string(),
            reason: format!("'{}' is not a whole number", input.trim()),
        })?;

    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(stock)
}

/// Parses a record id typed by the operator (`delete 12`).
pub fn parse_record_id(input: &str) -> ValidationResult<RecordId> {
    let id: RecordId = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "id".to_string(),
            reason: format!("'{}' is not a whole number", input.trim()),
        })?;

    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "id".to_string(),
        });
    }
    Ok(id)
}

// =============================================================================
// Draft Validators
// =============================================================================

/// Prices must be non-negative and a product may not sell at a loss.
pub fn validate_prices(purchase: Money, selling: Money) -> ValidationResult<()> {
    if purchase.is_negative() || selling.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    if selling < purchase {
        return Err(ValidationError::BelowField {
            field: "selling price".to_string(),
            other: "purchase price".to_string(),
        });
    }
    Ok(())
}

fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_prices(product.purchase_price, product.selling_price)?;
    validate_stock(product.stock)
}

pub fn validate_product_update(product: &ProductUpdate) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_prices(product.purchase_price, product.selling_price)?;
    validate_stock(product.stock)
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    validate_username(&user.username)?;
    validate_password(&user.password)
}

pub fn validate_new_warehouse(warehouse: &NewWarehouse) -> ValidationResult<()> {
    validate_warehouse_name(&warehouse.name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Pulpen Biru").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_parse_payment() {
        assert_eq!(parse_payment("50000").unwrap(), Money::from_rupiah(50_000));
        assert_eq!(parse_payment(" 12500 ").unwrap(), Money::from_rupiah(12_500));

        assert!(matches!(
            parse_payment("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_payment(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_payment("0"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            parse_payment("-100"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(parse_payment("NaN").is_err());
        assert!(parse_payment("inf").is_err());
    }

    #[test]
    fn test_parse_payment_strips_thousands_separators() {
        assert_eq!(parse_payment("50.000").unwrap(), Money::from_rupiah(50_000));
        assert_eq!(parse_payment("50.000").unwrap().to_string(), "Rp 50.000");
        assert_eq!(parse_payment("1.250.000").unwrap(), Money::from_rupiah(1_250_000));
    }

    #[test]
    fn test_parse_payment_rejects_out_of_range() {
        let err = parse_payment("1e30").unwrap_err();
        assert!(matches!(
            &err,
            ValidationError::InvalidFormat { field, reason }
                if field == "payment" && reason.contains("out of range")
        ));
        assert!(parse_price("selling price", "1e30").is_err());
    }

    #[test]
    fn test_selling_price_below_purchase_is_rejected() {
        let mut product = NewProduct {
            name: "Pulpen".to_string(),
            purchase_price: Money::from_rupiah(5_000),
            selling_price: Money::from_rupiah(3_750),
            stock: 10,
            warehouse_id: 1,
        };
        assert_eq!(
            validate_new_product(&product),
            Err(ValidationError::BelowField {
                field: "selling price".to_string(),
                other: "purchase price".to_string(),
            })
        );

        // Selling at cost is allowed
        product.selling_price = Money::from_rupiah(5_000);
        assert!(validate_new_product(&product).is_ok());

        let update = ProductUpdate {
            id: 4,
            name: "Pulpen".to_string(),
            purchase_price: Money::from_rupiah(5_000),
            selling_price: Money::from_rupiah(4_000),
            stock: 10,
        };
        assert!(matches!(
            validate_product_update(&update),
            Err(ValidationError::BelowField { .. })
        ));
    }

    #[test]
    fn test_parse_price_and_stock() {
        assert!(parse_price("selling price", "0").is_ok());
        assert!(parse_price("selling price", "-1").is_err());
        assert_eq!(parse_stock("25").unwrap(), 25);
        assert!(parse_stock("-3").is_err());
        assert!(parse_stock("2.5").is_err());
    }

    #[test]
    fn test_parse_record_id() {
        assert_eq!(parse_record_id("12").unwrap(), 12);
        assert!(parse_record_id("0").is_err());
        assert!(parse_record_id("x").is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  pen ").unwrap(), "pen");
        assert!(validate_search_query(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_new_user() {
        let mut user = NewUser {
            username: "kasir1".to_string(),
            password: "rahasia".to_string(),
            role: Role::User,
            warehouse_id: Some(1),
        };
        assert!(validate_new_user(&user).is_ok());

        user.password.clear();
        assert!(validate_new_user(&user).is_err());
    }
}
