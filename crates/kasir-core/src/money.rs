//! # Money Module
//!
//! Provides the `Money` type for handling rupiah amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The backend speaks JSON numbers (float64):                             │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer sen (1/100 rupiah)                               │
//! │    • JSON number → sen once, at the serde boundary                      │
//! │    • every cart sum is exact integer math                              │
//! │    • sen → JSON number once, when a request is sent                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_rupiah(10_000);
//! let line = price * 2;
//! assert_eq!(line.to_string(), "Rp 20.000");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Sen per rupiah.
const SEN_PER_RUPIAH: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in sen (hundredths of a rupiah).
///
/// ## Design Decisions
/// - **i64 (signed)**: change and profit can be negative in backend records
/// - **Wire format**: a JSON number of whole rupiah, matching the backend
/// - **Display**: `Rp 20.000`, the receipt format used at the till
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from sen (the smallest unit).
    #[inline]
    pub const fn from_sen(sen: i64) -> Self {
        Money(sen)
    }

    /// Creates a Money value from whole rupiah.
    ///
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupiah(15).sen(), 1500);
    /// ```
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah * SEN_PER_RUPIAH)
    }

    /// Converts a wire amount (JSON number of rupiah) into Money.
    ///
    /// Rounds to the nearest sen. Returns `None` for NaN, infinities, and
    /// amounts whose sen value does not fit in an `i64`.
    pub fn from_wire(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let sen = (amount * SEN_PER_RUPIAH as f64).round();
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        if !(i64::MIN as f64..i64::MAX as f64).contains(&sen) {
            return None;
        }
        Some(Money(sen as i64))
    }

    /// Converts Money back into the wire representation.
    #[inline]
    pub fn to_wire(&self) -> f64 {
        self.0 as f64 / SEN_PER_RUPIAH as f64
    }

    /// Returns the value in sen.
    #[inline]
    pub const fn sen(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupiah portion (truncated toward zero).
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0 / SEN_PER_RUPIAH
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Pulpen Rp 3.500
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: Rp 10.500
    /// ```
    ///
    /// Saturates at the `i64` bounds; use [`Money::checked_multiply_quantity`]
    /// where an overflow must be reported.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Multiplies by a quantity, or `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(sen) => Some(Money(sen)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sen) => Some(Money(sen)),
            None => None,
        }
    }

    #[inline]
    pub const fn saturating_add(&self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

/// Groups digits of a non-negative integer with `.` as the thousands separator.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Receipt format: whole rupiah with dot thousands separators. Sen are dropped.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.rupiah() < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, group_thousands(self.rupiah().unsigned_abs()))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_wire(amount)
            .ok_or_else(|| serde::de::Error::custom("amount must be a finite number within range"))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a cart quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
