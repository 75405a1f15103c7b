//! # Cart Aggregator
//!
//! The in-memory shopping cart behind the POS panel.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Cart Method             Cart State Change     │
//! │  ───────────────          ───────────             ─────────────────     │
//! │                                                                         │
//! │  add <id> ───────────────► add(&product) ───────► qty += 1 or push     │
//! │                                                                         │
//! │  remove <id> ────────────► remove(id) ──────────► retain(!= id)        │
//! │                                                                         │
//! │  (any render) ───────────► total() ─────────────► (read only)          │
//! │                                                                         │
//! │  pay <amount> ───────────► prepare_checkout() ──► (read only)          │
//! │                            clear() on success ──► lines.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id (adding the same product merges)
//! - Every quantity is >= 1
//! - `total()` is derived on every call, never cached
//!
//! The cart is owned by a single POS panel and mutated through `&mut self`,
//! so no locking is involved.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CheckoutItem, NewTransaction, Product, RecordId};

/// One product-quantity pairing within the cart.
///
/// The product is a snapshot taken when it was first added; later catalog
/// refreshes do not change the price in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// `selling_price × quantity`, saturating for display.
    pub fn subtotal(&self) -> Money {
        self.product.selling_price * self.quantity
    }

    /// `selling_price × quantity`, or `None` on overflow.
    pub fn checked_subtotal(&self) -> Option<Money> {
        self.product.selling_price.checked_multiply_quantity(self.quantity)
    }

    /// `(selling_price − purchase_price) × quantity`.
    pub fn expected_profit(&self) -> Money {
        self.product.unit_profit() * self.quantity
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in cart: its quantity increases by 1
    /// - Product not in cart: appended with quantity 1
    pub fn add(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
    }

    /// Removes the line for `product_id`. No-op if absent.
    pub fn remove(&mut self, product_id: RecordId) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity for a product, 0 if it is not in the cart.
    pub fn quantity_of(&self, product_id: RecordId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// `Σ selling_price × quantity`. Zero for the empty cart.
    ///
    /// Saturates at the `Money` bounds so rendering never panics;
    /// checkout goes through [`Cart::checked_total`].
    pub fn total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc.saturating_add(l.subtotal()))
    }

    /// Exact total, or [`CoreError::TotalOverflow`].
    pub fn checked_total(&self) -> CoreResult<Money> {
        self.lines.iter().try_fold(Money::zero(), |acc, l| {
            l.checked_subtotal()
                .and_then(|sub| acc.checked_add(sub))
                .ok_or(CoreError::TotalOverflow)
        })
    }

    /// Profit the backend should book for this cart at current snapshots.
    pub fn expected_profit(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc.saturating_add(l.expected_profit()))
    }

    /// Change owed for `payment`, or `None` if it does not cover the total.
    pub fn change_for(&self, payment: Money) -> Option<Money> {
        let total = self.total();
        (payment >= total).then(|| payment - total)
    }

    /// `(product_id, quantity)` pairs for the create-transaction request.
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.lines
            .iter()
            .map(|l| CheckoutItem {
                product_id: l.product.id,
                quantity: l.quantity,
            })
            .collect()
    }

    /// Builds the checkout request, enforcing the client-side rules.
    ///
    /// ## Rules
    /// - The cart must not be empty
    /// - The payment must be positive
    /// - The payment must cover the total (no negative change)
    /// - The total must not overflow
    ///
    /// The cart is not modified; the caller clears it once the backend
    /// accepts the transaction.
    pub fn prepare_checkout(&self, payment: Money) -> CoreResult<NewTransaction> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        crate::validation::validate_payment_amount(payment)?;

        let total = self.checked_total()?;
        if payment < total {
            return Err(CoreError::InsufficientPayment { payment, total });
        }

        Ok(NewTransaction {
            items: self.checkout_items(),
            payment,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
