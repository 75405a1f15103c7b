//! # Checkout
//!
//! Turns the cart into one create-transaction request.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout Flow                                   │
//! │                                                                         │
//! │  pay 50000                                                             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  parse_payment ──── not a number / <= 0 ──────► Validation error       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  cart.prepare_checkout ── empty / short ──────► Validation error       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  POST /transactions  (one attempt, no retry)                           │
//! │     │                                                                   │
//! │     ├── error ──► cart untouched, error returned                       │
//! │     │                                                                   │
//! │     └── ok ────► cart cleared                                          │
//! │                  products / transactions / reports invalidated         │
//! │                  Transaction returned (receipt, change)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::validation::parse_payment;
use kasir_core::{Cart, Money, Transaction};
use tracing::{info, warn};

use crate::error::ClientResult;
use crate::store::RemoteStore;

/// Submits the cart with `payment` tendered.
///
/// Clears the cart only when the backend records the transaction.
pub async fn checkout(cart: &mut Cart, payment: Money, store: &RemoteStore) -> ClientResult<Transaction> {
    let request = cart.prepare_checkout(payment)?;

    info!(
        lines = request.items.len(),
        total = %cart.total(),
        payment = %payment,
        "Submitting checkout"
    );

    let expected_change = cart.change_for(payment);
    let expected_profit = cart.expected_profit();

    match store.create_transaction(&request).await {
        Ok(transaction) => {
            cart.clear();
            // The backend prices from its own catalog, which may have moved
            if expected_change != Some(transaction.change) || expected_profit != transaction.profit {
                warn!(
                    receipt = %transaction.receipt_number(),
                    expected_change = ?expected_change,
                    change = %transaction.change,
                    expected_profit = %expected_profit,
                    profit = %transaction.profit,
                    "Backend totals differ from the cart"
                );
            }
            info!(receipt = %transaction.receipt_number(), "Checkout complete");
            Ok(transaction)
        }
        Err(e) => {
            warn!(error = %e, "Checkout failed, cart kept");
            Err(e)
        }
    }
}

/// [`checkout`] with the payment as typed by the operator.
pub async fn checkout_input(cart: &mut Cart, payment: &str, store: &RemoteStore) -> ClientResult<Transaction> {
    let payment = parse_payment(payment)?;
    checkout(cart, payment, store).await
}
