//! # kasir-core: Pure Business Logic for the Kasir Console
//!
//! Everything here is deterministic and free of I/O. The network, the token
//! file and the terminal all live in other crates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/console (view layer)                    │   │
//! │  │    Login ──► Dashboard ──► POS / Products / Users / Reports     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-client                                 │   │
//! │  │    AuthSession, HttpApi, RemoteStore, checkout                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   parse   │  │   │
//! │  │   │  Report   │  │  Rp 1.000 │  │  CartLine │  │   checks  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO FILESYSTEM                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire and domain types (Product, Transaction, Report, ...)
//! - [`money`] - Integer rupiah amounts
//! - [`cart`] - The shopping cart aggregator
//! - [`error`] - Domain error types
//! - [`validation`] - Operator input parsing and checks
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::{Cart, Money, Product};
//!
//! let pen = Product {
//!     id: 1,
//!     name: "Pulpen".to_string(),
//!     stock: 40,
//!     purchase_price: Money::from_rupiah(6_000),
//!     selling_price: Money::from_rupiah(10_000),
//!     warehouse_id: None,
//!     created_at: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add(&pen);
//! cart.add(&pen);
//!
//! assert_eq!(cart.total().to_string(), "Rp 20.000");
//! assert!(cart.prepare_checkout(Money::from_rupiah(15_000)).is_err());
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use stock::{stock_by_warehouse, StockSummary, WarehouseStock};
pub use types::*;
