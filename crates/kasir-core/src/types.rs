//! # Domain Types
//!
//! Wire and domain types shared by the client and the console.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │     Report      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  date           │       │
//! │  │  name           │   │  total, profit  │   │  summary        │       │
//! │  │  stock          │   │  payment        │   │  transactions   │       │
//! │  │  purchase/sell  │   │  change         │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │   Warehouse     │   │    Page<T>      │       │
//! │  │  id, username   │   │  id, name       │   │  data           │       │
//! │  │  role           │   │  address        │   │  meta (opaque)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Naming
//! Records come back from the backend with PascalCase keys (`ID`,
//! `SellingPrice`, ...). Request payloads are snake_case. Both are pinned with
//! serde attributes here so nothing else in the workspace cares.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;

/// Backend identifier for every record type.
pub type RecordId = i64;

/// Decodes a JSON `null` list as an empty `Vec`.
///
/// The backend encodes empty result sets as `null`.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Product
// =============================================================================

/// A product snapshot as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "ID")]
    pub id: RecordId,

    #[serde(rename = "Name")]
    pub name: String,

    /// Units on hand. Never negative on the backend.
    #[serde(rename = "Stock")]
    pub stock: i64,

    #[serde(rename = "PurchasePrice")]
    pub purchase_price: Money,

    #[serde(rename = "SellingPrice")]
    pub selling_price: Money,

    #[serde(rename = "WarehouseID", default)]
    pub warehouse_id: Option<RecordId>,

    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl Product {
    /// Margin earned on one unit.
    #[inline]
    pub fn unit_profit(&self) -> Money {
        self.selling_price - self.purchase_price
    }
}

/// Fields for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock: i64,
    pub warehouse_id: RecordId,
}

/// Fields for `PUT /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductUpdate {
    pub id: RecordId,
    pub name: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock: i64,
}

/// Pagination and search parameters for `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl ProductQuery {
    pub fn new(page: u32, limit: u32, search: impl Into<String>) -> Self {
        ProductQuery {
            page: page.max(1),
            limit: limit.max(1),
            search: search.into(),
        }
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination metadata. Opaque backend contract: never re-derived locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub total_items: Option<u64>,
}

impl PageMeta {
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// A paginated list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(deserialize_with = "null_as_empty", default = "Vec::new")]
    pub data: Vec<T>,
    pub meta: PageMeta,
}

// =============================================================================
// Transaction
// =============================================================================

/// One line of a recorded sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    #[serde(rename = "ProductID")]
    pub product_id: RecordId,
    #[serde(rename = "ProductName", default)]
    pub product_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "SellingPrice", default)]
    pub selling_price: Money,
    #[serde(rename = "Subtotal", default)]
    pub subtotal: Money,
    #[serde(rename = "Profit", default)]
    pub profit: Money,
}

/// A completed sale recorded by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "ID")]
    pub id: RecordId,
    #[serde(rename = "Total")]
    pub total: Money,
    #[serde(rename = "Profit")]
    pub profit: Money,
    /// Amount tendered by the customer.
    #[serde(rename = "Payment")]
    pub payment: Money,
    #[serde(rename = "Change")]
    pub change: Money,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "UserID", default)]
    pub user_id: Option<RecordId>,
    #[serde(rename = "WarehouseID", default)]
    pub warehouse_id: Option<RecordId>,
    #[serde(rename = "Items", default, deserialize_with = "null_as_empty")]
    pub items: Vec<TransactionItem>,
}

impl Transaction {
    /// Receipt number as printed on the till, e.g. `TRX-000042`.
    pub fn receipt_number(&self) -> String {
        format!("TRX-{:06}", self.id)
    }
}

/// One `(product_id, quantity)` pair sent at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: RecordId,
    pub quantity: u32,
}

/// Body of `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub items: Vec<CheckoutItem>,
    pub payment: Money,
}

// =============================================================================
// Users & Warehouses
// =============================================================================

/// Access level of a console user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "user".to_string()],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: RecordId,
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Role")]
    pub role: Role,
    /// `None` for admins, who see every warehouse.
    #[serde(rename = "WarehouseID", default)]
    pub warehouse_id: Option<RecordId>,
}

/// Fields for `POST /users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub warehouse_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    #[serde(rename = "ID")]
    pub id: RecordId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address", default)]
    pub address: String,
}

/// Fields for `POST /warehouses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWarehouse {
    pub name: String,
    pub address: String,
}

/// Fields for `PUT /warehouses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehouseUpdate {
    pub id: RecordId,
    pub name: String,
    pub address: String,
}

// =============================================================================
// Reports
// =============================================================================

/// Aggregates for one day of sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_sales: Money,
    pub total_profit: Money,
    pub transaction_count: u64,
}

/// Daily sales report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Echo of the requested date, `DD-MM-YYYY`.
    pub date: String,
    pub summary: ReportSummary,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transactions: Vec<Transaction>,
}

/// The day a report covers.
///
/// ## Date Formats
/// ```text
/// Date picker (operator input)     Backend query
/// ────────────────────────────     ─────────────
///   2024-05-17 (YYYY-MM-DD)   ──►   17-05-2024 (DD-MM-YYYY)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    /// Picker format used by the console.
    pub const PICKER_FORMAT: &'static str = "%Y-%m-%d";
    /// Format the backend expects in `?date=`.
    pub const QUERY_FORMAT: &'static str = "%d-%m-%Y";

    pub fn new(date: NaiveDate) -> Self {
        ReportDate(date)
    }

    /// Parses a `YYYY-MM-DD` picker value.
    pub fn from_picker(input: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(input.trim(), Self::PICKER_FORMAT)
            .map(ReportDate)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: format!("expected YYYY-MM-DD ({})", e),
            })
    }

    /// Parses a `DD-MM-YYYY` backend value.
    pub fn from_query(input: &str) -> Result<Self, ValidationError> {
        NaiveDate::parse_from_str(input.trim(), Self::QUERY_FORMAT)
            .map(ReportDate)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: format!("expected DD-MM-YYYY ({})", e),
            })
    }

    /// Value for the `date` query parameter.
    pub fn query_value(&self) -> String {
        self.0.format(Self::QUERY_FORMAT).to_string()
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::PICKER_FORMAT))
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Body of `POST /login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Keeps the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Success payload of `POST /login`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Body of every `DELETE` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteRequest {
    pub id: RecordId,
}

/// `{"message": "Product deleted"}` returned by update and delete endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
