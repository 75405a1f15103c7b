//! # Stock Summary
//!
//! Per-warehouse totals for the products panel.
//!
//! ```text
//!  Warehouse      Products  Stock        Value
//!  Gudang Pusat          2     80   Rp 650.000
//!  Gudang Timur          1     12    Rp 60.000
//!  TOTAL                 3     92   Rp 710.000
//! ```
//!
//! Every known warehouse gets a row, even an empty one. Products whose
//! warehouse is missing or unknown are counted in the grand total only.

use crate::money::Money;
use crate::types::{Product, RecordId, Warehouse};

/// Totals for one warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseStock {
    pub warehouse_id: RecordId,
    pub name: String,
    pub product_count: usize,
    pub total_stock: i64,
    /// `Σ selling_price × stock`.
    pub stock_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSummary {
    pub rows: Vec<WarehouseStock>,
    pub product_count: usize,
    pub total_stock: i64,
    pub stock_value: Money,
}

/// Value of one product's stock on hand, saturating.
fn stock_value(product: &Product) -> Money {
    let sen = product
        .selling_price
        .sen()
        .saturating_mul(product.stock.max(0));
    Money::from_sen(sen)
}

/// Groups `products` under `warehouses`, in warehouse order.
pub fn stock_by_warehouse(warehouses: &[Warehouse], products: &[Product]) -> StockSummary {
    let rows = warehouses
        .iter()
        .map(|w| {
            let held: Vec<&Product> = products
                .iter()
                .filter(|p| p.warehouse_id == Some(w.id))
                .collect();
            WarehouseStock {
                warehouse_id: w.id,
                name: w.name.clone(),
                product_count: held.len(),
                total_stock: held.iter().fold(0i64, |acc, p| acc.saturating_add(p.stock)),
                stock_value: held
                    .iter()
                    .fold(Money::zero(), |acc, p| acc.saturating_add(stock_value(p))),
            }
        })
        .collect();

    StockSummary {
        rows,
        product_count: products.len(),
        total_stock: products.iter().fold(0i64, |acc, p| acc.saturating_add(p.stock)),
        stock_value: products
            .iter()
            .fold(Money::zero(), |acc, p| acc.saturating_add(stock_value(p))),
    }
}
