//! # Receipts
//!
//! Full receipt text for a completed sale, and saving it as a text file.
//!
//! ```text
//! ========================================
//!                  KASIR
//! ========================================
//! Receipt:  TRX-000101
//! Date:     17-05-2024 14:05
//! ----------------------------------------
//!  Item         Qty      Price   Subtotal
//!  ───────────  ───  ─────────  ─────────
//!  Pulpen Biru    2  Rp 10.000  Rp 20.000
//! ----------------------------------------
//! Total:    Rp 20.000
//! Paid:     Rp 50.000
//! Change:   Rp 30.000
//! ========================================
//!          Thank you for shopping
//! ```

use std::path::{Path, PathBuf};

use kasir_core::{CartLine, Transaction};
use tracing::info;

use crate::render::Table;

const WIDTH: usize = 40;

fn centered(text: &str) -> String {
    let pad = WIDTH.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Item rows from the backend record, or from the cart that was sold
/// when the backend did not echo its items.
fn item_table(transaction: &Transaction, sold: &[CartLine]) -> Table {
    let mut table = Table::new(&["Item", "Qty", "Price", "Subtotal"]).right(&[1, 2, 3]);
    if transaction.items.is_empty() {
        for line in sold {
            table.row([
                line.product.name.clone(),
                line.quantity.to_string(),
                line.product.selling_price.to_string(),
                line.subtotal().to_string(),
            ]);
        }
    } else {
        for item in &transaction.items {
            table.row([
                item.product_name.clone(),
                item.quantity.to_string(),
                item.selling_price.to_string(),
                item.subtotal.to_string(),
            ]);
        }
    }
    table
}

/// Printable receipt for `transaction`.
pub fn receipt_text(transaction: &Transaction, sold: &[CartLine]) -> String {
    let double = "=".repeat(WIDTH);
    let single = "-".repeat(WIDTH);
    [
        double.clone(),
        centered("KASIR"),
        double.clone(),
        format!("Receipt:  {}", transaction.receipt_number()),
        format!("Date:     {}", transaction.created_at.format("%d-%m-%Y %H:%M")),
        single.clone(),
        item_table(transaction, sold).render(),
        single,
        format!("Total:    {}", transaction.total),
        format!("Paid:     {}", transaction.payment),
        format!("Change:   {}", transaction.change),
        double,
        centered("Thank you for shopping"),
    ]
    .join("\n")
}

/// `nota_TRX-000101_20240517_140500.txt`
pub fn receipt_file_name(transaction: &Transaction) -> String {
    format!(
        "nota_{}_{}.txt",
        transaction.receipt_number(),
        transaction.created_at.format("%Y%m%d_%H%M%S")
    )
}

/// Writes `text` under `dir`, creating it if needed. Returns the file path.
pub fn save_receipt(dir: &Path, transaction: &Transaction, text: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(receipt_file_name(transaction));
    std::fs::write(&path, format!("{}\n", text))?;
    info!(path = %path.display(), receipt = %transaction.receipt_number(), "Receipt saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use kasir_core::{Money, Product, TransactionItem};

    fn sale() -> Transaction {
        Transaction {
            id: 101,
            total: Money::from_rupiah(20_000),
            profit: Money::from_rupiah(5_000),
            payment: Money::from_rupiah(50_000),
            change: Money::from_rupiah(30_000),
            created_at: DateTime::parse_from_rfc3339("2024-05-17T14:05:00+07:00").unwrap(),
            user_id: Some(1),
            warehouse_id: Some(1),
            items: Vec::new(),
        }
    }

    fn sold() -> Vec<CartLine> {
        vec![CartLine {
            product: Product {
                id: 1,
                name: "Pulpen Biru".into(),
                stock: 50,
                purchase_price: Money::from_rupiah(7_500),
                selling_price: Money::from_rupiah(10_000),
                warehouse_id: Some(1),
                created_at: None,
            },
            quantity: 2,
        }]
    }

    #[test]
    fn test_receipt_text_from_cart_lines() {
        let text = receipt_text(&sale(), &sold());
        assert!(text.contains("Receipt:  TRX-000101"));
        assert!(text.contains("Date:     17-05-2024 14:05"));
        assert!(text.contains("Pulpen Biru    2  Rp 10.000  Rp 20.000"));
        assert!(text.contains("Change:   Rp 30.000"));
        assert!(text.ends_with("Thank you for shopping"));
    }

    #[test]
    fn test_receipt_prefers_backend_items() {
        let mut trx = sale();
        trx.items = vec![TransactionItem {
            product_id: 1,
            product_name: "Pulpen Biru (promo)".into(),
            quantity: 2,
            selling_price: Money::from_rupiah(10_000),
            subtotal: Money::from_rupiah(20_000),
            profit: Money::from_rupiah(5_000),
        }];
        assert!(receipt_text(&trx, &sold()).contains("Pulpen Biru (promo)"));
    }

    #[test]
    fn test_save_receipt_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nota");

        let path = save_receipt(&target, &sale(), "receipt body").unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "nota_TRX-000101_20240517_140500.txt"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "receipt body\n");
    }
}
