//! # POS Panel
//!
//! Catalog on the left, cart on the right, checkout at the bottom.
//!
//! ## Screen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CATALOG  (search: "pen")                                              │
//! │   ID  Name         Stock      Price                                     │
//! │    1  Pulpen Biru     50  Rp 10.000                                     │
//! │  Page 1 of 3                                                            │
//! │                                                                         │
//! │  CART                                                                   │
//! │   ID  Item         Qty      Price   Subtotal                            │
//! │    1  Pulpen Biru    2  Rp 10.000  Rp 20.000                            │
//! │  Total: Rp 20.000                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `add` only accepts products on the page being shown, the same way a
//! click can only hit a visible card.
//!
//! After a sale the operator can save the full receipt as a text file.

use std::path::PathBuf;

use async_trait::async_trait;
use kasir_client::{checkout_input, ResourceFamily};
use kasir_core::validation::validate_search_query;
use kasir_core::{Cart, Page, Product, ProductQuery, RecordId, Transaction};
use tracing::debug;

use super::form::confirm;
use super::{id_argument, split_command, unknown_command, Panel, Tab};
use crate::error::{Alert, AlertCode, ConsoleError, ConsoleResult};
use crate::receipt::{receipt_text, save_receipt};
use crate::render::{page_footer, Table};
use crate::state::AppState;
use crate::terminal::Terminal;

const HELP: &str = "\
POS:      add <id>  remove <id>  pay <amount>  clear
          search <text>  next  prev  refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosCommand {
    Add(RecordId),
    Remove(RecordId),
    /// Payment exactly as typed; parsed at checkout.
    Pay(String),
    Clear,
    Search(String),
    Next,
    Prev,
    Refresh,
}

impl PosCommand {
    pub fn parse(line: &str) -> ConsoleResult<PosCommand> {
        let (verb, rest) = split_command(line);
        match verb.as_str() {
            "add" => Ok(PosCommand::Add(id_argument("add", rest)?)),
            "remove" | "rm" => Ok(PosCommand::Remove(id_argument("remove", rest)?)),
            "pay" => {
                if rest.is_empty() {
                    return Err(ConsoleError::usage("Usage: pay <amount>"));
                }
                Ok(PosCommand::Pay(rest.to_string()))
            }
            "clear" => Ok(PosCommand::Clear),
            "search" => Ok(PosCommand::Search(rest.to_string())),
            "next" => Ok(PosCommand::Next),
            "prev" => Ok(PosCommand::Prev),
            "refresh" => Ok(PosCommand::Refresh),
            other => Err(unknown_command(other)),
        }
    }
}

pub struct PosPanel {
    query: ProductQuery,
    page: Option<Page<Product>>,
    cart: Cart,
    receipts_dir: PathBuf,
}

impl PosPanel {
    pub fn new(page_size: u32, receipts_dir: PathBuf) -> Self {
        PosPanel {
            query: ProductQuery::new(1, page_size, ""),
            page: None,
            cart: Cart::new(),
            receipts_dir,
        }
    }

    fn visible_product(&self, id: RecordId) -> ConsoleResult<Product> {
        self.page
            .as_ref()
            .and_then(|p| p.data.iter().find(|product| product.id == id))
            .cloned()
            .ok_or_else(|| ConsoleError::usage(format!("Product {} is not on this page", id)))
    }

    fn catalog_table(page: &Page<Product>) -> Table {
        let mut table = Table::new(&["ID", "Name", "Stock", "Price"]).right(&[0, 2, 3]);
        for product in &page.data {
            table.row([
                product.id.to_string(),
                product.name.clone(),
                product.stock.to_string(),
                product.selling_price.to_string(),
            ]);
        }
        table
    }

    fn cart_table(&self) -> Table {
        let mut table =
            Table::new(&["ID", "Item", "Qty", "Price", "Subtotal"]).right(&[0, 2, 3, 4]);
        for line in self.cart.lines() {
            table.row([
                line.product.id.to_string(),
                line.product.name.clone(),
                line.quantity.to_string(),
                line.product.selling_price.to_string(),
                line.subtotal().to_string(),
            ]);
        }
        table
    }
}

/// Receipt lines printed after a successful checkout.
pub fn receipt(transaction: &Transaction) -> String {
    format!(
        "Sale recorded: {}\n  Total:   {}\n  Paid:    {}\n  Change:  {}",
        transaction.receipt_number(),
        transaction.total,
        transaction.payment,
        transaction.change,
    )
}

#[async_trait]
impl Panel for PosPanel {
    fn tab(&self) -> Tab {
        Tab::Pos
    }

    fn help(&self) -> &'static str {
        HELP
    }

    async fn render(&mut self, state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()> {
        let page = state.store.products(&self.query).await?;

        let heading = if self.query.search.is_empty() {
            "CATALOG".to_string()
        } else {
            format!("CATALOG  (search: {:?})", self.query.search)
        };
        term.print(&heading).await?;
        if page.data.is_empty() {
            term.print("  No products found").await?;
        } else {
            term.print(&Self::catalog_table(&page).render()).await?;
        }
        term.print(&page_footer(page.meta.current_page, page.meta.total_pages))
            .await?;
        self.page = Some(page);

        term.print("").await?;
        term.print("CART").await?;
        if self.cart.is_empty() {
            term.print("  Cart is empty").await?;
        } else {
            term.print(&self.cart_table().render()).await?;
        }
        term.print(&format!("Total: {}", self.cart.total())).await?;
        Ok(())
    }

    async fn handle(
        &mut self,
        line: &str,
        state: &AppState,
        term: &mut dyn Terminal,
    ) -> ConsoleResult<()> {
        match PosCommand::parse(line)? {
            PosCommand::Add(id) => {
                let product = self.visible_product(id)?;
                self.cart.add(&product);
                debug!(product_id = id, quantity = self.cart.quantity_of(id), "Added to cart");
            }
            PosCommand::Remove(id) => {
                if self.cart.quantity_of(id) == 0 {
                    return Err(ConsoleError::usage(format!("Product {} is not in the cart", id)));
                }
                self.cart.remove(id);
            }
            PosCommand::Pay(payment) => {
                let sold = self.cart.lines().to_vec();
                let transaction = checkout_input(&mut self.cart, &payment, &state.store).await?;
                term.print(&receipt(&transaction)).await?;

                if confirm(term, "Save receipt to file?").await? {
                    let text = receipt_text(&transaction, &sold);
                    match save_receipt(&self.receipts_dir, &transaction, &text) {
                        Ok(path) => {
                            term.print(&format!("Receipt saved to {}", path.display())).await?
                        }
                        // The sale is already recorded, so this is only an alert
                        Err(e) => {
                            let alert = Alert {
                                code: AlertCode::Internal,
                                message: format!("Could not save receipt: {}", e),
                            };
                            term.print(&alert.to_string()).await?
                        }
                    }
                }
            }
            PosCommand::Clear => self.cart.clear(),
            PosCommand::Search(text) => {
                self.query.search = validate_search_query(&text)?;
                self.query.page = 1;
            }
            PosCommand::Next => match &self.page {
                Some(page) if page.meta.has_next() => self.query.page += 1,
                _ => return Err(ConsoleError::usage("Already on the last page")),
            },
            PosCommand::Prev => match &self.page {
                Some(page) if page.meta.has_prev() => self.query.page -= 1,
                _ => return Err(ConsoleError::usage("Already on the first page")),
            },
            PosCommand::Refresh => state.store.invalidate(ResourceFamily::Products).await,
        }
        Ok(())
    }
}
