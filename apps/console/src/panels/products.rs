//! # Products Panel
//!
//! Paged product table. Admins also get create, edit, delete and the
//! stock-per-warehouse summary; other users browse read-only.

use async_trait::async_trait;
use kasir_client::ResourceFamily;
use kasir_core::validation::{parse_price, parse_record_id, parse_stock, validate_search_query};
use kasir_core::{
    stock_by_warehouse, NewProduct, Page, Product, ProductQuery, ProductUpdate, RecordId, Role,
    StockSummary,
};

use super::form::{ask, ask_default, confirm};
use super::{id_argument, split_command, unknown_command, Panel, Tab};
use crate::error::{ConsoleError, ConsoleResult};
use crate::render::{page_footer, Table};
use crate::state::AppState;
use crate::terminal::Terminal;

const HELP: &str = "\
Products: create  edit <id>  delete <id>  stock
          search <text>  next  prev  refresh";

const HELP_READ_ONLY: &str = "Products: search <text>  next  prev  refresh";

/// Page size used when walking the whole catalog for the stock summary.
const SUMMARY_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductCommand {
    Create,
    Edit(RecordId),
    Delete(RecordId),
    Stock,
    Search(String),
    Next,
    Prev,
    Refresh,
}

impl ProductCommand {
    /// Commands that change data or show stock value.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            ProductCommand::Create
                | ProductCommand::Edit(_)
                | ProductCommand::Delete(_)
                | ProductCommand::Stock
        )
    }

    pub fn parse(line: &str) -> ConsoleResult<ProductCommand> {
        let (verb, rest) = split_command(line);
        match verb.as_str() {
            "create" | "new" => Ok(ProductCommand::Create),
            "edit" => Ok(ProductCommand::Edit(id_argument("edit", rest)?)),
            "delete" | "del" => Ok(ProductCommand::Delete(id_argument("delete", rest)?)),
            "stock" => Ok(ProductCommand::Stock),
            "search" => Ok(ProductCommand::Search(rest.to_string())),
            "next" => Ok(ProductCommand::Next),
            "prev" => Ok(ProductCommand::Prev),
            "refresh" => Ok(ProductCommand::Refresh),
            other => Err(unknown_command(other)),
        }
    }
}

pub struct ProductsPanel {
    query: ProductQuery,
    page: Option<Page<Product>>,
    role: Role,
}

impl ProductsPanel {
    pub fn new(page_size: u32, role: Role) -> Self {
        ProductsPanel {
            query: ProductQuery::new(1, page_size, ""),
            page: None,
            role,
        }
    }

    fn shown(&self, id: RecordId) -> ConsoleResult<Product> {
        self.page
            .as_ref()
            .and_then(|p| p.data.iter().find(|product| product.id == id))
            .cloned()
            .ok_or_else(|| ConsoleError::usage(format!("Product {} is not on this page", id)))
    }
}

/// Product table as shown in the panel.
pub fn product_table(products: &[Product]) -> Table {
    let mut table = Table::new(&["ID", "Name", "Stock", "Purchase", "Selling", "Warehouse"])
        .right(&[0, 2, 3, 4, 5]);
    for p in products {
        table.row([
            p.id.to_string(),
            p.name.clone(),
            p.stock.to_string(),
            p.purchase_price.to_string(),
            p.selling_price.to_string(),
            p.warehouse_id.map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
        ]);
    }
    table
}

/// Stock summary table with a TOTAL row.
pub fn stock_table(summary: &StockSummary) -> Table {
    let mut table = Table::new(&["Warehouse", "Products", "Stock", "Value"]).right(&[1, 2, 3]);
    for row in &summary.rows {
        table.row([
            row.name.clone(),
            row.product_count.to_string(),
            row.total_stock.to_string(),
            row.stock_value.to_string(),
        ]);
    }
    table.row([
        "TOTAL".to_string(),
        summary.product_count.to_string(),
        summary.total_stock.to_string(),
        summary.stock_value.to_string(),
    ]);
    table
}

/// Every product, page by page.
async fn all_products(state: &AppState) -> ConsoleResult<Vec<Product>> {
    let mut products = Vec::new();
    let mut query = ProductQuery::new(1, SUMMARY_PAGE_SIZE, "");
    loop {
        let page = state.store.products(&query).await?;
        products.extend(page.data);
        if !page.meta.has_next() {
            return Ok(products);
        }
        query.page += 1;
    }
}

async fn create_form(term: &mut dyn Terminal) -> ConsoleResult<NewProduct> {
    let name = ask(term, "Name").await?;
    let purchase_price = parse_price("purchase price", &ask(term, "Purchase price").await?)?;
    let selling_price = parse_price("selling price", &ask(term, "Selling price").await?)?;
    let stock = parse_stock(&ask(term, "Stock").await?)?;
    let warehouse_id = parse_record_id(&ask(term, "Warehouse ID").await?)?;

    Ok(NewProduct {
        name,
        purchase_price,
        selling_price,
        stock,
        warehouse_id,
    })
}

/// Blank answers keep the current values.
async fn edit_form(term: &mut dyn Terminal, current: &Product) -> ConsoleResult<ProductUpdate> {
    let name = ask_default(term, "Name", &current.name).await?;
    let purchase = ask_default(term, "Purchase price", &current.purchase_price.rupiah().to_string()).await?;
    let selling = ask_default(term, "Selling price", &current.selling_price.rupiah().to_string()).await?;
    let stock = ask_default(term, "Stock", &current.stock.to_string()).await?;

    // Untouched prices keep their exact value, sen included.
    let purchase_price = if purchase == current.purchase_price.rupiah().to_string() {
        current.purchase_price
    } else {
        parse_price("purchase price", &purchase)?
    };
    let selling_price = if selling == current.selling_price.rupiah().to_string() {
        current.selling_price
    } else {
        parse_price("selling price", &selling)?
    };

    Ok(ProductUpdate {
        id: current.id,
        name,
        purchase_price,
        selling_price,
        stock: parse_stock(&stock)?,
    })
}

#[async_trait]
impl Panel for ProductsPanel {
    fn tab(&self) -> Tab {
        Tab::Products
    }

    fn help(&self) -> &'static str {
        match self.role {
            Role::Admin => HELP,
            Role::User => HELP_READ_ONLY,
        }
    }

    async fn render(&mut self, state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()> {
        let page = state.store.products(&self.query).await?;
        term.print("PRODUCTS").await?;
        if page.data.is_empty() {
            term.print("  No products found").await?;
        } else {
            term.print(&product_table(&page.data).render()).await?;
        }
        term.print(&page_footer(page.meta.current_page, page.meta.total_pages))
            .await?;
        self.page = Some(page);
        Ok(())
    }

    async fn handle(
        &mut self,
        line: &str,
        state: &AppState,
        term: &mut dyn Terminal,
    ) -> ConsoleResult<()> {
        let command = ProductCommand::parse(line)?;
        if command.requires_admin() && self.role != Role::Admin {
            return Err(ConsoleError::admin_only("change products"));
        }

        match command {
            ProductCommand::Create => {
                let draft = create_form(term).await?;
                let created = state.store.create_product(&draft).await?;
                term.print(&format!("Created product {} ({})", created.id, created.name))
                    .await?;
            }
            ProductCommand::Edit(id) => {
                let current = self.shown(id)?;
                let update = edit_form(term, &current).await?;
                let reply = state.store.update_product(&update).await?;
                term.print(&confirmation_text(&reply.message, "Product updated")).await?;
            }
            ProductCommand::Delete(id) => {
                if !confirm(term, &format!("Delete product {}?", id)).await? {
                    return Ok(());
                }
                let reply = state.store.delete_product(id).await?;
                term.print(&confirmation_text(&reply.message, "Product deleted")).await?;
            }
            ProductCommand::Stock => {
                let warehouses = state.store.warehouses().await?;
                let products = all_products(state).await?;
                let summary = stock_by_warehouse(&warehouses, &products);
                term.print("STOCK BY WAREHOUSE").await?;
                term.print(&stock_table(&summary).render()).await?;
            }
            ProductCommand::Search(text) => {
                self.query.search = validate_search_query(&text)?;
                self.query.page = 1;
            }
            ProductCommand::Next => match &self.page {
                Some(page) if page.meta.has_next() => self.query.page += 1,
                _ => return Err(ConsoleError::usage("Already on the last page")),
            },
            ProductCommand::Prev => match &self.page {
                Some(page) if page.meta.has_prev() => self.query.page -= 1,
                _ => return Err(ConsoleError::usage("Already on the first page")),
            },
            ProductCommand::Refresh => state.store.invalidate(ResourceFamily::Products).await,
        }
        Ok(())
    }
}

/// Server confirmation text, or `fallback` when the body had none.
pub(crate) fn confirmation_text(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ScriptedTerminal;
    use kasir_core::Money;

    fn pulpen() -> Product {
        Product {
            id: 7,
            name: "Pulpen Biru".into(),
            stock: 50,
            purchase_price: Money::from_sen(750_050),
            selling_price: Money::from_rupiah(10_000),
            warehouse_id: Some(1),
            created_at: None,
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ProductCommand::parse("create").unwrap(), ProductCommand::Create);
        assert_eq!(ProductCommand::parse("edit 7").unwrap(), ProductCommand::Edit(7));
        assert_eq!(ProductCommand::parse("del 7").unwrap(), ProductCommand::Delete(7));
        assert_eq!(ProductCommand::parse("stock").unwrap(), ProductCommand::Stock);
        assert!(ProductCommand::parse("edit").is_err());
        assert!(ProductCommand::parse("archive 7").is_err());
    }

    #[test]
    fn test_product_table_shows_missing_warehouse_as_dash() {
        let mut p = pulpen();
        p.warehouse_id = None;
        let rendered = product_table(&[p]).render();
        assert!(rendered.contains("Pulpen Biru"));
        assert!(rendered.lines().nth(2).unwrap().ends_with('-'));
    }

    #[tokio::test]
    async fn test_create_form_builds_draft() {
        let mut term = ScriptedTerminal::new(&["Buku Tulis", "3750", "5000", "20", "2"]);
        let draft = create_form(&mut term).await.unwrap();
        assert_eq!(
            draft,
            NewProduct {
                name: "Buku Tulis".into(),
                purchase_price: Money::from_rupiah(3_750),
                selling_price: Money::from_rupiah(5_000),
                stock: 20,
                warehouse_id: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_create_form_rejects_bad_price() {
        let mut term = ScriptedTerminal::new(&["Buku", "murah", "5000", "20", "2"]);
        let err = create_form(&mut term).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Client(e) if e.is_validation()));
    }

    #[tokio::test]
    async fn test_edit_form_keeps_blank_fields() {
        let mut term = ScriptedTerminal::new(&["", "", "12000", "45"]);
        let update = edit_form(&mut term, &pulpen()).await.unwrap();
        assert_eq!(update.id, 7);
        assert_eq!(update.name, "Pulpen Biru");
        assert_eq!(update.purchase_price, Money::from_sen(750_050));
        assert_eq!(update.selling_price, Money::from_rupiah(12_000));
        assert_eq!(update.stock, 45);
    }

    #[test]
    fn test_admin_only_commands() {
        assert!(ProductCommand::Create.requires_admin());
        assert!(ProductCommand::Delete(7).requires_admin());
        assert!(ProductCommand::Stock.requires_admin());
        assert!(!ProductCommand::Search("pen".into()).requires_admin());
        assert!(!ProductCommand::Next.requires_admin());
    }

    #[test]
    fn test_stock_table_ends_with_total() {
        let warehouses = [kasir_core::Warehouse {
            id: 1,
            name: "Gudang Pusat".into(),
            address: String::new(),
        }];
        let summary = stock_by_warehouse(&warehouses, &[pulpen()]);
        let rendered = stock_table(&summary).render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with(" Gudang Pusat"));
        assert!(lines[2].ends_with("Rp 500.000"));
        assert!(lines[3].starts_with(" TOTAL"));
    }

    #[test]
    fn test_confirmation_text_fallback() {
        assert_eq!(confirmation_text("", "Product deleted"), "Product deleted");
        assert_eq!(confirmation_text("Deleted!", "Product deleted"), "Deleted!");
    }
}
