//! In-process [`PosApi`] used by the store, checkout and auth tests.
//!
//! Keeps a small product table, counts calls per operation, and can delay
//! or fail operations on demand.

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use kasir_core::{
    Confirmation, Credentials, LoginReply, Money, NewProduct, NewTransaction, NewUser,
    NewWarehouse, Page, PageMeta, Product, ProductQuery, ProductUpdate, RecordId, Report,
    ReportDate, ReportSummary, Role, Transaction, User, Warehouse, WarehouseUpdate,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::PosApi;
use crate::error::{ClientError, ClientResult};

#[derive(Default)]
struct State {
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, ClientError>,
    products: Vec<Product>,
    transactions: Vec<Transaction>,
    warehouses: Vec<Warehouse>,
    users: Vec<User>,
    next_id: RecordId,
}

pub(crate) struct FakeApi {
    state: Mutex<State>,
    delay: Duration,
    reject_logins: AtomicBool,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    /// Every operation sleeps for `delay` before answering.
    pub(crate) fn with_delay(delay: Duration) -> Self {
        let state = State {
            next_id: 100,
            products: vec![
                product(1, "Pulpen Biru", 10_000),
                product(2, "Buku Tulis", 5_000),
            ],
            ..State::default()
        };
        FakeApi {
            state: Mutex::new(state),
            delay,
            reject_logins: AtomicBool::new(false),
        }
    }

    pub(crate) fn reject_logins(&self, reject: bool) {
        self.reject_logins.store(reject, Ordering::SeqCst);
    }

    /// Makes every later call to `op` fail with `err`.
    pub(crate) fn fail(&self, op: &'static str, err: ClientError) {
        self.state.lock().unwrap().failures.insert(op, err);
    }

    pub(crate) fn calls(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.get(op).copied().unwrap_or(0)
    }

    pub(crate) fn product(&self, id: RecordId) -> Option<Product> {
        let state = self.state.lock().unwrap();
        state.products.iter().find(|p| p.id == id).cloned()
    }

    async fn enter(&self, op: &'static str) -> ClientResult<()> {
        let failure = {
            let mut state = self.state.lock().unwrap();
            *state.calls.entry(op).or_insert(0) += 1;
            state.failures.get(op).cloned()
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> RecordId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.next_id
    }
}

pub(crate) fn product(id: RecordId, name: &str, selling: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        stock: 50,
        purchase_price: Money::from_rupiah(selling * 3 / 4),
        selling_price: Money::from_rupiah(selling),
        warehouse_id: Some(1),
        created_at: None,
    }
}

fn confirmed(message: &str) -> Confirmation {
    Confirmation {
        message: message.to_string(),
    }
}

#[async_trait]
impl PosApi for FakeApi {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginReply> {
        self.enter("login").await?;
        if self.reject_logins.load(Ordering::SeqCst) {
            return Err(ClientError::AuthenticationFailed);
        }
        Ok(LoginReply {
            message: "Login successful".into(),
            user: credentials.username.clone(),
            role: Some(Role::Admin),
        })
    }

    async fn list_products(&self, query: &ProductQuery) -> ClientResult<Page<Product>> {
        self.enter("list_products").await?;
        let state = self.state.lock().unwrap();
        let matching: Vec<Product> = state
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query.search.to_lowercase()))
            .cloned()
            .collect();

        let limit = query.limit as usize;
        let total_pages = matching.len().div_ceil(limit) as u32;
        let data = matching
            .iter()
            .skip((query.page as usize - 1) * limit)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page {
            data,
            meta: PageMeta {
                current_page: query.page,
                total_pages,
                limit: Some(query.limit),
                total_items: Some(matching.len() as u64),
            },
        })
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<Product> {
        self.enter("create_product").await?;
        let created = Product {
            id: self.next_id(),
            name: product.name.clone(),
            stock: product.stock,
            purchase_price: product.purchase_price,
            selling_price: product.selling_price,
            warehouse_id: Some(product.warehouse_id),
            created_at: None,
        };
        self.state.lock().unwrap().products.push(created.clone());
        Ok(created)
    }

    async fn update_product(&self, update: &ProductUpdate) -> ClientResult<Confirmation> {
        self.enter("update_product").await?;
        let mut state = self.state.lock().unwrap();
        let existing = state
            .products
            .iter_mut()
            .find(|p| p.id == update.id)
            .ok_or_else(|| ClientError::from_response(500, "sql: no rows in result set"))?;
        existing.name = update.name.clone();
        existing.stock = update.stock;
        existing.purchase_price = update.purchase_price;
        existing.selling_price = update.selling_price;
        Ok(confirmed("Product updated"))
    }

    async fn delete_product(&self, id: RecordId) -> ClientResult<Confirmation> {
        self.enter("delete_product").await?;
        self.state.lock().unwrap().products.retain(|p| p.id != id);
        Ok(confirmed("Product deleted"))
    }

    async fn list_transactions(&self) -> ClientResult<Vec<Transaction>> {
        self.enter("list_transactions").await?;
        Ok(self.state.lock().unwrap().transactions.clone())
    }

    async fn create_transaction(&self, request: &NewTransaction) -> ClientResult<Transaction> {
        self.enter("create_transaction").await?;
        let id = self.next_id();
        let mut state = self.state.lock().unwrap();

        let mut total = Money::zero();
        let mut profit = Money::zero();
        for item in &request.items {
            let product = state
                .products
                .iter_mut()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| ClientError::from_response(400, "Product not found"))?;
            if product.stock < i64::from(item.quantity) {
                return Err(ClientError::from_response(
                    500,
                    &format!("Transaction failed: insufficient stock for product {}", product.name),
                ));
            }
            product.stock -= i64::from(item.quantity);
            total += product.selling_price * item.quantity;
            profit += product.unit_profit() * item.quantity;
        }

        let created_at = FixedOffset::east_opt(7 * 3600)
            .and_then(|tz| tz.with_ymd_and_hms(2024, 5, 17, 14, 5, 0).single())
            .expect("valid fixed timestamp");
        let transaction = Transaction {
            id,
            total,
            profit,
            payment: request.payment,
            change: request.payment - total,
            created_at,
            user_id: Some(1),
            warehouse_id: Some(1),
            items: Vec::new(),
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.enter("list_users").await?;
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn create_user(&self, user: &NewUser) -> ClientResult<User> {
        self.enter("create_user").await?;
        let created = User {
            id: self.next_id(),
            username: user.username.clone(),
            role: user.role,
            warehouse_id: user.warehouse_id,
        };
        self.state.lock().unwrap().users.push(created.clone());
        Ok(created)
    }

    async fn delete_user(&self, id: RecordId) -> ClientResult<Confirmation> {
        self.enter("delete_user").await?;
        self.state.lock().unwrap().users.retain(|u| u.id != id);
        Ok(confirmed("User deleted"))
    }

    async fn list_warehouses(&self) -> ClientResult<Vec<Warehouse>> {
        self.enter("list_warehouses").await?;
        Ok(self.state.lock().unwrap().warehouses.clone())
    }

    async fn create_warehouse(&self, warehouse: &NewWarehouse) -> ClientResult<Warehouse> {
        self.enter("create_warehouse").await?;
        let created = Warehouse {
            id: self.next_id(),
            name: warehouse.name.clone(),
            address: warehouse.address.clone(),
        };
        self.state.lock().unwrap().warehouses.push(created.clone());
        Ok(created)
    }

    async fn update_warehouse(&self, update: &WarehouseUpdate) -> ClientResult<Confirmation> {
        self.enter("update_warehouse").await?;
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.warehouses.iter_mut().find(|w| w.id == update.id) {
            existing.name = update.name.clone();
            existing.address = update.address.clone();
        }
        Ok(confirmed("Warehouse updated"))
    }

    async fn delete_warehouse(&self, id: RecordId) -> ClientResult<Confirmation> {
        self.enter("delete_warehouse").await?;
        self.state.lock().unwrap().warehouses.retain(|w| w.id != id);
        Ok(confirmed("Warehouse deleted"))
    }

    async fn report(&self, date: ReportDate) -> ClientResult<Report> {
        self.enter("report").await?;
        let state = self.state.lock().unwrap();
        let transactions = state.transactions.clone();
        Ok(Report {
            date: date.query_value(),
            summary: ReportSummary {
                total_sales: transactions.iter().map(|t| t.total).sum(),
                total_profit: transactions.iter().map(|t| t.profit).sum(),
                transaction_count: transactions.len() as u64,
            },
            transactions,
        })
    }
}
