//! # Remote-State Store
//!
//! Cache in front of [`PosApi`] reads. Collapses identical in-flight reads,
//! drops entries when a mutation changes their resource family, and tells
//! subscribers when a key is refreshed or invalidated.
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RemoteStore::get(key)                            │
//! │                                                                         │
//! │  lock map ──► fresh value? ──yes──► return it                          │
//! │                   │ no                                                  │
//! │                   ▼                                                     │
//! │              fetch in flight? ──yes──► clone Shared future             │
//! │                   │ no                                                  │
//! │                   ▼                                                     │
//! │              start fetch (tagged with family generation)               │
//! │  unlock map                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  await Shared future  ◄── every concurrent caller awaits the same one  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  generation unchanged? ──yes──► store as fresh, notify Updated         │
//! │                          no ──► hand result to callers, store nothing  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invalidation
//! ```text
//! create_product ──► POST /products ──► ok ──► invalidate(Products)
//!                                               │
//!                                               ├── generation += 1
//!                                               ├── every Products entry → stale
//!                                               ├── in-flight Products reads detached
//!                                               └── subscribers get Invalidated
//! ```
//!
//! The map lives behind a `tokio::sync::Mutex` that is never held across a
//! network await. Callbacks run after the lock is released.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use kasir_core::validation::{
    validate_new_product, validate_new_user, validate_new_warehouse, validate_product_update,
};
use kasir_core::{
    Confirmation, NewProduct, NewTransaction, NewUser, NewWarehouse, Page, Product, ProductQuery,
    ProductUpdate, RecordId, Report, ReportDate, Transaction, User, Warehouse, WarehouseUpdate,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::PosApi;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Keys & Values
// =============================================================================

/// Resource groups that are invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFamily {
    Products,
    Transactions,
    Users,
    Warehouses,
    Reports,
}

/// Cache key: resource plus the parameters that select a view of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products(ProductQuery),
    Transactions,
    Users,
    Warehouses,
    Report(ReportDate),
}

impl QueryKey {
    pub fn family(&self) -> ResourceFamily {
        match self {
            QueryKey::Products(_) => ResourceFamily::Products,
            QueryKey::Transactions => ResourceFamily::Transactions,
            QueryKey::Users => ResourceFamily::Users,
            QueryKey::Warehouses => ResourceFamily::Warehouses,
            QueryKey::Report(_) => ResourceFamily::Reports,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Products(q) => write!(
                f,
                "products?page={}&limit={}&search={}",
                q.page, q.limit, q.search
            ),
            QueryKey::Transactions => write!(f, "transactions"),
            QueryKey::Users => write!(f, "users"),
            QueryKey::Warehouses => write!(f, "warehouses"),
            QueryKey::Report(date) => write!(f, "reports?date={}", date.query_value()),
        }
    }
}

/// A decoded backend read.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Products(Page<Product>),
    Transactions(Vec<Transaction>),
    Users(Vec<User>),
    Warehouses(Vec<Warehouse>),
    Report(Report),
}

/// What happened to a subscribed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// A fresh value was stored.
    Updated,
    /// The value was marked stale; the next read refetches.
    Invalidated,
}

/// Subscriber callback. Runs on the task that caused the event.
pub type Listener = Arc<dyn Fn(&QueryKey, StoreEvent) + Send + Sync>;

/// Handle returned by [`RemoteStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type SharedFetch = Shared<BoxFuture<'static, ClientResult<Arc<Snapshot>>>>;

// =============================================================================
// Internal State
// =============================================================================

#[derive(Default)]
struct Entry {
    value: Option<Arc<Snapshot>>,
    stale: bool,
    in_flight: Option<SharedFetch>,
}

impl Entry {
    fn fresh(&self) -> Option<Arc<Snapshot>> {
        if self.stale {
            return None;
        }
        self.value.clone()
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<ResourceFamily, u64>,
    listeners: HashMap<SubscriptionId, (QueryKey, Listener)>,
    next_subscription: u64,
}

impl Inner {
    fn generation(&self, family: ResourceFamily) -> u64 {
        self.generations.get(&family).copied().unwrap_or(0)
    }

    fn listeners_for<F>(&self, matches: F) -> Vec<(QueryKey, Listener)>
    where
        F: Fn(&QueryKey) -> bool,
    {
        self.listeners
            .values()
            .filter(|(key, _)| matches(key))
            .map(|(key, listener)| (key.clone(), Arc::clone(listener)))
            .collect()
    }

    /// Records a finished fetch. Returns the listeners to notify.
    fn complete(
        &mut self,
        key: &QueryKey,
        generation: u64,
        result: &ClientResult<Arc<Snapshot>>,
    ) -> Vec<(QueryKey, Listener)> {
        if generation != self.generation(key.family()) {
            debug!(%key, "Discarding response that arrived after invalidation");
            return Vec::new();
        }

        let entry = self.entries.entry(key.clone()).or_default();
        entry.in_flight = None;

        match result {
            Ok(value) => {
                entry.value = Some(Arc::clone(value));
                entry.stale = false;
                self.listeners_for(|k| k == key)
            }
            Err(_) => Vec::new(),
        }
    }
}

fn notify(listeners: Vec<(QueryKey, Listener)>, event: StoreEvent) {
    for (key, listener) in listeners {
        listener(&key, event);
    }
}

async fn fetch(api: &dyn PosApi, key: &QueryKey) -> ClientResult<Snapshot> {
    Ok(match key {
        QueryKey::Products(query) => Snapshot::Products(api.list_products(query).await?),
        QueryKey::Transactions => Snapshot::Transactions(api.list_transactions().await?),
        QueryKey::Users => Snapshot::Users(api.list_users().await?),
        QueryKey::Warehouses => Snapshot::Warehouses(api.list_warehouses().await?),
        QueryKey::Report(date) => Snapshot::Report(api.report(*date).await?),
    })
}

fn unexpected(key: &QueryKey) -> ClientError {
    ClientError::Decode(format!("cached value for {} has the wrong shape", key))
}

// =============================================================================
// Remote Store
// =============================================================================

/// Shared cache handle. Cheap to clone.
#[derive(Clone)]
pub struct RemoteStore {
    api: Arc<dyn PosApi>,
    inner: Arc<Mutex<Inner>>,
}

impl RemoteStore {
    pub fn new(api: Arc<dyn PosApi>) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// The API the store reads through. Login goes through this directly.
    pub fn api(&self) -> &dyn PosApi {
        self.api.as_ref()
    }

    // =========================================================================
    // Cache Operations
    // =========================================================================

    /// Cached-or-fetch read.
    ///
    /// Concurrent calls for the same key share one request and all receive
    /// its result, success or failure.
    pub async fn get(&self, key: &QueryKey) -> ClientResult<Arc<Snapshot>> {
        let pending = {
            let mut inner = self.inner.lock().await;
            let generation = inner.generation(key.family());
            let entry = inner.entries.entry(key.clone()).or_default();

            if let Some(value) = entry.fresh() {
                debug!(%key, "Cache hit");
                return Ok(value);
            }

            match &entry.in_flight {
                Some(pending) => {
                    debug!(%key, "Joining in-flight request");
                    pending.clone()
                }
                None => {
                    debug!(%key, generation, "Fetching");
                    let pending = self.start_fetch(key.clone(), generation);
                    entry.in_flight = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn start_fetch(&self, key: QueryKey, generation: u64) -> SharedFetch {
        let api = Arc::clone(&self.api);
        let inner = Arc::clone(&self.inner);

        async move {
            let result = fetch(api.as_ref(), &key).await.map(Arc::new);
            let listeners = inner.lock().await.complete(&key, generation, &result);
            notify(listeners, StoreEvent::Updated);
            result
        }
        .boxed()
        .shared()
    }

    /// Last stored value for `key` and whether it is stale. Never fetches.
    pub async fn cached(&self, key: &QueryKey) -> Option<(Arc<Snapshot>, bool)> {
        let inner = self.inner.lock().await;
        let entry = inner.entries.get(key)?;
        entry.value.clone().map(|value| (value, entry.stale))
    }

    /// Marks every entry of `family` stale and notifies its subscribers.
    ///
    /// Reads already in flight still answer their callers but their results
    /// are not stored.
    pub async fn invalidate(&self, family: ResourceFamily) {
        let listeners = {
            let mut inner = self.inner.lock().await;
            *inner.generations.entry(family).or_insert(0) += 1;

            let mut touched = 0usize;
            for (key, entry) in inner.entries.iter_mut() {
                if key.family() == family {
                    entry.stale = true;
                    entry.in_flight = None;
                    touched += 1;
                }
            }
            debug!(?family, entries = touched, "Invalidated");

            inner.listeners_for(|key| key.family() == family)
        };

        notify(listeners, StoreEvent::Invalidated);
    }

    /// Drops every entry. Used on logout.
    pub async fn clear(&self) {
        let listeners = {
            let mut inner = self.inner.lock().await;
            for family in [
                ResourceFamily::Products,
                ResourceFamily::Transactions,
                ResourceFamily::Users,
                ResourceFamily::Warehouses,
                ResourceFamily::Reports,
            ] {
                *inner.generations.entry(family).or_insert(0) += 1;
            }
            inner.entries.clear();
            inner.listeners_for(|_| true)
        };

        notify(listeners, StoreEvent::Invalidated);
    }

    /// Registers `listener` for refresh/invalidation events on `key`.
    pub async fn subscribe<F>(&self, key: QueryKey, listener: F) -> SubscriptionId
    where
        F: Fn(&QueryKey, StoreEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().await;
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.listeners.insert(id, (key, Arc::new(listener)));
        id
    }

    /// Returns false if the id was unknown.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.lock().await.listeners.remove(&id).is_some()
    }

    // =========================================================================
    // Typed Reads
    // =========================================================================

    pub async fn products(&self, query: &ProductQuery) -> ClientResult<Page<Product>> {
        let key = QueryKey::Products(query.clone());
        match &*self.get(&key).await? {
            Snapshot::Products(page) => Ok(page.clone()),
            _ => Err(unexpected(&key)),
        }
    }

    pub async fn transactions(&self) -> ClientResult<Vec<Transaction>> {
        let key = QueryKey::Transactions;
        match &*self.get(&key).await? {
            Snapshot::Transactions(list) => Ok(list.clone()),
            _ => Err(unexpected(&key)),
        }
    }

    pub async fn users(&self) -> ClientResult<Vec<User>> {
        let key = QueryKey::Users;
        match &*self.get(&key).await? {
            Snapshot::Users(list) => Ok(list.clone()),
            _ => Err(unexpected(&key)),
        }
    }

    pub async fn warehouses(&self) -> ClientResult<Vec<Warehouse>> {
        let key = QueryKey::Warehouses;
        match &*self.get(&key).await? {
            Snapshot::Warehouses(list) => Ok(list.clone()),
            _ => Err(unexpected(&key)),
        }
    }

    pub async fn report(&self, date: ReportDate) -> ClientResult<Report> {
        let key = QueryKey::Report(date);
        match &*self.get(&key).await? {
            Snapshot::Report(report) => Ok(report.clone()),
            _ => Err(unexpected(&key)),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================
    // Each one validates locally, sends exactly one request, and invalidates
    // the affected families only on success.

    pub async fn create_product(&self, product: &NewProduct) -> ClientResult<Product> {
        validate_new_product(product)?;
        let created = self.api.create_product(product).await?;
        info!(id = created.id, name = %created.name, "Product created");
        self.invalidate(ResourceFamily::Products).await;
        Ok(created)
    }

    pub async fn update_product(&self, product: &ProductUpdate) -> ClientResult<Confirmation> {
        validate_product_update(product)?;
        let ack = self.api.update_product(product).await?;
        info!(id = product.id, "Product updated");
        self.invalidate(ResourceFamily::Products).await;
        Ok(ack)
    }

    pub async fn delete_product(&self, id: RecordId) -> ClientResult<Confirmation> {
        let ack = self.api.delete_product(id).await?;
        info!(id, "Product deleted");
        self.invalidate(ResourceFamily::Products).await;
        Ok(ack)
    }

    /// Records a sale. Stock, the transaction list and reports all change.
    pub async fn create_transaction(&self, transaction: &NewTransaction) -> ClientResult<Transaction> {
        let created = self.api.create_transaction(transaction).await?;
        info!(
            id = created.id,
            total = %created.total,
            change = %created.change,
            "Transaction recorded"
        );
        self.invalidate(ResourceFamily::Products).await;
        self.invalidate(ResourceFamily::Transactions).await;
        self.invalidate(ResourceFamily::Reports).await;
        Ok(created)
    }

    pub async fn create_user(&self, user: &NewUser) -> ClientResult<User> {
        validate_new_user(user)?;
        let created = self.api.create_user(user).await?;
        info!(id = created.id, username = %created.username, "User created");
        self.invalidate(ResourceFamily::Users).await;
        Ok(created)
    }

    pub async fn delete_user(&self, id: RecordId) -> ClientResult<Confirmation> {
        let ack = self.api.delete_user(id).await?;
        info!(id, "User deleted");
        self.invalidate(ResourceFamily::Users).await;
        Ok(ack)
    }

    pub async fn create_warehouse(&self, warehouse: &NewWarehouse) -> ClientResult<Warehouse> {
        validate_new_warehouse(warehouse)?;
        let created = self.api.create_warehouse(warehouse).await?;
        info!(id = created.id, name = %created.name, "Warehouse created");
        self.invalidate(ResourceFamily::Warehouses).await;
        Ok(created)
    }

    pub async fn update_warehouse(&self, warehouse: &WarehouseUpdate) -> ClientResult<Confirmation> {
        kasir_core::validation::validate_warehouse_name(&warehouse.name)?;
        let ack = self.api.update_warehouse(warehouse).await?;
        info!(id = warehouse.id, "Warehouse updated");
        self.invalidate(ResourceFamily::Warehouses).await;
        Ok(ack)
    }

    pub async fn delete_warehouse(&self, id: RecordId) -> ClientResult<Confirmation> {
        let ack = self.api.delete_warehouse(id).await?;
        info!(id, "Warehouse deleted");
        self.invalidate(ResourceFamily::Warehouses).await;
        Ok(ack)
    }
}

impl fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStore").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
