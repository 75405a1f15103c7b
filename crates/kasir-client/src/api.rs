//! # Backend API Client
//!
//! One method per backend operation. Each issues exactly one HTTP request,
//! attaches the session token when there is one, and decodes the JSON reply.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       HttpApi Request Pipeline                          │
//! │                                                                         │
//! │  list_products(&query)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  base_url.join("products") + ?page&limit&search                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Authorization: Basic <token>   (skipped when logged out)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  send ──► transport error ──────────────► RequestFailed { None, .. }   │
//! │       │                                                                 │
//! │       ├── non-2xx ──► body text / "Request failed" ► RequestFailed     │
//! │       │                                                                 │
//! │       └── 2xx ──► serde_json ──► Page<Product>  (or Decode error)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No retries, no client-side timeouts beyond reqwest's defaults.

use async_trait::async_trait;
use kasir_core::{
    Confirmation, Credentials, DeleteRequest, LoginReply, NewProduct, NewTransaction, NewUser,
    NewWarehouse, Page, Product, ProductQuery, ProductUpdate, RecordId, Report, ReportDate,
    Transaction, User, Warehouse, WarehouseUpdate,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::auth::AuthSession;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Trait
// =============================================================================

/// Every backend operation the console uses.
///
/// The store and checkout only see this trait, so they can run against an
/// in-process fake.
#[async_trait]
pub trait PosApi: Send + Sync {
    /// `POST /login`. Sent without a token.
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginReply>;

    async fn list_products(&self, query: &ProductQuery) -> ClientResult<Page<Product>>;
    async fn create_product(&self, product: &NewProduct) -> ClientResult<Product>;
    async fn update_product(&self, product: &ProductUpdate) -> ClientResult<Confirmation>;
    async fn delete_product(&self, id: RecordId) -> ClientResult<Confirmation>;

    async fn list_transactions(&self) -> ClientResult<Vec<Transaction>>;
    async fn create_transaction(&self, transaction: &NewTransaction) -> ClientResult<Transaction>;

    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn create_user(&self, user: &NewUser) -> ClientResult<User>;
    async fn delete_user(&self, id: RecordId) -> ClientResult<Confirmation>;

    async fn list_warehouses(&self) -> ClientResult<Vec<Warehouse>>;
    async fn create_warehouse(&self, warehouse: &NewWarehouse) -> ClientResult<Warehouse>;
    async fn update_warehouse(&self, warehouse: &WarehouseUpdate) -> ClientResult<Confirmation>;
    async fn delete_warehouse(&self, id: RecordId) -> ClientResult<Confirmation>;

    async fn report(&self, date: ReportDate) -> ClientResult<Report>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// [`PosApi`] over reqwest.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    session: AuthSession,
}

impl HttpApi {
    /// `base_url` should end in `/` when it carries a path prefix.
    pub fn new(base_url: Url, session: AuthSession) -> Self {
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }

    pub fn from_config(config: &ClientConfig, session: AuthSession) -> ClientResult<Self> {
        Ok(Self::new(config.base_url()?, session))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base_url.join(path)?;
        debug!(%method, %url, "Sending request");
        Ok(self.client.request(method, url))
    }

    async fn authorized(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let builder = self.request(method, path)?;
        Ok(match self.session.header_value().await {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        })
    }

    /// Sends the request and returns the raw body of a 2xx response.
    async fn execute(&self, builder: RequestBuilder) -> ClientResult<String> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request did not complete");
            ClientError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body.trim(), "Backend returned an error");
            return Err(ClientError::from_response(status.as_u16(), &body));
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ClientResult<T> {
        let builder = self.authorized(Method::GET, path).await?.query(query);
        let body = self.execute(builder).await?;
        decode(&body)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let builder = self.authorized(method, path).await?.json(body);
        let body = self.execute(builder).await?;
        decode(&body)
    }

    /// Like [`send_json`](Self::send_json) but tolerates an empty reply.
    async fn send_for_confirmation<B>(&self, method: Method, path: &str, body: &B) -> ClientResult<Confirmation>
    where
        B: Serialize + ?Sized + Sync,
    {
        let builder = self.authorized(method, path).await?.json(body);
        let body = self.execute(builder).await?;
        if body.trim().is_empty() {
            return Ok(Confirmation::default());
        }
        decode(&body)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let list: Option<Vec<T>> = self.get_json(path, &[]).await?;
        Ok(list.unwrap_or_default())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Could not decode backend response");
        ClientError::from(e)
    })
}

#[async_trait]
impl PosApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginReply> {
        let builder = self.request(Method::POST, "login")?.json(credentials);
        match self.execute(builder).await {
            Ok(body) if body.trim().is_empty() => Ok(LoginReply::default()),
            Ok(body) => decode(&body),
            Err(e) if e.status() == Some(StatusCode::UNAUTHORIZED.as_u16()) => {
                Err(ClientError::AuthenticationFailed)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_products(&self, query: &ProductQuery) -> ClientResult<Page<Product>> {
        self.get_json("products", &query.to_pairs()).await
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<Product> {
        self.send_json(Method::POST, "products", product).await
    }

    async fn update_product(&self, product: &ProductUpdate) -> ClientResult<Confirmation> {
        self.send_for_confirmation(Method::PUT, "products", product).await
    }

    async fn delete_product(&self, id: RecordId) -> ClientResult<Confirmation> {
        self.send_for_confirmation(Method::DELETE, "products", &DeleteRequest { id })
            .await
    }

    async fn list_transactions(&self) -> ClientResult<Vec<Transaction>> {
        self.get_list("transactions").await
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> ClientResult<Transaction> {
        self.send_json(Method::POST, "transactions", transaction).await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get_list("users").await
    }

    async fn create_user(&self, user: &NewUser) -> ClientResult<User> {
        self.send_json(Method::POST, "users", user).await
    }

    async fn delete_user(&self, id: RecordId) -> ClientResult<Confirmation> {
        self.send_for_confirmation(Method::DELETE, "users", &DeleteRequest { id })
            .await
    }

    async fn list_warehouses(&self) -> ClientResult<Vec<Warehouse>> {
        self.get_list("warehouses").await
    }

    async fn create_warehouse(&self, warehouse: &NewWarehouse) -> ClientResult<Warehouse> {
        self.send_json(Method::POST, "warehouses", warehouse).await
    }

    async fn update_warehouse(&self, warehouse: &WarehouseUpdate) -> ClientResult<Confirmation> {
        self.send_for_confirmation(Method::PUT, "warehouses", warehouse)
            .await
    }

    async fn delete_warehouse(&self, id: RecordId) -> ClientResult<Confirmation> {
        self.send_for_confirmation(Method::DELETE, "warehouses", &DeleteRequest { id })
            .await
    }

    async fn report(&self, date: ReportDate) -> ClientResult<Report> {
        self.get_json("reports", &[("date", date.query_value())])
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
