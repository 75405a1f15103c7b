//! # kasir-client: Backend Access for the Kasir Console
//!
//! Authentication, the HTTP API client, the remote-state cache and checkout.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       kasir-client Components                           │
//! │                                                                         │
//! │   console panels                                                       │
//! │        │ reads                    │ mutations / checkout               │
//! │        ▼                          ▼                                     │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │  RemoteStore (store.rs)                 │                           │
//! │  │  get / invalidate / subscribe           │                           │
//! │  └───────────────────┬─────────────────────┘                           │
//! │                      │ dyn PosApi                                       │
//! │  ┌───────────────────▼─────────────────────┐   ┌───────────────────┐  │
//! │  │  HttpApi (api.rs)                       │◄──│ AuthSession       │  │
//! │  │  reqwest + serde_json                   │   │ (auth.rs)         │  │
//! │  └───────────────────┬─────────────────────┘   └───────────────────┘  │
//! │                      │ HTTP/JSON                                        │
//! │                      ▼                                                  │
//! │                  Backend                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wiring
//! ```rust,no_run
//! use std::sync::Arc;
//! use kasir_client::{AuthSession, ClientConfig, FileTokenStore, HttpApi, RemoteStore};
//!
//! # fn wire() -> kasir_client::ClientResult<()> {
//! let config = ClientConfig::load(None)?;
//! let token_path = config.token_path().unwrap_or_else(|| "kasir.token".into());
//! let session = AuthSession::new(Arc::new(FileTokenStore::new(token_path)));
//! let api = HttpApi::from_config(&config, session.clone())?;
//! let store = RemoteStore::new(Arc::new(api));
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpApi, PosApi};
pub use auth::{
    AuthSession, AuthToken, FileTokenStore, MemoryTokenStore, SignedIn, StoredSession, TokenStore,
};
pub use checkout::{checkout, checkout_input};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use store::{Listener, QueryKey, RemoteStore, ResourceFamily, Snapshot, StoreEvent, SubscriptionId};
