//! # Application State
//!
//! Everything the panels share for the life of the process.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────────┐  │
//! │  │ ClientConfig │  │   AuthSession    │  │      RemoteStore         │  │
//! │  │              │  │                  │  │                          │  │
//! │  │ base URL     │  │ Arc<RwLock<      │  │ cache + in-flight map    │  │
//! │  │ page sizes   │  │   Option<Token>  │  │ over Arc<HttpApi>        │  │
//! │  │ token path   │  │ >>               │  │                          │  │
//! │  └──────────────┘  └──────────────────┘  └──────────────────────────┘  │
//! │                                                                         │
//! │  The cart is NOT here: it belongs to the POS panel and dies with it.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use kasir_client::{
    AuthSession, ClientConfig, FileTokenStore, HttpApi, MemoryTokenStore, PosApi, RemoteStore,
    TokenStore,
};
use tracing::{debug, warn};

use crate::error::ConsoleResult;

pub struct AppState {
    pub config: ClientConfig,
    pub session: AuthSession,
    pub store: RemoteStore,
}

impl AppState {
    /// Builds the session and store from configuration.
    ///
    /// Without a usable token path the token lives in memory only and the
    /// operator logs in on every start.
    pub fn new(config: ClientConfig) -> ConsoleResult<Self> {
        let token_store: Arc<dyn TokenStore> = match config.token_path() {
            Some(path) => {
                debug!(path = %path.display(), "Using token file");
                Arc::new(FileTokenStore::new(path))
            }
            None => {
                warn!("No token path available, session will not survive a restart");
                Arc::new(MemoryTokenStore::default())
            }
        };

        let session = AuthSession::new(token_store);
        let api = HttpApi::from_config(&config, session.clone())?;
        Ok(Self::with_api(config, session, Arc::new(api)))
    }

    /// Wires an already-built API and session.
    pub fn with_api(config: ClientConfig, session: AuthSession, api: Arc<dyn PosApi>) -> Self {
        AppState {
            config,
            session,
            store: RemoteStore::new(api),
        }
    }

    pub fn pos_page_size(&self) -> u32 {
        self.config.pages.pos_page_size
    }

    pub fn admin_page_size(&self) -> u32 {
        self.config.pages.admin_page_size
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.config.receipts_dir()
    }
}
