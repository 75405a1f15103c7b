//! # Authentication Session
//!
//! Owns the process-wide auth token: created at login, restored at startup,
//! destroyed at logout, and read by the API client for every request.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Login Flow                                      │
//! │                                                                         │
//! │  ┌────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │  Login panel   │     │  AuthSession    │     │  Backend        │    │
//! │  └───────┬────────┘     └────────┬────────┘     └────────┬────────┘    │
//! │          │  1. credentials       │                       │             │
//! │          │──────────────────────►│                       │             │
//! │          │                       │  2. POST /login       │             │
//! │          │                       │──────────────────────►│             │
//! │          │                       │◄──────────────────────│             │
//! │          │                       │  200 / 401            │             │
//! │          │                       │                       │             │
//! │          │                       │  3. on 200 only:      │             │
//! │          │                       │     token = base64(user:pass)       │
//! │          │                       │     write token file  │             │
//! │          │  4. LoginReply        │                       │             │
//! │          │◄──────────────────────│                       │             │
//! │                                                                         │
//! │  Every later request: Authorization: Basic <token>                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Storage
//! The token lives in memory behind a `RwLock` and is mirrored to a
//! [`TokenStore`] so a restarted console can skip the login form. The
//! granted role is stored next to it so a restored session keeps its
//! admin tabs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kasir_core::validation::{validate_password, validate_username};
use kasir_core::{Credentials, LoginReply, Role};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::PosApi;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Auth Token
// =============================================================================

/// `base64(username:password)`, sent as `Authorization: Basic <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Encodes credentials into a token.
    pub fn encode(credentials: &Credentials) -> Self {
        let raw = format!("{}:{}", credentials.username, credentials.password);
        AuthToken(STANDARD.encode(raw))
    }

    /// Wraps an already-encoded token (e.g. read back from disk).
    pub fn from_encoded(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return None;
        }
        Some(AuthToken(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("Basic {}", self.0)
    }

    /// Username embedded in the token, if it decodes cleanly.
    pub fn username(&self) -> Option<String> {
        let bytes = STANDARD.decode(&self.0).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        text.split_once(':').map(|(user, _)| user.to_string())
    }
}

/// The token is a reversible encoding of the password.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

// =============================================================================
// Token Store
// =============================================================================

/// What survives a restart: the token and the role the backend granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: AuthToken,
    pub role: Role,
}

/// Client-local persistence for the auth token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// Keeps the token in a single file, readable by the owner only.
///
/// ```text
/// <token>
/// <role>
/// ```
/// A missing or unknown role line restores as [`Role::User`].
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Writes `contents` with mode 0600 on unix.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents.as_bytes())
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<StoredSession>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut lines = contents.lines();
        let Some(token) = lines.next().and_then(AuthToken::from_encoded) else {
            return Ok(None);
        };
        let role = lines
            .next()
            .and_then(|line| line.trim().parse().ok())
            .unwrap_or_default();
        Ok(Some(StoredSession { token, role }))
    }

    fn save(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = format!("{}\n{}\n", session.token.as_str(), session.role);
        write_private(&self.path, &contents)?;
        debug!(path = ?self.path, "Auth token saved");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store for tests and for consoles without a config dir.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<StoredSession>> {
        self.session
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| ClientError::Config("token store poisoned".into()))
    }

    fn save(&self, session: &StoredSession) -> ClientResult<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| ClientError::Config("token store poisoned".into()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| ClientError::Config("token store poisoned".into()))?;
        *guard = None;
        Ok(())
    }
}

// =============================================================================
// Auth Session
// =============================================================================

/// Result of a successful [`AuthSession::login`].
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub reply: LoginReply,
    /// Role from the reply, [`Role::User`] when the backend sent none.
    pub role: Role,
    /// Set when the token could not be written. The session works but
    /// will not survive a restart.
    pub persist_error: Option<ClientError>,
}

/// Shared handle to the current token. Cheap to clone.
#[derive(Clone)]
pub struct AuthSession {
    current: Arc<RwLock<Option<StoredSession>>>,
    store: Arc<dyn TokenStore>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Session backed by [`MemoryTokenStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::default()))
    }

    /// Loads a previously persisted token into memory.
    ///
    /// A read failure is logged and treated as "not logged in".
    pub async fn restore(&self) -> bool {
        match self.store.load() {
            Ok(Some(saved)) => {
                info!(user = ?saved.token.username(), role = %saved.role, "Restored saved session");
                *self.current.write().await = Some(saved);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Could not read saved token");
                false
            }
        }
    }

    /// Validates credentials against the backend, then stores the token.
    ///
    /// ## Flow
    /// 1. Reject empty username/password locally
    /// 2. `POST /login`
    /// 3. Only on success: encode, keep in memory, persist
    ///
    /// A failed login leaves any existing token untouched. A failed save
    /// does not fail the login; it is returned in [`SignedIn::persist_error`].
    pub async fn login(&self, api: &dyn PosApi, credentials: &Credentials) -> ClientResult<SignedIn> {
        validate_username(&credentials.username)?;
        validate_password(&credentials.password)?;

        let reply = api.login(credentials).await?;

        let session = StoredSession {
            token: AuthToken::encode(credentials),
            role: reply.role.unwrap_or_default(),
        };
        let persist_error = self.store.save(&session).err();
        if let Some(e) = &persist_error {
            warn!(error = %e, "Logged in but could not persist token");
        }
        let role = session.role;
        *self.current.write().await = Some(session);

        info!(user = %credentials.username, role = %role, "Logged in");
        Ok(SignedIn {
            reply,
            role,
            persist_error,
        })
    }

    /// Forgets the token in memory and on disk.
    pub async fn logout(&self) -> ClientResult<()> {
        *self.current.write().await = None;
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn current(&self) -> Option<AuthToken> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    /// Role of the logged-in user.
    pub async fn role(&self) -> Option<Role> {
        self.current.read().await.as_ref().map(|s| s.role)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// `Authorization` header value, if logged in.
    pub async fn header_value(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| s.token.header_value())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession").finish_non_exhaustive()
    }
}
