//! # Login Form
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Username: admin                                                        │
//! │  Password:                                                              │
//! │       │                                                                 │
//! │       ├── rejected ──► "Invalid username or password", ask again       │
//! │       ├── other    ──► alert line, ask again                           │
//! │       └── accepted ──► token saved, dashboard opens                    │
//! │                        (save failed ──► alert, session lasts this run) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_client::ClientError;
use kasir_core::{Credentials, Role};
use tracing::info;

use crate::error::{Alert, AlertCode, ConsoleError, ConsoleResult};
use crate::state::AppState;
use crate::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn { user: String, role: Role },
    /// Input ended before a successful login.
    Closed,
}

/// Prompts until the backend accepts the credentials.
pub async fn login_form(state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<LoginOutcome> {
    term.print("Kasir: please log in").await?;

    loop {
        let Some(username) = term.read_line("Username: ").await? else {
            return Ok(LoginOutcome::Closed);
        };
        let Some(password) = term.read_secret("Password: ").await? else {
            return Ok(LoginOutcome::Closed);
        };

        let credentials = Credentials::new(username.trim(), password);
        match state.session.login(state.store.api(), &credentials).await {
            Ok(signed_in) => {
                let user = if signed_in.reply.user.is_empty() {
                    credentials.username.clone()
                } else {
                    signed_in.reply.user
                };
                info!(user = %user, role = %signed_in.role, "Dashboard opened");
                term.print(&format!("Welcome, {}", user)).await?;
                if let Some(e) = signed_in.persist_error {
                    let alert = Alert {
                        code: AlertCode::Config,
                        message: format!(
                            "Logged in, but the session could not be saved ({}). \
                             You will need to log in again after a restart.",
                            e
                        ),
                    };
                    term.print(&alert.to_string()).await?;
                }
                return Ok(LoginOutcome::LoggedIn {
                    user,
                    role: signed_in.role,
                });
            }
            Err(ClientError::AuthenticationFailed) => {
                term.print(&ClientError::AuthenticationFailed.to_string()).await?;
            }
            Err(e) => {
                term.print(&ConsoleError::from(e).alert().to_string()).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::ScriptedTerminal;
    use kasir_client::{AuthSession, ClientConfig, HttpApi, StoredSession, TokenStore};
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Token store on a read-only medium.
    struct UnwritableStore;

    impl TokenStore for UnwritableStore {
        fn load(&self) -> kasir_client::ClientResult<Option<StoredSession>> {
            Ok(None)
        }

        fn save(&self, _session: &StoredSession) -> kasir_client::ClientResult<()> {
            Err(ClientError::Config("permission denied".into()))
        }

        fn clear(&self) -> kasir_client::ClientResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unsaved_session_is_announced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful", "user": "kasir1", "role": "user"
            })))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let session = AuthSession::new(Arc::new(UnwritableStore));
        let api = HttpApi::new(base, session.clone());
        let state = AppState::with_api(ClientConfig::default(), session, Arc::new(api));
        let mut term = ScriptedTerminal::new(&["kasir1", "rahasia"]);

        let outcome = login_form(&state, &mut term).await.unwrap();

        assert_eq!(
            outcome,
            LoginOutcome::LoggedIn {
                user: "kasir1".into(),
                role: Role::User
            }
        );
        assert!(term.output.contains("! [CONFIG] Logged in, but the session could not be saved"));
        assert!(term.output.contains("permission denied"));
    }
}
