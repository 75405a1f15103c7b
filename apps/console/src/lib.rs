//! # Kasir Console Library
//!
//! Terminal front end for the Kasir point-of-sale backend.
//!
//! ## Module Organization
//! ```text
//! kasir_console/
//! ├── lib.rs           ◄─── You are here (startup & session loop)
//! ├── state.rs         ◄─── AppState: config, session, store
//! ├── terminal.rs      ◄─── Terminal trait, stdin/stdout implementation
//! ├── render.rs        ◄─── Plain-text tables
//! ├── receipt.rs       ◄─── Receipt text and files
//! ├── error.rs         ◄─── ConsoleError and operator alerts
//! └── panels/
//!     ├── mod.rs       ◄─── Tabs, shell commands, dashboard loop
//!     ├── form.rs      ◄─── Prompt helpers
//!     ├── login.rs     ◄─── Login form
//!     ├── pos.rs       ◄─── Catalog, cart, checkout
//!     ├── products.rs  ◄─── Product CRUD
//!     ├── users.rs     ◄─── User create/delete
//!     ├── warehouses.rs◄─── Warehouse CRUD
//!     └── reports.rs   ◄─── Daily report
//! ```
//!
//! ## Session Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   restore saved token ──── found (role kept) ─┐                        │
//! │          │                                    │                        │
//! │        none                                   │                        │
//! │          ▼                                    ▼                        │
//! │   ┌─────────────┐   logged in      ┌─────────────────────┐             │
//! │   │ login form  │ ───────────────► │     dashboard       │             │
//! │   └─────────────┘                  └─────────────────────┘             │
//! │          ▲                           │ logout      │ quit / EOF        │
//! │          │   token + cache cleared   │             ▼                   │
//! │          └───────────────────────────┘           exit                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod panels;
pub mod receipt;
pub mod render;
pub mod state;
pub mod terminal;

use std::path::PathBuf;

use kasir_client::ClientConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::{ConsoleError, ConsoleResult};
use panels::login::{login_form, LoginOutcome};
use panels::{dashboard, Exit};
use state::AppState;
use terminal::{StdTerminal, Terminal};

const USAGE: &str = "\
Usage: kasir-console [OPTIONS]

Options:
  -c, --config <PATH>  Config file (default: platform config dir/console.toml)
  -h, --help           Show this help

Environment:
  KASIR_API_URL, KASIR_TOKEN_PATH, KASIR_POS_PAGE_SIZE, KASIR_ADMIN_PAGE_SIZE,
  KASIR_RECEIPTS_DIR
  RUST_LOG             Log filter (default: info,kasir=debug)";

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run { config: Option<PathBuf> },
    Help,
}

/// Parses arguments after the program name.
pub fn parse_args<I>(args: I) -> ConsoleResult<CliAction>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let mut config = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| ConsoleError::usage("--config needs a path"))?;
                config = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => return Ok(CliAction::Help),
            other => {
                return Err(ConsoleError::usage(format!(
                    "Unknown argument '{}'\n\n{}",
                    other, USAGE
                )))
            }
        }
        i += 1;
    }

    Ok(CliAction::Run { config })
}

/// Runs the console on stdin/stdout.
///
/// ## Startup Sequence
/// 1. Logging to stderr (`RUST_LOG` overrides the default filter)
/// 2. Command line
/// 3. Configuration: defaults, TOML file, `KASIR_*` environment
/// 4. Session and store
/// 5. Login form / dashboard loop
pub async fn run() -> ConsoleResult<()> {
    init_tracing();

    let config_path = match parse_args(std::env::args().skip(1))? {
        CliAction::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliAction::Run { config } => config,
    };

    let config = ClientConfig::load(config_path)?;
    info!(api = %config.api.base_url, "Starting Kasir console");

    let state = AppState::new(config)?;
    let mut terminal = StdTerminal::new();
    run_session(&state, &mut terminal).await
}

/// Login form and dashboard until the operator quits or input ends.
pub async fn run_session(state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()> {
    if state.session.restore().await {
        if let Some(user) = state.session.current().await.and_then(|t| t.username()) {
            term.print(&format!("Welcome back, {}", user)).await?;
        }
    }

    loop {
        let role = if state.session.is_authenticated().await {
            state.session.role().await.unwrap_or_default()
        } else {
            match login_form(state, term).await? {
                LoginOutcome::LoggedIn { role, .. } => role,
                LoginOutcome::Closed => return Ok(()),
            }
        };

        match dashboard(state, role, term).await? {
            Exit::Logout => {
                state.session.logout().await?;
                state.store.clear().await;
                term.print("Logged out").await?;
            }
            Exit::Quit => {
                info!("Console closed");
                return Ok(());
            }
        }
    }
}

/// Log lines go to stderr so they never land inside a rendered panel.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kasir=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_client::{AuthSession, AuthToken, HttpApi, MemoryTokenStore, StoredSession, TokenStore};
    use kasir_core::{Credentials, Role};
    use serde_json::json;
    use std::sync::Arc;
    use crate::terminal::ScriptedTerminal;
    use url::Url;
    use wiremock::matchers::{body_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(args(&[])).unwrap(), CliAction::Run { config: None });
        assert_eq!(
            parse_args(args(&["-c", "/etc/kasir.toml"])).unwrap(),
            CliAction::Run {
                config: Some(PathBuf::from("/etc/kasir.toml"))
            }
        );
        assert_eq!(parse_args(args(&["--help"])).unwrap(), CliAction::Help);
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
    }

    fn state_with(server: &MockServer, config: ClientConfig, session: AuthSession) -> AppState {
        let base = Url::parse(&format!("{}/", server.uri())).unwrap();
        let api = HttpApi::new(base, session.clone());
        AppState::with_api(config, session, Arc::new(api))
    }

    async fn state_for(server: &MockServer) -> AppState {
        state_with(server, ClientConfig::default(), AuthSession::in_memory())
    }

    async fn mount_catalog(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "12"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"ID": 1, "Name": "Pulpen Biru", "Stock": 50,
                     "PurchasePrice": 7500, "SellingPrice": 10000, "WarehouseID": 1},
                    {"ID": 2, "Name": "Buku Tulis", "Stock": 30,
                     "PurchasePrice": 3750, "SellingPrice": 5000, "WarehouseID": 1}
                ],
                "meta": {"current_page": 1, "total_pages": 1}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_sell_and_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful", "user": "admin", "role": "admin"
            })))
            .mount(&server)
            .await;
        mount_catalog(&server).await;
        Mock::given(method("POST"))
            .and(path("/transactions"))
            .and(body_json(json!({
                "items": [{"product_id": 1, "quantity": 2}],
                "payment": 50000.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ID": 101, "Total": 20000, "Profit": 5000, "Payment": 50000,
                "Change": 30000, "CreatedAt": "2024-05-17T14:05:00+07:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipts = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.receipts.dir = Some(receipts.path().to_path_buf());
        let state = state_with(&server, config, AuthSession::in_memory());
        let mut term = ScriptedTerminal::new(&[
            "admin", "wrong",
            "admin", "admin123",
            "add 1", "add 1", "add 9",
            "pay 15000",
            "pay 50.000",
            "y",
            "logout",
        ]);

        run_session(&state, &mut term).await.unwrap();

        let out = &term.output;
        assert!(out.contains("Invalid username or password"));
        assert!(out.contains("Welcome, admin"));
        assert!(out.contains("Product 9 is not on this page"));
        assert!(out.contains("! [VALIDATION] Insufficient payment"));
        assert!(out.contains("Sale recorded: TRX-000101"));
        assert!(out.contains("Change:  Rp 30.000"));
        assert!(out.contains("Receipt saved to"));
        assert!(out.contains("Logged out"));
        assert!(!state.session.is_authenticated().await);
        assert_eq!(term.remaining(), 0);

        let saved = receipts.path().join("nota_TRX-000101_20240517_140500.txt");
        let text = std::fs::read_to_string(saved).unwrap();
        assert!(text.contains("Pulpen Biru    2  Rp 10.000  Rp 20.000"));
        assert!(text.contains("Paid:     Rp 50.000"));
    }

    #[tokio::test]
    async fn test_user_role_is_kept_out_of_admin_screens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Login successful", "user": "kasir1", "role": "user"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [], "meta": {"current_page": 1, "total_pages": 1}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let state = state_for(&server).await;
        let mut term = ScriptedTerminal::new(&[
            "kasir1", "rahasia",
            "users",
            "warehouses",
            "products",
            "create",
            "delete 1",
            "help",
            "quit",
        ]);

        run_session(&state, &mut term).await.unwrap();

        let out = &term.output;
        assert!(out.contains("! [DENIED] Only admins can open users"));
        assert!(out.contains("! [DENIED] Only admins can open warehouses"));
        assert_eq!(out.matches("! [DENIED] Only admins can change products").count(), 2);
        assert!(out.contains("Tabs:     pos  products  reports"));
        assert!(out.contains("Products: search <text>  next  prev  refresh"));
        // Denied tabs leave the current panel open
        assert!(out.contains("kasir:pos> warehouses"));
        assert!(!out.contains("Name: "));
    }

    #[tokio::test]
    async fn test_restored_admin_session_keeps_role() {
        let server = MockServer::start().await;
        mount_catalog(&server).await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"ID": 1, "Username": "admin", "Role": "admin"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::default());
        store
            .save(&StoredSession {
                token: AuthToken::encode(&Credentials::new("admin", "admin123")),
                role: Role::Admin,
            })
            .unwrap();
        let state = state_with(&server, ClientConfig::default(), AuthSession::new(store));
        let mut term = ScriptedTerminal::new(&["users", "quit"]);

        run_session(&state, &mut term).await.unwrap();

        let out = &term.output;
        assert!(out.contains("Welcome back, admin"));
        assert!(!out.contains("please log in"));
        assert!(out.contains("USERS"));
        assert!(!out.contains("[DENIED]"));
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart_and_leaving_pos_drops_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "kasir1"})))
            .mount(&server)
            .await;
        mount_catalog(&server).await;
        Mock::given(method("POST"))
            .and(path("/transactions"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_string("Transaction failed: insufficient stock for product Pulpen Biru"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let state = state_for(&server).await;
        let mut term = ScriptedTerminal::new(&[
            "kasir1", "rahasia",
            "add 1",
            "pay 10000",
            "search",
            "products",
            "pos",
            "quit",
        ]);

        run_session(&state, &mut term).await.unwrap();

        let out = &term.output;
        assert!(out.contains("! [FAILED] Transaction failed: insufficient stock"));
        // Redrawn after the failure, the cart still holds the line
        let after_failure = &out[out.find("! [FAILED]").unwrap()..];
        let before_switch = &after_failure[..after_failure.find("kasir:pos> products").unwrap()];
        assert!(before_switch.contains("Total: Rp 10.000"));
        // Coming back to POS starts with an empty cart
        let after_return = &out[out.rfind("kasir:products> pos").unwrap()..];
        assert!(after_return.contains("Cart is empty"));
    }

    #[tokio::test]
    async fn test_reports_panel_reads_selected_date() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": "admin"})))
            .mount(&server)
            .await;
        mount_catalog(&server).await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .and(query_param("date", "17-05-2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "date": "17-05-2024",
                "summary": {"total_sales": 20000, "total_profit": 5000, "transaction_count": 1},
                "transactions": [{
                    "ID": 42, "Total": 20000, "Profit": 5000, "Payment": 50000,
                    "Change": 30000, "CreatedAt": "2024-05-17T14:05:00+07:00"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "date": "",
                "summary": {"total_sales": 0, "total_profit": 0, "transaction_count": 0},
                "transactions": null
            })))
            .mount(&server)
            .await;

        let state = state_for(&server).await;
        let mut term = ScriptedTerminal::new(&[
            "admin", "admin123",
            "reports",
            "date 2024-05-17",
            "date yesterday",
            "quit",
        ]);

        run_session(&state, &mut term).await.unwrap();

        let out = &term.output;
        assert!(out.contains("No transactions on this day"));
        assert!(out.contains("REPORT 2024-05-17"));
        assert!(out.contains("TRX-000042"));
        assert!(out.contains("! [VALIDATION]"));
    }
}
