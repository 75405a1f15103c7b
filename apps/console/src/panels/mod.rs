//! # Panels
//!
//! The login form and the tabbed dashboard.
//!
//! ## Dashboard Shell
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Dashboard Loop                                       │
//! │                                                                         │
//! │  kasir:pos> _                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ShellCommand::parse                                                   │
//! │       │                                                                 │
//! │       ├── pos / products / users / warehouses / reports                │
//! │       │       └──► drop current panel, open the new one                │
//! │       ├── help    ──► shell help + panel help                          │
//! │       ├── logout  ──► Exit::Logout (token cleared, cache cleared)      │
//! │       ├── quit    ──► Exit::Quit                                       │
//! │       └── other   ──► panel.handle(line)                               │
//! │                           ├── Ok  ──► panel.render()                   │
//! │                           └── Err ──► "! [CODE] message"               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Panels own their view state (page, search, cart). Switching tabs drops
//! the panel, so leaving POS discards the cart.
//!
//! Non-admin users get POS, a read-only product list and reports; the
//! users and warehouses tabs refuse to open for them.

pub mod form;
pub mod login;
pub mod pos;
pub mod products;
pub mod reports;
pub mod users;
pub mod warehouses;

use async_trait::async_trait;
use kasir_core::validation::parse_record_id;
use kasir_core::{RecordId, Role};
use std::fmt;
use tracing::debug;

use crate::error::{ConsoleError, ConsoleResult};
use crate::state::AppState;
use crate::terminal::Terminal;

// =============================================================================
// Navigation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Pos,
    Products,
    Users,
    Warehouses,
    Reports,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Pos,
        Tab::Products,
        Tab::Users,
        Tab::Warehouses,
        Tab::Reports,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Pos => "pos",
            Tab::Products => "products",
            Tab::Users => "users",
            Tab::Warehouses => "warehouses",
            Tab::Reports => "reports",
        }
    }

    pub fn from_name(name: &str) -> Option<Tab> {
        Tab::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Tab::Users | Tab::Warehouses)
    }

    pub fn allowed_for(&self, role: Role) -> bool {
        role == Role::Admin || !self.requires_admin()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One line typed at the dashboard prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Switch(Tab),
    Help,
    Logout,
    Quit,
    /// Anything else goes to the active panel.
    Panel(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> ShellCommand {
        let line = line.trim();
        if line.is_empty() {
            return ShellCommand::Empty;
        }
        match line.to_lowercase().as_str() {
            "help" | "?" => ShellCommand::Help,
            "logout" => ShellCommand::Logout,
            "quit" | "exit" => ShellCommand::Quit,
            other => match Tab::from_name(other) {
                Some(tab) => ShellCommand::Switch(tab),
                None => ShellCommand::Panel(line.to_string()),
            },
        }
    }
}

const SESSION_HELP: &str = "Session:  help  logout  quit";

/// Tab list and session commands available to `role`.
fn shell_help(role: Role) -> String {
    let tabs: Vec<&str> = Tab::ALL
        .iter()
        .filter(|t| t.allowed_for(role))
        .map(Tab::name)
        .collect();
    format!("Tabs:     {}\n{}", tabs.join("  "), SESSION_HELP)
}

/// Splits `verb rest...` and lowercases the verb.
pub(crate) fn split_command(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb.to_lowercase(), rest.trim()),
        None => (line.to_lowercase(), ""),
    }
}

/// Parses the id argument of `delete 12` and friends.
pub(crate) fn id_argument(verb: &str, rest: &str) -> ConsoleResult<RecordId> {
    if rest.is_empty() {
        return Err(ConsoleError::usage(format!("Usage: {} <id>", verb)));
    }
    Ok(parse_record_id(rest)?)
}

pub(crate) fn unknown_command(verb: &str) -> ConsoleError {
    ConsoleError::usage(format!("Unknown command '{}', type help", verb))
}

// =============================================================================
// Panel Trait
// =============================================================================

#[async_trait]
pub trait Panel: Send {
    fn tab(&self) -> Tab;

    /// Commands understood by this panel, one per line.
    fn help(&self) -> &'static str;

    /// Reads through the store and prints the panel.
    async fn render(&mut self, state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()>;

    /// Runs one panel command.
    async fn handle(
        &mut self,
        line: &str,
        state: &AppState,
        term: &mut dyn Terminal,
    ) -> ConsoleResult<()>;
}

/// Opens `tab` for `role`, or refuses when the role may not see it.
pub fn open(tab: Tab, state: &AppState, role: Role) -> ConsoleResult<Box<dyn Panel>> {
    if !tab.allowed_for(role) {
        return Err(ConsoleError::admin_only(&format!("open {}", tab)));
    }
    debug!(tab = %tab, role = %role, "Opening panel");
    Ok(match tab {
        Tab::Pos => Box::new(pos::PosPanel::new(state.pos_page_size(), state.receipts_dir())),
        Tab::Products => Box::new(products::ProductsPanel::new(state.admin_page_size(), role)),
        Tab::Users => Box::new(users::UsersPanel::new()),
        Tab::Warehouses => Box::new(warehouses::WarehousesPanel::new()),
        Tab::Reports => Box::new(reports::ReportsPanel::today()),
    })
}

// =============================================================================
// Dashboard
// =============================================================================

/// Why the dashboard closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Logout,
    Quit,
}

/// Prints non-fatal errors as alerts and passes fatal ones up.
pub(crate) async fn alert_on_error(
    term: &mut dyn Terminal,
    result: ConsoleResult<()>,
) -> ConsoleResult<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            debug!(error = %e, "Command failed");
            term.print(&e.alert().to_string()).await
        }
    }
}

/// Runs the tabbed dashboard until logout, quit or end of input.
pub async fn dashboard(state: &AppState, role: Role, term: &mut dyn Terminal) -> ConsoleResult<Exit> {
    let mut panel = open(Tab::Pos, state, role)?;
    let rendered = panel.render(state, term).await;
    alert_on_error(term, rendered).await?;

    loop {
        let prompt = format!("kasir:{}> ", panel.tab());
        let Some(line) = term.read_line(&prompt).await? else {
            return Ok(Exit::Quit);
        };

        match ShellCommand::parse(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Switch(tab) => match open(tab, state, role) {
                Ok(opened) => {
                    panel = opened;
                    let rendered = panel.render(state, term).await;
                    alert_on_error(term, rendered).await?;
                }
                Err(e) => alert_on_error(term, Err(e)).await?,
            },
            ShellCommand::Help => {
                term.print(&shell_help(role)).await?;
                term.print(panel.help()).await?;
            }
            ShellCommand::Logout => return Ok(Exit::Logout),
            ShellCommand::Quit => return Ok(Exit::Quit),
            ShellCommand::Panel(line) => {
                let mut result = panel.handle(&line, state, term).await;
                if result.is_ok() {
                    result = panel.render(state, term).await;
                }
                alert_on_error(term, result).await?;
            }
        }
    }
}
