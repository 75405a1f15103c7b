//! # Users Panel

use async_trait::async_trait;
use kasir_client::ResourceFamily;
use kasir_core::validation::parse_record_id;
use kasir_core::{NewUser, RecordId, Role, User};

use super::form::{ask, ask_default, ask_secret, confirm};
use super::products::confirmation_text;
use super::{id_argument, split_command, unknown_command, Panel, Tab};
use crate::error::ConsoleResult;
use crate::render::Table;
use crate::state::AppState;
use crate::terminal::Terminal;

const HELP: &str = "Users:    create  delete <id>  refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Create,
    Delete(RecordId),
    Refresh,
}

impl UserCommand {
    pub fn parse(line: &str) -> ConsoleResult<UserCommand> {
        let (verb, rest) = split_command(line);
        match verb.as_str() {
            "create" | "new" => Ok(UserCommand::Create),
            "delete" | "del" => Ok(UserCommand::Delete(id_argument("delete", rest)?)),
            "refresh" => Ok(UserCommand::Refresh),
            other => Err(unknown_command(other)),
        }
    }
}

#[derive(Default)]
pub struct UsersPanel;

impl UsersPanel {
    pub fn new() -> Self {
        UsersPanel
    }
}

pub fn user_table(users: &[User]) -> Table {
    let mut table = Table::new(&["ID", "Username", "Role", "Warehouse"]).right(&[0, 3]);
    for u in users {
        table.row([
            u.id.to_string(),
            u.username.clone(),
            u.role.to_string(),
            u.warehouse_id.map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
        ]);
    }
    table
}

async fn create_form(term: &mut dyn Terminal) -> ConsoleResult<NewUser> {
    let username = ask(term, "Username").await?;
    let password = ask_secret(term, "Password").await?;
    let role: Role = ask_default(term, "Role (admin/user)", "user").await?.parse()?;
    let warehouse = ask(term, "Warehouse ID (blank for none)").await?;
    let warehouse_id = if warehouse.is_empty() {
        None
    } else {
        Some(parse_record_id(&warehouse)?)
    };

    Ok(NewUser {
        username,
        password,
        role,
        warehouse_id,
    })
}

#[async_trait]
impl Panel for UsersPanel {
    fn tab(&self) -> Tab {
        Tab::Users
    }

    fn help(&self) -> &'static str {
        HELP
    }

    async fn render(&mut self, state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()> {
        let users = state.store.users().await?;
        term.print("USERS").await?;
        if users.is_empty() {
            term.print("  No users").await
        } else {
            term.print(&user_table(&users).render()).await
        }
    }

    async fn handle(
        &mut self,
        line: &str,
        state: &AppState,
        term: &mut dyn Terminal,
    ) -> ConsoleResult<()> {
        match UserCommand::parse(line)? {
            UserCommand::Create => {
                let draft = create_form(term).await?;
                let created = state.store.create_user(&draft).await?;
                term.print(&format!("Created user {} ({})", created.id, created.username))
                    .await?;
            }
            UserCommand::Delete(id) => {
                if !confirm(term, &format!("Delete user {}?", id)).await? {
                    return Ok(());
                }
                let reply = state.store.delete_user(id).await?;
                term.print(&confirmation_text(&reply.message, "User deleted")).await?;
            }
            UserCommand::Refresh => state.store.invalidate(ResourceFamily::Users).await,
        }
        Ok(())
    }
}
