//! # Warehouses Panel

use async_trait::async_trait;
use kasir_client::ResourceFamily;
use kasir_core::{NewWarehouse, RecordId, Warehouse, WarehouseUpdate};

use super::form::{ask, ask_default, confirm};
use super::products::confirmation_text;
use super::{id_argument, split_command, unknown_command, Panel, Tab};
use crate::error::{ConsoleError, ConsoleResult};
use crate::render::Table;
use crate::state::AppState;
use crate::terminal::Terminal;

const HELP: &str = "Warehouses: create  edit <id>  delete <id>  refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseCommand {
    Create,
    Edit(RecordId),
    Delete(RecordId),
    Refresh,
}

impl WarehouseCommand {
    pub fn parse(line: &str) -> ConsoleResult<WarehouseCommand> {
        let (verb, rest) = split_command(line);
        match verb.as_str() {
            "create" | "new" => Ok(WarehouseCommand::Create),
            "edit" => Ok(WarehouseCommand::Edit(id_argument("edit", rest)?)),
            "delete" | "del" => Ok(WarehouseCommand::Delete(id_argument("delete", rest)?)),
            "refresh" => Ok(WarehouseCommand::Refresh),
            other => Err(unknown_command(other)),
        }
    }
}

#[derive(Default)]
pub struct WarehousesPanel {
    shown: Vec<Warehouse>,
}

impl WarehousesPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn warehouse_table(warehouses: &[Warehouse]) -> Table {
    let mut table = Table::new(&["ID", "Name", "Address"]).right(&[0]);
    for w in warehouses {
        table.row([w.id.to_string(), w.name.clone(), w.address.clone()]);
    }
    table
}

#[async_trait]
impl Panel for WarehousesPanel {
    fn tab(&self) -> Tab {
        Tab::Warehouses
    }

    fn help(&self) -> &'static str {
        HELP
    }

    async fn render(&mut self, state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()> {
        self.shown = state.store.warehouses().await?;
        term.print("WAREHOUSES").await?;
        if self.shown.is_empty() {
            term.print("  No warehouses").await
        } else {
            term.print(&warehouse_table(&self.shown).render()).await
        }
    }

    async fn handle(
        &mut self,
        line: &str,
        state: &AppState,
        term: &mut dyn Terminal,
    ) -> ConsoleResult<()> {
        match WarehouseCommand::parse(line)? {
            WarehouseCommand::Create => {
                let draft = NewWarehouse {
                    name: ask(term, "Name").await?,
                    address: ask(term, "Address").await?,
                };
                let created = state.store.create_warehouse(&draft).await?;
                term.print(&format!("Created warehouse {} ({})", created.id, created.name))
                    .await?;
            }
            WarehouseCommand::Edit(id) => {
                let current = self
                    .shown
                    .iter()
                    .find(|w| w.id == id)
                    .cloned()
                    .ok_or_else(|| ConsoleError::usage(format!("Warehouse {} is not listed", id)))?;
                let update = WarehouseUpdate {
                    id,
                    name: ask_default(term, "Name", &current.name).await?,
                    address: ask_default(term, "Address", &current.address).await?,
                };
                let reply = state.store.update_warehouse(&update).await?;
                term.print(&confirmation_text(&reply.message, "Warehouse updated")).await?;
            }
            WarehouseCommand::Delete(id) => {
                if !confirm(term, &format!("Delete warehouse {}?", id)).await? {
                    return Ok(());
                }
                let reply = state.store.delete_warehouse(id).await?;
                term.print(&confirmation_text(&reply.message, "Warehouse deleted")).await?;
            }
            WarehouseCommand::Refresh => state.store.invalidate(ResourceFamily::Warehouses).await,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(WarehouseCommand::parse("create").unwrap(), WarehouseCommand::Create);
        assert_eq!(WarehouseCommand::parse("edit 2").unwrap(), WarehouseCommand::Edit(2));
        assert_eq!(WarehouseCommand::parse("delete 2").unwrap(), WarehouseCommand::Delete(2));
        assert_eq!(WarehouseCommand::parse("refresh").unwrap(), WarehouseCommand::Refresh);
        assert!(WarehouseCommand::parse("delete -1").is_err());
    }

    #[test]
    fn test_warehouse_table() {
        let rendered = warehouse_table(&[Warehouse {
            id: 1,
            name: "Gudang Pusat".into(),
            address: "Jl. Merdeka 1".into(),
        }])
        .render();
        assert!(rendered.lines().nth(2).unwrap().ends_with("Jl. Merdeka 1"));
    }
}
