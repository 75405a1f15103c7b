//! # Reports Panel
//!
//! Daily sales summary and the transactions behind it.
//!
//! ```text
//!  REPORT 2024-05-17
//!  Sales:        Rp 20.000
//!  Profit:        Rp 5.000
//!  Transactions:         1
//!
//!  Receipt     Time       Total    Profit     Change
//!  TRX-000101  14:05  Rp 20.000  Rp 5.000  Rp 30.000
//! ```

use async_trait::async_trait;
use chrono::Local;
use kasir_client::ResourceFamily;
use kasir_core::{Report, ReportDate};
use tracing::warn;

use super::{split_command, unknown_command, Panel, Tab};
use crate::error::{ConsoleError, ConsoleResult};
use crate::render::Table;
use crate::state::AppState;
use crate::terminal::Terminal;

const HELP: &str = "Reports:  date <YYYY-MM-DD>  today  refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    Date(ReportDate),
    Today,
    Refresh,
}

impl ReportCommand {
    pub fn parse(line: &str) -> ConsoleResult<ReportCommand> {
        let (verb, rest) = split_command(line);
        match verb.as_str() {
            "date" => {
                if rest.is_empty() {
                    return Err(ConsoleError::usage("Usage: date <YYYY-MM-DD>"));
                }
                Ok(ReportCommand::Date(ReportDate::from_picker(rest)?))
            }
            "today" => Ok(ReportCommand::Today),
            "refresh" => Ok(ReportCommand::Refresh),
            other => Err(unknown_command(other)),
        }
    }
}

pub struct ReportsPanel {
    date: ReportDate,
}

impl ReportsPanel {
    pub fn new(date: ReportDate) -> Self {
        ReportsPanel { date }
    }

    pub fn today() -> Self {
        Self::new(local_today())
    }
}

fn local_today() -> ReportDate {
    ReportDate::new(Local::now().date_naive())
}

/// The day the backend echoed back, or `requested` when the echo is blank
/// or unreadable.
fn reported_date(requested: ReportDate, report: &Report) -> ReportDate {
    match ReportDate::from_query(&report.date) {
        Ok(echoed) => {
            if echoed != requested {
                warn!(requested = %requested, echoed = %echoed, "Report is for a different day");
            }
            echoed
        }
        Err(_) => requested,
    }
}

/// Summary block and transaction table for one report.
pub fn render_report(requested: ReportDate, report: &Report) -> String {
    let summary = &report.summary;
    let mut out = vec![
        format!("REPORT {}", reported_date(requested, report)),
        format!("Sales:         {}", summary.total_sales),
        format!("Profit:        {}", summary.total_profit),
        format!("Transactions:  {}", summary.transaction_count),
        String::new(),
    ];

    if report.transactions.is_empty() {
        out.push("  No transactions on this day".to_string());
    } else {
        let mut table =
            Table::new(&["Receipt", "Time", "Total", "Profit", "Change"]).right(&[2, 3, 4]);
        for trx in &report.transactions {
            table.row([
                trx.receipt_number(),
                trx.created_at.format("%H:%M").to_string(),
                trx.total.to_string(),
                trx.profit.to_string(),
                trx.change.to_string(),
            ]);
        }
        out.push(table.render());
    }
    out.join("\n")
}

#[async_trait]
impl Panel for ReportsPanel {
    fn tab(&self) -> Tab {
        Tab::Reports
    }

    fn help(&self) -> &'static str {
        HELP
    }

    async fn render(&mut self, state: &AppState, term: &mut dyn Terminal) -> ConsoleResult<()> {
        let report = state.store.report(self.date).await?;
        term.print(&render_report(self.date, &report)).await
    }

    async fn handle(
        &mut self,
        line: &str,
        state: &AppState,
        _term: &mut dyn Terminal,
    ) -> ConsoleResult<()> {
        match ReportCommand::parse(line)? {
            ReportCommand::Date(date) => self.date = date,
            ReportCommand::Today => self.date = local_today(),
            ReportCommand::Refresh => state.store.invalidate(ResourceFamily::Reports).await,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};
    use kasir_core::{Money, ReportSummary, Transaction};

    fn may_17() -> ReportDate {
        ReportDate::new(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ReportCommand::parse("date 2024-05-17").unwrap(),
            ReportCommand::Date(may_17())
        );
        assert_eq!(ReportCommand::parse("today").unwrap(), ReportCommand::Today);
        assert!(ReportCommand::parse("date 17-05-2024").is_err());
        assert!(ReportCommand::parse("date").is_err());
    }

    #[test]
    fn test_render_report() {
        let report = Report {
            date: "17-05-2024".into(),
            summary: ReportSummary {
                total_sales: Money::from_rupiah(20_000),
                total_profit: Money::from_rupiah(5_000),
                transaction_count: 1,
            },
            transactions: vec![Transaction {
                id: 101,
                total: Money::from_rupiah(20_000),
                profit: Money::from_rupiah(5_000),
                payment: Money::from_rupiah(50_000),
                change: Money::from_rupiah(30_000),
                created_at: DateTime::parse_from_rfc3339("2024-05-17T14:05:00+07:00").unwrap(),
                user_id: Some(1),
                warehouse_id: Some(1),
                items: Vec::new(),
            }],
        };

        let text = render_report(may_17(), &report);
        assert!(text.starts_with("REPORT 2024-05-17"));
        assert!(text.contains("Sales:         Rp 20.000"));
        let last = text.lines().last().unwrap();
        assert!(last.contains("TRX-000101"));
        assert!(last.contains("14:05"));
        assert!(last.ends_with("Rp 30.000"));
    }

    #[test]
    fn test_empty_report() {
        let report = Report {
            date: "17-05-2024".into(),
            summary: ReportSummary {
                total_sales: Money::zero(),
                total_profit: Money::zero(),
                transaction_count: 0,
            },
            transactions: Vec::new(),
        };
        let text = render_report(may_17(), &report);
        assert!(text.contains("No transactions on this day"));
        assert!(text.starts_with("REPORT 2024-05-17"));
    }

    #[test]
    fn test_heading_follows_backend_date() {
        let mut report = Report {
            date: "18-05-2024".into(),
            summary: ReportSummary {
                total_sales: Money::zero(),
                total_profit: Money::zero(),
                transaction_count: 0,
            },
            transactions: Vec::new(),
        };
        assert!(render_report(may_17(), &report).starts_with("REPORT 2024-05-18"));

        report.date = String::new();
        assert!(render_report(may_17(), &report).starts_with("REPORT 2024-05-17"));
    }
}
