//! # Table Rendering
//!
//! Plain-text tables for the panels.
//!
//! ```text
//!  ID  Name          Stock       Price
//!  ──  ────────────  ─────  ──────────
//!   1  Pulpen Biru      50   Rp 10.000
//!   2  Buku Tulis       48    Rp 5.000
//! ```
//!
//! Widths are counted in chars so "Rp" amounts and names with accents line up.

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Every column starts left-aligned.
    pub fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            align: vec![Align::Left; headers.len()],
            rows: Vec::new(),
        }
    }

    /// Right-aligns the given columns (numbers and money).
    pub fn right(mut self, columns: &[usize]) -> Self {
        for &col in columns {
            if let Some(a) = self.align.get_mut(col) {
                *a = Align::Right;
            }
        }
        self
    }

    /// Adds a row. Missing cells render empty; extra cells are dropped.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.headers.len())
            .map(|c| c.to_string())
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, &width), align)| {
                let fill = " ".repeat(width.saturating_sub(cell.chars().count()));
                match align {
                    Align::Left => format!("{}{}", cell, fill),
                    Align::Right => format!("{}{}", fill, cell),
                }
            })
            .collect();
        format!(" {}", padded.join("  ")).trim_end().to_string()
    }

    /// Renders the header, a rule and every row.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule: Vec<String> = widths.iter().map(|&w| "─".repeat(w)).collect();

        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(self.line(&self.headers, &widths));
        out.push(self.line(&rule, &widths));
        for row in &self.rows {
            out.push(self.line(row, &widths));
        }
        out.join("\n")
    }
}

/// `Page 2 of 5`, or `Page 1 of 1` for an empty result.
pub fn page_footer(current: u32, total: u32) -> String {
    format!("Page {} of {}", current.max(1), total.max(1))
}
