//! Terminal tables.
//!
//! `cmgen info` prints the modules and dependencies of a project through
//! [`Table`], which shrinks its widest columns until it fits the terminal.

use colored::*;
use console::{Term, measure_text_width, truncate_str};

/// Columns never shrink below this many characters.
const MIN_COLUMN_WIDTH: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row.iter().map(|cell| flatten(cell)).collect());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_, width) = Term::stdout().size();
        for line in self.render(width as usize) {
            println!("{line}");
        }
    }

    /// Lines of the table fitted to `max_width` columns where possible.
    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }

        let widths = self.column_widths(max_width);
        let border = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {left}{}{right}", cells.join(mid))
        };
        let row = |cells: &[String], bold: bool| {
            let mut line = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = truncate_str(cell, width, "...");
                let padding = width.saturating_sub(measure_text_width(&text));
                let text = if bold {
                    text.bold().to_string()
                } else {
                    text.to_string()
                };
                line.push_str(&format!(" {text}{} │", " ".repeat(padding)));
            }
            line
        };

        let mut lines = vec![border("┌", "┬", "┐"), row(&self.headers, true)];
        lines.push(border("├", "┼", "┤"));
        for cells in &self.rows {
            lines.push(row(cells, false));
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(measure_text_width(cell));
            }
        }

        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        let mut total: usize = widths.iter().sum();
        while total > available {
            let Some((index, &widest)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if widest <= MIN_COLUMN_WIDTH {
                break;
            }
            widths[index] -= 1;
            total -= 1;
        }
        widths
    }
}

fn flatten(cell: &str) -> String {
    cell.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: Vec<String>) -> Vec<String> {
        lines
            .iter()
            .map(|l| console::strip_ansi_codes(l).to_string())
            .collect()
    }

    #[test]
    fn test_render_fits_content() {
        let mut table = Table::new(&["Module", "Kind"]);
        table.add_row(vec!["Core".to_string(), "StaticLibrary".to_string()]);

        let lines = plain(table.render(120));
        assert_eq!(lines[0], "  ┌────────┬───────────────┐");
        assert_eq!(lines[1], "  │ Module │ Kind          │");
        assert_eq!(lines[3], "  │ Core   │ StaticLibrary │");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_row_with_wrong_arity_is_ignored() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(vec!["only one".to_string()]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_narrow_terminal_truncates_widest_column() {
        let mut table = Table::new(&["Name", "Path"]);
        table.add_row(vec![
            "Core".to_string(),
            "/a/very/long/path/that/cannot/fit/anywhere".to_string(),
        ]);

        let lines = plain(table.render(30));
        assert!(lines[3].contains("..."));
        assert!(measure_text_width(&lines[3]) <= 30);
    }
}
