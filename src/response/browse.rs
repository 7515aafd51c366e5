//! Browse (paged) response handling

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Paged result from the execution endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    #[serde(default)]
    pub content: Vec<Map<String, Value>>,
    /// Zero-based page index
    pub page: u64,
    pub total_pages: u64,
    pub total_elements: u64,
}

/// Page banner shown under every browse result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// One-based page number
    pub page_number: u64,
    pub total_pages: u64,
    pub total_elements: u64,
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page {} of {} (Total: {})",
            self.page_number, self.total_pages, self.total_elements
        )
    }
}

/// Rows restricted to and ordered by the projected fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub page_info: PageInfo,
}

impl BrowseResponse {
    pub fn page_info(&self) -> PageInfo {
        PageInfo {
            page_number: self.page.saturating_add(1),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
        }
    }

    /// Project each row onto `fields`; `None` when there are no rows
    pub fn render(&self, fields: &[String]) -> Option<RenderedTable> {
        if self.content.is_empty() {
            return None;
        }

        let rows = self
            .content
            .iter()
            .map(|row| fields.iter().map(|f| cell_text(row.get(f))).collect())
            .collect();

        Some(RenderedTable {
            headers: fields.to_vec(),
            rows,
            page_info: self.page_info(),
        })
    }
}

/// Cell text: absent and null render empty, strings render bare
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl fmt::Display for RenderedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", line(&self.headers))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &self.rows {
            writeln!(f, "{}", line(row))?;
        }
        write!(f, "{}", self.page_info)
    }
}
