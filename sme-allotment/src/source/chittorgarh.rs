//! Chittorgarh adapter for live SME IPO subscription figures.
//!
//! Scrapes the "latest SME IPO subscription (live)" report, a plain HTML table
//! with one row per open issue and one column per investor category.
//!
//! The column order on that page is not stable, so columns are located by
//! header text first and by position only when no header matches.

use std::collections::HashSet;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use sme_common::config::SourceConfig;
use tracing::debug;

use super::{SourceError, SubscriptionRecord, SubscriptionSource};

// ============================================================================
// Column Layout
// ============================================================================

/// Positions of the columns the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// IPO / company name column
    pub name: usize,
    /// HNI subscription multiple column
    pub hni: usize,
}

impl Default for ColumnLayout {
    /// Positional layout of the report when headers are missing:
    /// name first, HNI third (after QIB).
    fn default() -> Self {
        Self { name: 0, hni: 2 }
    }
}

impl ColumnLayout {
    /// Locate columns by header text.
    ///
    /// Returns `None` when neither column can be identified. A column that
    /// cannot be identified keeps its positional default.
    pub fn from_headers(headers: &[String]) -> Option<Self> {
        let lowered: Vec<String> = headers.iter().map(|h| h.to_ascii_lowercase()).collect();

        let name = best_match(&lowered, name_rank);
        let hni = best_match(&lowered, hni_rank);

        if name.is_none() && hni.is_none() {
            return None;
        }

        let fallback = Self::default();
        let layout = Self {
            name: name.unwrap_or(fallback.name),
            hni: hni.unwrap_or(fallback.hni),
        };

        if layout.name == layout.hni {
            return None;
        }

        Some(layout)
    }

    /// Minimum cell count a row needs for this layout.
    fn required_cells(&self) -> usize {
        self.name.max(self.hni) + 1
    }
}

/// Index of the header with the lowest rank, first one wins on ties.
fn best_match(headers: &[String], rank: fn(&str) -> Option<u8>) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| rank(h).map(|r| (r, idx)))
        .min()
        .map(|(_, idx)| idx)
}

fn name_rank(header: &str) -> Option<u8> {
    if header.contains("company") || header.contains("name") || header.contains("issuer") {
        Some(0)
    } else if header.contains("ipo") {
        Some(1)
    } else {
        None
    }
}

fn hni_rank(header: &str) -> Option<u8> {
    if header.contains("hni") {
        return Some(0);
    }

    let is_nii = header.contains("nii")
        || header.contains("non-institutional")
        || header.contains("non institutional");
    if !is_nii {
        return None;
    }

    // bNII / sNII split the category by ticket size; the aggregate column wins.
    let sub_category = ["bnii", "snii", "b-nii", "s-nii", "(b)", "(s)", "big", "small"]
        .iter()
        .any(|marker| header.contains(marker));

    Some(if sub_category { 2 } else { 1 })
}

// ============================================================================
// Table Parsing
// ============================================================================

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("selector '{}': {:?}", css, e)))
}

/// Collapsed, trimmed text content of a cell.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a subscription multiple such as `"245.67"`, `"1,024.5x"` or `"12 x"`.
///
/// Only plain non-negative decimals are accepted: digits with at most one dot.
/// Placeholders (`"-"`, `"N/A"`, empty) yield `None`.
pub(crate) fn parse_multiple(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_suffix('x')
        .or_else(|| trimmed.strip_suffix('X'))
        .unwrap_or(trimmed)
        .trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();

    let digits = cleaned.chars().filter(char::is_ascii_digit).count();
    let dots = cleaned.chars().filter(|c| *c == '.').count();
    if digits == 0 || dots > 1 || digits + dots != cleaned.chars().count() {
        return None;
    }

    cleaned.parse().ok()
}

/// Extract subscription records from the first table of a report page.
///
/// Rows with fewer than `min_columns` cells, rows whose multiple is not a
/// plain decimal, and rows with a zero multiple are skipped. Duplicate IPO
/// names keep their first occurrence.
pub fn parse_subscription_table(
    html: &str,
    min_columns: usize,
) -> Result<Vec<SubscriptionRecord>, SourceError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let header_sel = selector("th")?;
    let cell_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(SourceError::MissingTable)?;

    let headers: Vec<String> = table
        .select(&row_sel)
        .map(|row| row.select(&header_sel).map(cell_text).collect::<Vec<_>>())
        .find(|cells| !cells.is_empty())
        .unwrap_or_default();

    let layout = ColumnLayout::from_headers(&headers).unwrap_or_else(|| {
        debug!(headers = ?headers, "No recognizable headers, using positional columns");
        ColumnLayout::default()
    });
    let required = layout.required_cells().max(min_columns);

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in table.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if cells.len() < required {
            debug!(cells = cells.len(), required, "Skipping short row");
            continue;
        }

        let name = &cells[layout.name];
        let Some(multiple) = parse_multiple(&cells[layout.hni]) else {
            debug!(ipo = %name, value = %cells[layout.hni], "Skipping row without numeric HNI multiple");
            continue;
        };

        let Some(record) = SubscriptionRecord::new(name.clone(), multiple) else {
            debug!(ipo = %name, multiple, "Skipping row with no HNI demand yet");
            continue;
        };

        if seen.insert(record.ipo_name.to_ascii_lowercase()) {
            records.push(record);
        }
    }

    Ok(records)
}

// ============================================================================
// Chittorgarh Source
// ============================================================================

/// Live subscription source backed by the Chittorgarh report page.
pub struct ChittorgarhSource {
    /// Blocking HTTP client with the request timeout baked in
    client: reqwest::blocking::Client,
    /// Report page URL
    url: String,
    /// Minimum cells per data row
    min_columns: usize,
}

impl ChittorgarhSource {
    /// Create from source configuration.
    pub fn from_config(config: &SourceConfig) -> sme_common::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.effective_timeout_secs()))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| sme_common::Error::External(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            min_columns: config.min_columns,
        })
    }

    /// Report page this source reads.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SubscriptionSource for ChittorgarhSource {
    fn name(&self) -> &'static str {
        "chittorgarh"
    }

    fn try_fetch(&self) -> Result<Vec<SubscriptionRecord>, SourceError> {
        debug!(url = %self.url, "Fetching live subscription report");

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let html = response
            .text()
            .map_err(|e| SourceError::Network(format!("Failed to read body: {}", e)))?;

        parse_subscription_table(&html, self.min_columns)
    }
}
