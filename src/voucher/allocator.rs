use chrono::{Datelike, Local};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::category::{Category, CategorySettings};
use crate::spreadsheet::{column_range, SpreadsheetService};

/// Hands out `<PREFIX>-<YEAR>-<SEQ>` voucher numbers.
///
/// The spreadsheet is the source of truth. When it cannot be read, a
/// per-category in-memory counter keeps numbers moving for the lifetime of
/// the process.
#[derive(Debug, Default)]
pub struct VoucherAllocator {
    fallback: [AtomicU32; 3],
}

impl VoucherAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn next_voucher_no(
        &self,
        sheets: &(dyn SpreadsheetService + Send + Sync),
        settings: &CategorySettings,
    ) -> String {
        self.next_voucher_no_for_year(sheets, settings, Local::now().year())
            .await
    }

    pub async fn next_voucher_no_for_year(
        &self,
        sheets: &(dyn SpreadsheetService + Send + Sync),
        settings: &CategorySettings,
        year: i32,
    ) -> String {
        let category = settings.category;
        let range = column_range(category.tab_title(), "A");

        let sequence = match sheets.read_range(&settings.spreadsheet_id, &range).await {
            Ok(rows) => next_sequence(last_voucher_id(&rows), year),
            Err(e) => {
                let sequence = self.bump_fallback(category);
                log::error!(
                    "Failed to read voucher numbers for {}: {}; using in-memory sequence {}",
                    category,
                    e,
                    sequence
                );
                sequence
            }
        };

        format_voucher_no(&category.prefix(), year, sequence)
    }

    /// Increment and return the fallback counter for `category`.
    pub fn bump_fallback(&self, category: Category) -> u32 {
        self.fallback[category.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn fallback_value(&self, category: Category) -> u32 {
        self.fallback[category.index()].load(Ordering::SeqCst)
    }
}

/// First cell of the last data row, if the column holds more than a header.
pub fn last_voucher_id(rows: &[Vec<String>]) -> Option<&str> {
    if rows.len() <= 1 {
        return None;
    }
    rows.last()
        .and_then(|row| row.first())
        .map(String::as_str)
}

/// Sequence that follows `last`. Unparseable ids count as 0; an id from a
/// different year restarts the sequence.
pub fn next_sequence(last: Option<&str>, year: i32) -> u32 {
    let Some(last) = last else {
        return 1;
    };

    let mut parts = last.trim().split('-');
    let _prefix = parts.next();
    let last_year = parts.next().and_then(|y| y.trim().parse::<i32>().ok());
    let last_seq = parts
        .next()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(0);

    match last_year {
        Some(y) if y != year => 1,
        _ => last_seq.saturating_add(1),
    }
}

pub fn format_voucher_no(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{}-{}-{:03}", prefix, year, sequence)
}
