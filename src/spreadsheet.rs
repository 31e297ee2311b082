//! Spreadsheet collaborator seam.

use async_trait::async_trait;

use crate::error::ServiceError;

/// Operations the voucher flow needs from a spreadsheet backend.
///
/// Ranges use A1 notation with the tab title, e.g. `Surfboard!A:A`.
#[async_trait]
pub trait SpreadsheetService {
    /// Rows of the range; trailing empty cells and rows may be omitted.
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, ServiceError>;

    /// Titles of all tabs in the spreadsheet.
    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<String>, ServiceError>;

    async fn add_tab(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        columns: u32,
    ) -> Result<(), ServiceError>;

    /// Overwrite the cells of `range` with `rows`.
    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError>;

    /// Append `rows` after the last row of the table found in `range`.
    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError>;
}

pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit", spreadsheet_id)
}

/// Whole-column range, e.g. `column_range("Surfboard", "D")` → `Surfboard!D:D`.
pub fn column_range(tab: &str, column: &str) -> String {
    format!("{}!{}:{}", tab, column, column)
}
