use std::collections::HashSet;

use crate::category::CategorySettings;
use crate::error::ServiceError;
use crate::spreadsheet::{column_range, SpreadsheetService};
use crate::voucher::profile::VoucherField;

/// Distinct payees already recorded for the category.
pub async fn pay_to_suggestions(
    sheets: &(dyn SpreadsheetService + Send + Sync),
    settings: &CategorySettings,
) -> Result<Vec<String>, ServiceError> {
    let column = settings
        .profile
        .column_of(VoucherField::PayTo)
        .unwrap_or_else(|| "D".to_string());
    let range = column_range(settings.category.tab_title(), &column);

    let rows = sheets.read_range(&settings.spreadsheet_id, &range).await?;
    Ok(collect_suggestions(rows))
}

/// Skip the header row, drop blanks, keep the first occurrence of each value.
pub fn collect_suggestions(rows: Vec<Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .skip(1)
        .filter_map(|row| row.into_iter().next())
        .filter(|value| !value.trim().is_empty())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
