use actix_web::http::StatusCode;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::category::{Category, CategorySettings, TAB_COLUMNS, TAB_ROWS};
use crate::error::ServiceError;
use crate::notify::Notification;
use crate::receipt::ReceiptError;
use crate::spreadsheet::SpreadsheetService;
use crate::state::AppState;
use crate::voucher::models::{Voucher, VoucherForm};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("unknown category '{0}'")]
    InvalidCategory(String),
    #[error("failed to prepare tab: {0}")]
    EnsureTab(#[source] ServiceError),
    #[error("failed to render receipt: {0}")]
    Render(#[source] ReceiptError),
    #[error("failed to upload receipt: {0}")]
    Upload(#[source] ServiceError),
    #[error("failed to append voucher row: {0}")]
    Append(#[source] ServiceError),
}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client; the detailed cause is only logged.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCategory(_) => "Invalid filter option",
            Self::EnsureTab(_) => "Failed to submit data",
            Self::Render(_) => "Failed to create PDF",
            Self::Upload(_) => "Failed to upload PDF",
            Self::Append(_) => "Failed to record voucher",
        }
    }
}

/// Serializes the tab check-then-create per category.
#[derive(Debug, Default)]
pub struct TabLocks {
    locks: [Mutex<()>; 3],
}

impl TabLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_category(&self, category: Category) -> &Mutex<()> {
        &self.locks[category.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionOutcome {
    pub voucher_no: String,
    pub sheet_url: String,
    pub pdf_file_id: String,
    pub pdf_link: String,
}

/// Create the category tab with its header row unless it already exists.
/// Returns whether the tab was created.
pub async fn ensure_tab(
    sheets: &(dyn SpreadsheetService + Send + Sync),
    locks: &TabLocks,
    settings: &CategorySettings,
) -> Result<bool, ServiceError> {
    let _guard = locks.for_category(settings.category).lock().await;
    let title = settings.category.tab_title();

    let tabs = sheets.list_tabs(&settings.spreadsheet_id).await?;
    if tabs.iter().any(|t| t == title) {
        return Ok(false);
    }

    sheets
        .add_tab(&settings.spreadsheet_id, title, TAB_ROWS, TAB_COLUMNS)
        .await?;
    sheets
        .write_range(
            &settings.spreadsheet_id,
            &settings.header_range(),
            vec![settings.profile.header_row()],
        )
        .await?;

    log::info!("Created tab '{}' in spreadsheet {}", title, settings.spreadsheet_id);
    Ok(true)
}

pub async fn submit_voucher(
    state: &AppState,
    form: VoucherForm,
) -> Result<SubmissionOutcome, SubmissionError> {
    let settings = state
        .categories
        .resolve(&form.filter)
        .cloned()
        .ok_or_else(|| SubmissionError::InvalidCategory(form.filter.clone()))?;

    let voucher_no = match form.voucher_no.trim() {
        "" => {
            let allocated = state
                .allocator
                .next_voucher_no(state.sheets.as_ref(), &settings)
                .await;
            log::info!("Allocated voucher number {} for blank submission", allocated);
            allocated
        }
        given => given.to_string(),
    };

    ensure_tab(state.sheets.as_ref(), &state.tab_locks, &settings)
        .await
        .map_err(SubmissionError::EnsureTab)?;

    let voucher = Voucher::from_form(settings.category, voucher_no, form);

    let filename = voucher.document_filename();
    let document = render_receipt(state, &voucher, &settings, &filename).await?;

    let uploaded = upload_document(state, document.path(), &filename).await;
    let path = document.path().to_path_buf();
    if let Err(e) = document.close() {
        log::warn!("Failed to remove {}: {}", path.display(), e);
    }
    let stored = uploaded?;

    let row = settings.profile.row_for(&voucher, &stored.web_view_link);
    state
        .sheets
        .append_rows(&settings.spreadsheet_id, &settings.append_range(), vec![row])
        .await
        .map_err(SubmissionError::Append)?;

    let sheet_url = settings.sheet_url();
    notify_approver(state, &voucher.voucher_no, &sheet_url, &stored.web_view_link).await;

    Ok(SubmissionOutcome {
        voucher_no: voucher.voucher_no,
        sheet_url,
        pdf_file_id: stored.id,
        pdf_link: stored.web_view_link,
    })
}

/// Render the receipt into a uniquely named file in the document dir.
async fn render_receipt(
    state: &AppState,
    voucher: &Voucher,
    settings: &CategorySettings,
    filename: &str,
) -> Result<NamedTempFile, SubmissionError> {
    let renderer = state.renderer.clone();
    let voucher = voucher.clone();
    let profile = settings.profile.clone();
    let dir = state.document_dir.clone();
    let filename = filename.to_string();

    tokio::task::spawn_blocking(move || {
        let bytes = renderer.render(&voucher, &profile)?;
        persist_receipt(&dir, &filename, &bytes).map_err(ReceiptError::Write)
    })
    .await
    .map_err(|e| SubmissionError::Render(ReceiptError::Task(e.to_string())))?
    .map_err(SubmissionError::Render)
}

/// Write `bytes` to `<stem>.<random>.pdf` under `dir`. The file is removed
/// when the handle is dropped, including after a failed write.
pub fn persist_receipt(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let stem = filename.strip_suffix(".pdf").unwrap_or(filename);
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}.", stem))
        .suffix(".pdf")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

async fn upload_document(
    state: &AppState,
    path: &Path,
    filename: &str,
) -> Result<crate::storage::StoredObject, SubmissionError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| SubmissionError::Render(ReceiptError::Write(e)))?;
    state
        .storage
        .upload_file(filename, &data)
        .await
        .map_err(SubmissionError::Upload)
}

/// Best effort: a failed notification is logged and never fails the submission.
async fn notify_approver(state: &AppState, voucher_no: &str, sheet_url: &str, pdf_link: &str) {
    let Some(notifier) = &state.notifier else {
        log::warn!("Mail is not configured; skipping approver notification for {}", voucher_no);
        return;
    };

    let notification =
        Notification::voucher_submitted(&state.approver_email, voucher_no, sheet_url, pdf_link);
    match notifier.send(&notification).await {
        Ok(()) => log::info!("Notified {} about voucher {}", state.approver_email, voucher_no),
        Err(e) => log::error!("Failed to notify approver about voucher {}: {}", voucher_no, e),
    }
}
