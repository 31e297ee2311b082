#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use voucher_server::category::{Category, CategoryRegistry, CategorySettings};
use voucher_server::error::ServiceError;
use voucher_server::notify::{Notification, Notifier};
use voucher_server::receipt::ReceiptRenderer;
use voucher_server::spreadsheet::SpreadsheetService;
use voucher_server::storage::{ObjectStorage, StoredObject};
use voucher_server::voucher::profile::VoucherProfile;
use voucher_server::AppState;

fn unavailable(service: &'static str) -> ServiceError {
    ServiceError::Status {
        service,
        status: 503,
        body: format!("{} is down", service),
    }
}

/// Index of a single-letter A1 column.
fn column_index(column: &str) -> usize {
    column
        .bytes()
        .next()
        .map(|b| (b.to_ascii_uppercase() - b'A') as usize)
        .unwrap_or(0)
}

/// `Tab!D:D` -> ("Tab", "D"); `Tab!A1` -> ("Tab", "A1").
fn split_range(range: &str) -> (&str, &str) {
    let (tab, cells) = range.split_once('!').unwrap_or((range, "A"));
    let column = cells.split(':').next().unwrap_or("A");
    (tab, column)
}

/// In-memory spreadsheet keyed by tab title.
#[derive(Default)]
pub struct MockSpreadsheet {
    tabs: Mutex<HashMap<String, Vec<Vec<String>>>>,
    pub reads: AtomicUsize,
    pub tab_listings: AtomicUsize,
    pub tabs_added: AtomicUsize,
    pub writes: AtomicUsize,
    pub appends: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_appends: AtomicBool,
}

impl MockSpreadsheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(self, title: &str, rows: Vec<Vec<String>>) -> Self {
        self.tabs.lock().insert(title.to_string(), rows);
        self
    }

    pub fn rows(&self, title: &str) -> Vec<Vec<String>> {
        self.tabs.lock().get(title).cloned().unwrap_or_default()
    }

    pub fn has_tab(&self, title: &str) -> bool {
        self.tabs.lock().contains_key(title)
    }

    pub fn total_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
            + self.tab_listings.load(Ordering::SeqCst)
            + self.tabs_added.load(Ordering::SeqCst)
            + self.writes.load(Ordering::SeqCst)
            + self.appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpreadsheetService for MockSpreadsheet {
    async fn read_range(
        &self,
        _spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, ServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("sheets"));
        }

        let (tab, column) = split_range(range);
        let index = column_index(column);
        let tabs = self.tabs.lock();
        let rows = tabs
            .get(tab)
            .ok_or_else(|| ServiceError::Status {
                service: "sheets",
                status: 400,
                body: format!("Unable to parse range: {}", range),
            })?;

        Ok(rows
            .iter()
            .map(|row| row.get(index).cloned().into_iter().collect())
            .collect())
    }

    async fn list_tabs(&self, _spreadsheet_id: &str) -> Result<Vec<String>, ServiceError> {
        self.tab_listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.tabs.lock().keys().cloned().collect())
    }

    async fn add_tab(
        &self,
        _spreadsheet_id: &str,
        title: &str,
        _rows: u32,
        _columns: u32,
    ) -> Result<(), ServiceError> {
        self.tabs_added.fetch_add(1, Ordering::SeqCst);
        self.tabs.lock().insert(title.to_string(), Vec::new());
        Ok(())
    }

    async fn write_range(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let (tab, _) = split_range(range);
        let mut tabs = self.tabs.lock();
        let existing = tabs.entry(tab.to_string()).or_default();
        for (i, row) in rows.into_iter().enumerate() {
            if i < existing.len() {
                existing[i] = row;
            } else {
                existing.push(row);
            }
        }
        Ok(())
    }

    async fn append_rows(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(unavailable("sheets"));
        }
        let (tab, _) = split_range(range);
        self.tabs
            .lock()
            .entry(tab.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }
}

/// Mock implementation of ObjectStorage for testing
#[derive(Default)]
pub struct MockObjectStorage {
    files: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail_uploads: AtomicBool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.files.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn data(&self, filename: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, data)| data.clone())
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload_file(
        &self,
        filename: &str,
        file_data: &[u8],
    ) -> Result<StoredObject, ServiceError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(unavailable("drive"));
        }
        let mut files = self.files.lock();
        files.push((filename.to_string(), file_data.to_vec()));
        let id = format!("file-{}", files.len());
        Ok(StoredObject {
            web_view_link: format!("https://drive.example.com/{}/view", id),
            id,
        })
    }
}

#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<Notification>>,
    pub fail: AtomicBool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), ServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Mail("connection refused".to_string()));
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

pub const APPROVER: &str = "approver@test.example";

/// Surfboard and Contentstack use the standard profile; RawEngineering
/// records Paid By and Prepared By.
pub fn registry() -> CategoryRegistry {
    CategoryRegistry::new(vec![
        CategorySettings::new(Category::Contentstack, "sheet-co", VoucherProfile::standard()),
        CategorySettings::new(Category::Surfboard, "sheet-su", VoucherProfile::standard()),
        CategorySettings::new(
            Category::RawEngineering,
            "sheet-ra",
            VoucherProfile::with_optional(true, true),
        ),
    ])
}

pub struct TestHarness {
    pub state: AppState,
    pub sheets: Arc<MockSpreadsheet>,
    pub storage: Arc<MockObjectStorage>,
    pub notifier: Arc<MockNotifier>,
}

pub fn harness(sheets: MockSpreadsheet, document_dir: &Path) -> TestHarness {
    let sheets = Arc::new(sheets);
    let storage = Arc::new(MockObjectStorage::new());
    let notifier = Arc::new(MockNotifier::new());

    let state = AppState::new(
        registry(),
        sheets.clone(),
        storage.clone(),
        ReceiptRenderer::new(document_dir.join("public")),
        document_dir,
    )
    .with_notifier(notifier.clone(), APPROVER);

    TestHarness {
        state,
        sheets,
        storage,
        notifier,
    }
}

pub fn column(values: &[&str]) -> Vec<Vec<String>> {
    values.iter().map(|v| vec![v.to_string()]).collect()
}

/// Form fields of a complete submission.
pub fn form_fields(filter: &str, voucher_no: &str) -> Vec<(&'static str, String)> {
    vec![
        ("filter", filter.to_string()),
        ("date", "2025-03-14".to_string()),
        ("voucherNo", voucher_no.to_string()),
        ("payTo", "Acme Stationers".to_string()),
        ("accountHead", "Office Supplies".to_string()),
        ("account", "Printer cartridges".to_string()),
        ("amount", "1250".to_string()),
        ("amountRs", "One thousand two hundred fifty only".to_string()),
        ("checkedBy", "Bob".to_string()),
        ("approvedBy", "Carol".to_string()),
    ]
}
