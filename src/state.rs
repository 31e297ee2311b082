//! Shared application state handed to every handler through `web::Data`.

use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;

use crate::category::CategoryRegistry;
use crate::config::AppConfig;
use crate::google::{GoogleDrive, GoogleSheets, ServiceAccountKey, TokenProvider, SCOPES};
use crate::notify::{Notifier, SmtpNotifier};
use crate::receipt::ReceiptRenderer;
use crate::spreadsheet::SpreadsheetService;
use crate::storage::ObjectStorage;
use crate::voucher::allocator::VoucherAllocator;
use crate::voucher::submission::TabLocks;

const DEFAULT_APPROVER: &str = "approver@example.com";

#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CategoryRegistry>,
    pub sheets: Arc<dyn SpreadsheetService + Send + Sync>,
    pub storage: Arc<dyn ObjectStorage + Send + Sync>,
    pub notifier: Option<Arc<dyn Notifier + Send + Sync>>,
    pub allocator: Arc<VoucherAllocator>,
    pub tab_locks: Arc<TabLocks>,
    pub renderer: ReceiptRenderer,
    pub document_dir: PathBuf,
    pub approver_email: String,
}

impl AppState {
    /// State over arbitrary collaborators, without notifications.
    pub fn new(
        categories: CategoryRegistry,
        sheets: Arc<dyn SpreadsheetService + Send + Sync>,
        storage: Arc<dyn ObjectStorage + Send + Sync>,
        renderer: ReceiptRenderer,
        document_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            categories: Arc::new(categories),
            sheets,
            storage,
            notifier: None,
            allocator: Arc::new(VoucherAllocator::new()),
            tab_locks: Arc::new(TabLocks::new()),
            renderer,
            document_dir: document_dir.into(),
            approver_email: DEFAULT_APPROVER.to_string(),
        }
    }

    pub fn with_notifier(
        mut self,
        notifier: Arc<dyn Notifier + Send + Sync>,
        approver_email: impl Into<String>,
    ) -> Self {
        self.notifier = Some(notifier);
        self.approver_email = approver_email.into();
        self
    }

    /// Wire the Google and SMTP clients described by `config`.
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> anyhow::Result<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_path).with_context(|| {
            format!(
                "loading service account key from {}",
                config.credentials_path.display()
            )
        })?;
        log::info!("Using service account {}", key.client_email);

        let tokens = Arc::new(TokenProvider::new(key, SCOPES, http.clone()));
        let sheets = Arc::new(GoogleSheets::new(http.clone(), tokens.clone()));
        let storage = Arc::new(GoogleDrive::new(
            http,
            tokens,
            config.drive_folder_id.clone(),
        ));

        std::fs::create_dir_all(&config.document_dir).with_context(|| {
            format!("creating document dir {}", config.document_dir.display())
        })?;

        let state = Self::new(
            config.categories.clone(),
            sheets,
            storage,
            ReceiptRenderer::new(&config.public_dir),
            &config.document_dir,
        );

        match &config.mail {
            Some(mail) => {
                let notifier = SmtpNotifier::new(mail).context("configuring SMTP notifier")?;
                log::info!("Approver notifications go to {} via {}", config.approver_email, mail.host);
                Ok(state.with_notifier(Arc::new(notifier), config.approver_email.clone()))
            }
            None => {
                log::warn!("EMAIL_USER/EMAIL_PASS not set; approver notifications are disabled");
                Ok(state)
            }
        }
    }
}
