//! Process configuration read from the environment (and `.env`).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::category::{Category, CategoryRegistry, CategorySettings};
use crate::voucher::profile::VoucherProfile;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_APPROVER_EMAIL: &str = "approver@example.com";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_KEEP_WARM_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error("invalid value for {key}: {reason}")]
    InvalidProfile { key: String, reason: String },
}

#[derive(Clone)]
pub struct MailConfig {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub categories: CategoryRegistry,
    pub drive_folder_id: Option<String>,
    pub credentials_path: PathBuf,
    pub mail: Option<MailConfig>,
    pub approver_email: String,
    pub public_dir: PathBuf,
    pub document_dir: PathBuf,
    /// `None` disables the keep-warm pinger.
    pub keep_warm_interval: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let mut entries = Vec::new();
        for category in Category::ALL {
            let sheet_key = format!("SPREADSHEET_ID_{}", category.env_key());
            let Some(spreadsheet_id) = get(&sheet_key) else {
                log::warn!(
                    "{} not set, category {} will be rejected",
                    sheet_key,
                    category
                );
                continue;
            };

            let fields_key = format!("{}_OPTIONAL_FIELDS", category.env_key());
            let profile = match get(&fields_key) {
                Some(list) => VoucherProfile::from_optional_list(&list)
                    .map_err(|reason| ConfigError::InvalidProfile {
                        key: fields_key.clone(),
                        reason,
                    })?,
                None => VoucherProfile::standard(),
            };

            entries.push(CategorySettings::new(category, spreadsheet_id, profile));
        }

        let mail = match (get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(username), Some(password)) => Some(MailConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                username,
                password,
            }),
            _ => None,
        };

        let keep_warm_secs = match get("KEEP_WARM_INTERVAL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "KEEP_WARM_INTERVAL_SECS".to_string(),
                    value: raw,
                })?,
            None => DEFAULT_KEEP_WARM_SECS,
        };

        Ok(Self {
            port,
            categories: CategoryRegistry::new(entries),
            drive_folder_id: get("DRIVE_FOLDER_ID"),
            credentials_path: get("GOOGLE_APPLICATION_CREDENTIALS")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string())
                .into(),
            mail,
            approver_email: get("APPROVER_EMAIL")
                .unwrap_or_else(|| DEFAULT_APPROVER_EMAIL.to_string()),
            public_dir: get("PUBLIC_DIR")
                .unwrap_or_else(|| DEFAULT_PUBLIC_DIR.to_string())
                .into(),
            document_dir: get("DOCUMENT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            keep_warm_interval: (keep_warm_secs > 0).then(|| Duration::from_secs(keep_warm_secs)),
        })
    }
}
