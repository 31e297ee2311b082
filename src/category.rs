//! Business-unit categories and the per-category settings resolved at startup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::voucher::profile::VoucherProfile;

/// Number of rows a freshly created tab is given.
pub const TAB_ROWS: u32 = 1000;
/// Number of columns a freshly created tab is given.
pub const TAB_COLUMNS: u32 = 14;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
pub enum Category {
    Contentstack,
    Surfboard,
    RawEngineering,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Contentstack,
        Category::Surfboard,
        Category::RawEngineering,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Contentstack => "Contentstack",
            Self::Surfboard => "Surfboard",
            Self::RawEngineering => "RawEngineering",
        }
    }

    /// Title of the spreadsheet tab holding this category's vouchers.
    pub fn tab_title(&self) -> &'static str {
        self.name()
    }

    /// Two-letter voucher prefix, e.g. `SU` for Surfboard.
    pub fn prefix(&self) -> String {
        self.name().chars().take(2).collect::<String>().to_uppercase()
    }

    /// Logo file name inside the public directory.
    pub fn logo_file(&self) -> &'static str {
        match self {
            Self::Contentstack => "contentstack.png",
            Self::Surfboard => "surfboard.png",
            Self::RawEngineering => "raw.png",
        }
    }

    /// Upper-cased key used to build environment variable names.
    pub fn env_key(&self) -> &'static str {
        match self {
            Self::Contentstack => "CONTENTSTACK",
            Self::Surfboard => "SURFBOARD",
            Self::RawEngineering => "RAWENGINEERING",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Contentstack => 0,
            Self::Surfboard => 1,
            Self::RawEngineering => 2,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Everything a request needs to know about one configured category.
#[derive(Debug, Clone)]
pub struct CategorySettings {
    pub category: Category,
    pub spreadsheet_id: String,
    pub profile: VoucherProfile,
}

impl CategorySettings {
    pub fn new(category: Category, spreadsheet_id: impl Into<String>, profile: VoucherProfile) -> Self {
        Self {
            category,
            spreadsheet_id: spreadsheet_id.into(),
            profile,
        }
    }

    pub fn sheet_url(&self) -> String {
        crate::spreadsheet::spreadsheet_url(&self.spreadsheet_id)
    }

    /// Range covering every column of the profile, used for appends.
    pub fn append_range(&self) -> String {
        format!(
            "{}!A:{}",
            self.category.tab_title(),
            self.profile.last_column()
        )
    }

    pub fn header_range(&self) -> String {
        format!("{}!A1", self.category.tab_title())
    }
}

/// The categories that have a spreadsheet configured.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    entries: Vec<CategorySettings>,
}

impl CategoryRegistry {
    pub fn new(entries: Vec<CategorySettings>) -> Self {
        Self { entries }
    }

    /// Resolve a caller-supplied filter value. Unknown names and categories
    /// without a spreadsheet both resolve to `None`.
    pub fn resolve(&self, filter: &str) -> Option<&CategorySettings> {
        let category = filter.parse::<Category>().ok()?;
        self.get(category)
    }

    pub fn get(&self, category: Category) -> Option<&CategorySettings> {
        self.entries
            .iter()
            .find(|entry| entry.category == category && !entry.spreadsheet_id.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.iter().map(|entry| entry.category)
    }
}
