//! Sheets v4 REST client.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{check_status, TokenProvider};
use crate::error::ServiceError;
use crate::spreadsheet::SpreadsheetService;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SERVICE: &str = "sheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetTabs {
    #[serde(default)]
    sheets: Vec<TabEntry>,
}

#[derive(Debug, Deserialize)]
struct TabEntry {
    properties: TabProperties,
}

#[derive(Debug, Deserialize)]
struct TabProperties {
    title: String,
}

pub struct GoogleSheets {
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: String,
}

impl GoogleSheets {
    pub fn new(http: reqwest::Client, tokens: Arc<TokenProvider>) -> Self {
        Self::with_base_url(http, tokens, SHEETS_API)
    }

    pub fn with_base_url(
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            base_url: base_url.into(),
        }
    }

    /// `{base}/{segments...}` with every segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ServiceError::malformed(SERVICE, format!("bad base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::malformed(SERVICE, "base url cannot have segments"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let token = self.tokens.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(ServiceError::transport(SERVICE))?;
        check_status(SERVICE, response).await
    }
}

/// Render a cell the way it is displayed; the API returns formatted strings
/// but numbers and booleans are tolerated.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SpreadsheetService for GoogleSheets {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, ServiceError> {
        let url = self.url(&[spreadsheet_id, "values", range])?;
        let response = self.send(self.http.get(url)).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(SERVICE, e))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn list_tabs(&self, spreadsheet_id: &str) -> Result<Vec<String>, ServiceError> {
        let url = self.url(&[spreadsheet_id])?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", "sheets.properties.title")]);
        let body: SpreadsheetTabs = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| ServiceError::malformed(SERVICE, e))?;

        Ok(body.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn add_tab(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        columns: u32,
    ) -> Result<(), ServiceError> {
        let target = format!("{}:batchUpdate", spreadsheet_id);
        let url = self.url(&[target.as_str()])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": columns }
                    }
                }
            }]
        });
        self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }

    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError> {
        let url = self.url(&[spreadsheet_id, "values", range])?;
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "values": rows }));
        self.send(request).await?;
        Ok(())
    }

    async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), ServiceError> {
        let target = format!("{}:append", range);
        let url = self.url(&[spreadsheet_id, "values", target.as_str()])?;
        let request = self
            .http
            .post(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": rows }));
        self.send(request).await?;
        Ok(())
    }
}
