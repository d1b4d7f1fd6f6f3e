//! Spreadsheet mirror of the profile directory.
//!
//! Each profile owns one row found by its `id` column. Rows are written as
//! `[id, name, company, role, intro, tags, updated_at]`; a missing row is
//! appended, an existing one overwritten in columns A..G.

use crate::error::{Error, Result};
use async_trait::async_trait;
use relation_store::Profile;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Google Sheets API base URL
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";

/// Default worksheet name
pub const DEFAULT_SHEET_NAME: &str = "Profiles";

/// Values written for one profile.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// Profile id
    pub id: String,
    /// Name
    pub name: String,
    /// Company
    pub company: String,
    /// Role
    pub role: String,
    /// Intro
    pub intro: String,
    /// Comma-joined tags
    pub tags: String,
    /// RFC 3339 update time
    pub updated_at: String,
}

impl SheetRow {
    /// Cell values in column order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.company.clone(),
            self.role.clone(),
            self.intro.clone(),
            self.tags.clone(),
            self.updated_at.clone(),
        ]
    }
}

impl From<&Profile> for SheetRow {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            company: p.company.clone().unwrap_or_default(),
            role: p.role.clone().unwrap_or_default(),
            intro: p.intro.clone().unwrap_or_default(),
            tags: p.tags.join(","),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Destination for mirrored profile rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SheetSink: Send + Sync {
    /// Append or overwrite the row for `row.id`.
    async fn upsert_profile_row(&self, row: &SheetRow) -> Result<()>;
}

/// 0-based column index to A1 column letters (`0 -> A`, `26 -> AA`).
pub fn a1_column(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let r = (n - 1) % 26;
        letters.push(char::from(b'A' + r as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 1-based sheet row of the data row whose `id` column equals `id`.
///
/// Row 1 is the header. A header without an `id` column matches nothing.
pub fn find_row(rows: &[Vec<String>], id: &str) -> Option<usize> {
    let header = rows.first()?;
    let id_idx = header.iter().position(|h| h == "id")?;
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.get(id_idx).map(String::as_str) == Some(id))
        .map(|(i, _)| i + 1)
}

/// Google Sheets values-API client authenticated with a bearer token.
pub struct GoogleSheetsSink {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl GoogleSheetsSink {
    /// Create a sink for one worksheet.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::NotConfigured("missing Google Sheets token".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| Error::Sheets(e.to_string()))?;
        Ok(Self {
            client,
            base_url: SHEETS_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            token,
        })
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| Error::Sheets(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::Sheets("base url cannot be a base".to_string()))?
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        Err(Error::Sheets(format!("{what} failed ({status}): {text}")))
    }
}

#[async_trait]
impl SheetSink for GoogleSheetsSink {
    #[instrument(skip(self, row), fields(profile_id = %row.id))]
    async fn upsert_profile_row(&self, row: &SheetRow) -> Result<()> {
        let full_range = format!("{}!A:Z", self.sheet_name);
        let read = self
            .client
            .get(self.values_url(&full_range)?)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Sheets(e.to_string()))?;
        let existing: ValueRange = Self::check(read, "read")
            .await?
            .json()
            .await
            .map_err(|e| Error::Sheets(e.to_string()))?;

        let body = serde_json::json!({ "values": [row.values()] });
        match find_row(&existing.values, &row.id) {
            None => {
                let mut url = self.values_url(&format!("{full_range}:append"))?;
                url.query_pairs_mut().append_pair("valueInputOption", "RAW");
                let resp = self
                    .client
                    .post(url)
                    .bearer_auth(&self.token)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| Error::Sheets(e.to_string()))?;
                Self::check(resp, "append").await?;
                debug!("Appended sheet row");
            }
            Some(n) => {
                let range = format!("{}!A{n}:{}{n}", self.sheet_name, a1_column(6));
                let mut url = self.values_url(&range)?;
                url.query_pairs_mut().append_pair("valueInputOption", "RAW");
                let resp = self
                    .client
                    .put(url)
                    .bearer_auth(&self.token)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| Error::Sheets(e.to_string()))?;
                Self::check(resp, "update").await?;
                debug!(row = n, "Updated sheet row");
            }
        }
        Ok(())
    }
}
