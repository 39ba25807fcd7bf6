//! Google Sheets backend (Sheets API v4, bearer access token)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CellValue, ColumnRef, SheetError, SheetSource};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeUpdate<'a> {
    range: &'a str,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: Vec<Vec<Value>>,
}

/// One tab of a Google spreadsheet
#[derive(Debug, Clone)]
pub struct GoogleSheet {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    access_token: String,
}

impl GoogleSheet {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            access_token: access_token.into(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// A1 range qualified with the quoted sheet name, e.g. `'Sign ups'!D1:D`
    fn qualified(&self, range: &str) -> String {
        let quoted = self.sheet_name.replace('\'', "''");
        if range.is_empty() {
            format!("'{}'", quoted)
        } else {
            format!("'{}'!{}", quoted, range)
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&self.qualified(range))
        )
    }

    async fn get_rows(&self, range: &str) -> Result<Vec<Vec<Value>>, SheetError> {
        let url = self.values_url(range);
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Api { status: status.as_u16(), body });
        }

        let range: ValueRange = resp.json().await?;
        Ok(range.values)
    }
}

#[async_trait]
impl SheetSource for GoogleSheet {
    async fn last_row(&mut self) -> Result<usize, SheetError> {
        let rows = self.get_rows("").await?;
        Ok(rows
            .iter()
            .rposition(|row| row.iter().any(|v| !CellValue::from_json(v).is_empty()))
            .map(|i| i + 1)
            .unwrap_or(0))
    }

    async fn read_column(&mut self, column: ColumnRef) -> Result<Vec<CellValue>, SheetError> {
        // The API trims trailing blanks, so the row count comes from the whole sheet
        let last_row = self.last_row().await?;
        if last_row == 0 {
            return Ok(Vec::new());
        }

        let range = format!("{}:{}", column.cell(1), column.cell(last_row));
        let rows = self.get_rows(&range).await?;

        Ok((0..last_row)
            .map(|i| {
                rows.get(i)
                    .and_then(|r| r.first())
                    .map(CellValue::from_json)
                    .unwrap_or(CellValue::Empty)
            })
            .collect())
    }

    async fn read_cell(&mut self, row: usize, column: ColumnRef) -> Result<CellValue, SheetError> {
        if row == 0 {
            return Err(SheetError::InvalidRow { row });
        }
        let rows = self.get_rows(&column.cell(row)).await?;
        Ok(rows
            .first()
            .and_then(|r| r.first())
            .map(CellValue::from_json)
            .unwrap_or(CellValue::Empty))
    }

    async fn write_cell(
        &mut self,
        row: usize,
        column: ColumnRef,
        value: CellValue,
    ) -> Result<(), SheetError> {
        if row == 0 {
            return Err(SheetError::InvalidRow { row });
        }

        let cell = column.cell(row);
        let url = self.values_url(&cell);
        let qualified = self.qualified(&cell);
        let body = ValueRangeUpdate {
            range: &qualified,
            major_dimension: "ROWS",
            values: vec![vec![value.to_json()]],
        };

        log::debug!("PUT {}", url);
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SheetError::Api { status: status.as_u16(), body });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Google sheet {} [{}]", self.spreadsheet_id, self.sheet_name)
    }
}
