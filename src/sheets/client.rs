//! Google Sheets API client
//!
//! High-level facade over the Sheets/Drive REST APIs. Each operation is a
//! single synchronous round trip; no local retries or caching.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::google::SHEETS_API_BASE_URL;
use crate::error::{NotFoundError, Result, SheetsMcpError, UpstreamError, ValidationError};
use crate::sheets::auth::Authenticator;
use crate::sheets::drive::DriveManager;
use crate::sheets::types::*;

/// Roles accepted by share_spreadsheet
pub const SHARE_ROLES: [&str; 3] = ["reader", "writer", "owner"];

/// Build a fully qualified A1 range, quoting the sheet name.
///
/// Single quotes inside the name are doubled per A1 notation rules.
pub fn qualified_range(sheet: &str, range: Option<&str>) -> String {
    let quoted = format!("'{}'", sheet.replace('\'', "''"));
    match range {
        Some(r) if !r.is_empty() => format!("{}!{}", quoted, r),
        _ => quoted,
    }
}

/// One entry of a batch update: a qualified range plus the block to write
#[derive(Debug, Clone, Deserialize)]
pub struct RangeUpdate {
    /// Full A1 range including the sheet name
    pub range: String,

    /// The block of values to write
    pub values: CellMatrix,
}

/// Outcome of sharing with a single address
#[derive(Debug, Clone, Serialize)]
pub struct ShareOutcome {
    pub email: String,
    pub permission_id: String,
    pub role: String,
}

/// Per-email result of share_spreadsheet
#[derive(Debug, Clone, Serialize, Default)]
pub struct ShareResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub successes: Vec<ShareOutcome>,
    pub failures: Vec<ShareFailure>,
}

/// A single failed grant
#[derive(Debug, Clone, Serialize)]
pub struct ShareFailure {
    pub email: String,
    pub error: String,
}

/// Google Sheets API client
pub struct SheetsClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Service-account authenticator
    authenticator: Arc<Authenticator>,

    /// Folder that scopes creation/listing when no explicit folder is given
    drive_folder_id: Option<String>,
}

impl SheetsClient {
    /// Create a new Sheets client
    pub fn new(authenticator: Arc<Authenticator>, drive_folder_id: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            authenticator,
            drive_folder_id,
        }
    }

    /// Get a valid access token
    async fn access_token(&self) -> Result<String> {
        self.authenticator.get_access_token().await
    }

    /// Base URL for a spreadsheet resource
    fn spreadsheet_url(spreadsheet_id: &str) -> String {
        format!("{}/spreadsheets/{}", SHEETS_API_BASE_URL, spreadsheet_id)
    }

    /// URL for a values range within a spreadsheet
    fn values_url(spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/values/{}",
            Self::spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range)
        )
    }

    /// Classify a failed values/spreadsheet response.
    ///
    /// The Sheets API reports an unknown sheet name as a 400 range-parse
    /// failure rather than a 404; fold that into the not-found taxonomy.
    fn classify_sheet_error(
        status: u16,
        body: &str,
        spreadsheet_id: &str,
        sheet: Option<&str>,
    ) -> SheetsMcpError {
        if status == 404 {
            return SheetsMcpError::NotFound(NotFoundError::Spreadsheet {
                spreadsheet_id: spreadsheet_id.to_string(),
            });
        }
        if status == 400 && body.contains("Unable to parse range") {
            if let Some(name) = sheet {
                return SheetsMcpError::NotFound(NotFoundError::Sheet {
                    name: name.to_string(),
                });
            }
        }
        SheetsMcpError::from_api_response(
            status,
            body,
            &format!("spreadsheet {}", spreadsheet_id),
        )
    }

    // ==================== Value Operations ====================

    /// Read a block of values from a sheet
    pub async fn get_sheet_data(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: Option<&str>,
    ) -> Result<ValueRange> {
        self.get_values(spreadsheet_id, sheet, range, None).await
    }

    /// Read the formulas of a block rather than rendered values
    pub async fn get_sheet_formulas(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: Option<&str>,
    ) -> Result<ValueRange> {
        self.get_values(spreadsheet_id, sheet, range, Some("FORMULA"))
            .await
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: Option<&str>,
        render_option: Option<&str>,
    ) -> Result<ValueRange> {
        let token = self.access_token().await?;
        let full_range = qualified_range(sheet, range);
        let mut url = Self::values_url(spreadsheet_id, &full_range);
        if let Some(option) = render_option {
            url.push_str(&format!("?valueRenderOption={}", option));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(Self::classify_sheet_error(
                status,
                &text,
                spreadsheet_id,
                Some(sheet),
            ))
        }
    }

    /// Overwrite a range with a block of values.
    ///
    /// Cells outside the block's bounding rectangle are left untouched.
    pub async fn update_cells(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        range: &str,
        data: CellMatrix,
    ) -> Result<UpdateValuesResponse> {
        if data.is_empty() {
            return Err(ValidationError::EmptyMatrix.into());
        }

        let token = self.access_token().await?;
        let full_range = qualified_range(sheet, Some(range));
        let url = format!(
            "{}?valueInputOption=USER_ENTERED",
            Self::values_url(spreadsheet_id, &full_range)
        );

        let body = ValueRange {
            range: Some(full_range),
            major_dimension: None,
            values: data,
        };

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(Self::classify_sheet_error(
                status,
                &text,
                spreadsheet_id,
                Some(sheet),
            ))
        }
    }

    /// Apply several range updates in one request.
    ///
    /// An empty update list is a local no-op. Non-empty lists go through
    /// values:batchUpdate, which is atomic on the Google side: either every
    /// range is written or none is.
    pub async fn batch_update_cells(
        &self,
        spreadsheet_id: &str,
        updates: Vec<RangeUpdate>,
    ) -> Result<BatchUpdateValuesResponse> {
        if updates.is_empty() {
            return Ok(BatchUpdateValuesResponse {
                spreadsheet_id: Some(spreadsheet_id.to_string()),
                ..Default::default()
            });
        }

        let token = self.access_token().await?;
        let url = format!(
            "{}/values:batchUpdate",
            Self::spreadsheet_url(spreadsheet_id)
        );

        let request = BatchUpdateValuesRequest {
            value_input_option: "USER_ENTERED".to_string(),
            data: updates
                .into_iter()
                .map(|u| ValueRange {
                    range: Some(u.range),
                    major_dimension: None,
                    values: u.values,
                })
                .collect(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(Self::classify_sheet_error(
                status,
                &text,
                spreadsheet_id,
                None,
            ))
        }
    }

    /// Append rows after the last populated row of a sheet
    pub async fn add_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        rows: CellMatrix,
    ) -> Result<AppendValuesResponse> {
        if rows.is_empty() {
            return Err(ValidationError::EmptyMatrix.into());
        }

        let token = self.access_token().await?;
        let full_range = qualified_range(sheet, None);
        let url = format!(
            "{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            Self::values_url(spreadsheet_id, &full_range)
        );

        let body = ValueRange {
            range: None,
            major_dimension: None,
            values: rows,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(Self::classify_sheet_error(
                status,
                &text,
                spreadsheet_id,
                Some(sheet),
            ))
        }
    }

    // ==================== Spreadsheet Operations ====================

    /// Create a new spreadsheet, placing it in the working folder when one
    /// is supplied or configured
    pub async fn create_spreadsheet(
        &self,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<Spreadsheet> {
        let token = self.access_token().await?;
        let folder = folder_id.or(self.drive_folder_id.as_deref());

        if let Some(folder) = folder {
            // Creating through Drive puts the file directly into the folder
            let manager = DriveManager::new(&self.http_client, &token);
            let file = manager.create_spreadsheet(title, folder).await?;
            return Ok(Spreadsheet {
                spreadsheet_id: Some(file.id),
                properties: SpreadsheetProperties {
                    title: Some(file.name),
                },
                sheets: Vec::new(),
                spreadsheet_url: None,
            });
        }

        let url = format!("{}/spreadsheets", SHEETS_API_BASE_URL);
        let body = json!({ "properties": { "title": title } });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(SheetsMcpError::from_api_response(
                status,
                &text,
                "spreadsheet creation",
            ))
        }
    }

    /// List visible spreadsheets, optionally scoped to a folder
    pub async fn list_spreadsheets(&self, folder_id: Option<&str>) -> Result<Vec<DriveFile>> {
        let token = self.access_token().await?;
        let folder = folder_id.or(self.drive_folder_id.as_deref());
        let manager = DriveManager::new(&self.http_client, &token);
        manager.list_spreadsheets(folder).await
    }

    /// Share a spreadsheet with a list of addresses.
    ///
    /// Each address is processed independently; a failure for one does not
    /// abort the rest.
    pub async fn share_spreadsheet(
        &self,
        spreadsheet_id: &str,
        emails: &[String],
        role: &str,
        send_notification: bool,
    ) -> Result<ShareResult> {
        if !SHARE_ROLES.contains(&role) {
            return Err(ValidationError::InvalidRole {
                role: role.to_string(),
            }
            .into());
        }

        let token = self.access_token().await?;
        let manager = DriveManager::new(&self.http_client, &token);

        let mut result = ShareResult::default();
        for email in emails {
            match manager
                .create_permission(spreadsheet_id, email, role, send_notification)
                .await
            {
                Ok(permission) => result.successes.push(ShareOutcome {
                    email: email.clone(),
                    permission_id: permission.id,
                    role: permission.role.unwrap_or_else(|| role.to_string()),
                }),
                Err(e) => result.failures.push(ShareFailure {
                    email: email.clone(),
                    error: e.to_string(),
                }),
            }
        }

        result.success_count = result.successes.len();
        result.failure_count = result.failures.len();
        Ok(result)
    }

    // ==================== Sheet Operations ====================

    /// Fetch spreadsheet metadata, restricted to the given fields
    async fn get_spreadsheet(&self, spreadsheet_id: &str, fields: &str) -> Result<Spreadsheet> {
        let token = self.access_token().await?;
        let url = format!(
            "{}?fields={}",
            Self::spreadsheet_url(spreadsheet_id),
            urlencoding::encode(fields)
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(Self::classify_sheet_error(
                status,
                &text,
                spreadsheet_id,
                None,
            ))
        }
    }

    /// List the sheet names of a spreadsheet, in tab order
    pub async fn list_sheets(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        let spreadsheet = self
            .get_spreadsheet(spreadsheet_id, "sheets.properties")
            .await?;

        Ok(spreadsheet
            .sheets
            .into_iter()
            .filter_map(|s| s.properties.title)
            .collect())
    }

    /// Resolve a sheet name to its numeric ID
    async fn resolve_sheet_id(&self, spreadsheet_id: &str, sheet: &str) -> Result<i64> {
        let spreadsheet = self
            .get_spreadsheet(spreadsheet_id, "sheets.properties")
            .await?;

        spreadsheet
            .sheets
            .iter()
            .find(|s| s.properties.title.as_deref() == Some(sheet))
            .and_then(|s| s.properties.sheet_id)
            .ok_or_else(|| {
                SheetsMcpError::NotFound(NotFoundError::Sheet {
                    name: sheet.to_string(),
                })
            })
    }

    /// Run a spreadsheets:batchUpdate with the given request objects
    async fn batch_update_spreadsheet(
        &self,
        spreadsheet_id: &str,
        requests: Vec<serde_json::Value>,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let token = self.access_token().await?;
        let url = format!("{}:batchUpdate", Self::spreadsheet_url(spreadsheet_id));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "requests": requests }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(Self::classify_sheet_error(
                status,
                &text,
                spreadsheet_id,
                None,
            ))
        }
    }

    /// Add a new sheet (tab) to a spreadsheet
    pub async fn create_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<SheetProperties> {
        let requests = vec![json!({
            "addSheet": { "properties": { "title": title } }
        })];

        let result = self
            .batch_update_spreadsheet(spreadsheet_id, requests)
            .await?;

        let properties = result
            .replies
            .first()
            .and_then(|r| r.get("addSheet"))
            .and_then(|r| r.get("properties"))
            .cloned()
            .ok_or_else(|| {
                SheetsMcpError::Upstream(UpstreamError::RequestFailed {
                    status: 200,
                    message: "addSheet reply missing properties".to_string(),
                })
            })?;

        Ok(serde_json::from_value(properties)?)
    }

    /// Rename a sheet within a spreadsheet
    pub async fn rename_sheet(
        &self,
        spreadsheet_id: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        let sheet_id = self.resolve_sheet_id(spreadsheet_id, old_name).await?;

        let requests = vec![json!({
            "updateSheetProperties": {
                "properties": { "sheetId": sheet_id, "title": new_name },
                "fields": "title"
            }
        })];

        self.batch_update_spreadsheet(spreadsheet_id, requests)
            .await?;
        Ok(())
    }

    /// Copy a sheet into another spreadsheet, optionally renaming the copy
    pub async fn copy_sheet(
        &self,
        src_spreadsheet: &str,
        src_sheet: &str,
        dst_spreadsheet: &str,
        dst_sheet: Option<&str>,
    ) -> Result<SheetProperties> {
        let sheet_id = self.resolve_sheet_id(src_spreadsheet, src_sheet).await?;

        let token = self.access_token().await?;
        let url = format!(
            "{}/sheets/{}:copyTo",
            Self::spreadsheet_url(src_spreadsheet),
            sheet_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "destinationSpreadsheetId": dst_spreadsheet }))
            .send()
            .await?;

        let mut properties: SheetProperties = if response.status().is_success() {
            response.json().await?
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Self::classify_sheet_error(
                status,
                &text,
                dst_spreadsheet,
                None,
            ));
        };

        // The copy lands as "Copy of <name>"; rename it when a target name
        // was requested
        if let Some(new_name) = dst_sheet {
            if let Some(copy_id) = properties.sheet_id {
                let requests = vec![json!({
                    "updateSheetProperties": {
                        "properties": { "sheetId": copy_id, "title": new_name },
                        "fields": "title"
                    }
                })];
                self.batch_update_spreadsheet(dst_spreadsheet, requests)
                    .await?;
                properties.title = Some(new_name.to_string());
            }
        }

        Ok(properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_range_plain() {
        assert_eq!(qualified_range("Sheet1", Some("A1:B2")), "'Sheet1'!A1:B2");
    }

    #[test]
    fn test_qualified_range_whole_sheet() {
        assert_eq!(qualified_range("Sheet1", None), "'Sheet1'");
        assert_eq!(qualified_range("Sheet1", Some("")), "'Sheet1'");
    }

    #[test]
    fn test_qualified_range_quoting() {
        assert_eq!(
            qualified_range("Q1 'Draft'", Some("A1")),
            "'Q1 ''Draft'''!A1"
        );
        assert_eq!(qualified_range("My Data", Some("B2:C3")), "'My Data'!B2:C3");
    }

    #[test]
    fn test_share_roles_closed_set() {
        assert!(SHARE_ROLES.contains(&"reader"));
        assert!(SHARE_ROLES.contains(&"writer"));
        assert!(SHARE_ROLES.contains(&"owner"));
        assert!(!SHARE_ROLES.contains(&"commenter"));
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = SheetsClient::values_url("abc", "'My Data'!A1:B2");
        assert!(url.contains("/spreadsheets/abc/values/"));
        assert!(!url.contains(' '));
    }
}
