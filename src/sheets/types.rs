//! Google Sheets and Drive API type definitions
//!
//! These types mirror the Sheets v4 / Drive v3 responses and are used for
//! serialization/deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A rectangular block of cell values. Rows need not be equal length; the
/// vendor API pads ragged rows on write.
pub type CellMatrix = Vec<Vec<Value>>;

/// A range of values in a sheet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// The range the values cover, in A1 notation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,

    /// ROWS or COLUMNS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,

    /// The data, outer list = rows
    #[serde(default)]
    pub values: CellMatrix,
}

/// Response from updating a range of values
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,

    #[serde(default)]
    pub updated_rows: u32,

    #[serde(default)]
    pub updated_columns: u32,

    #[serde(default)]
    pub updated_cells: u32,
}

/// Request body for values:batchUpdate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesRequest {
    pub value_input_option: String,
    pub data: Vec<ValueRange>,
}

/// Response from values:batchUpdate
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub total_updated_rows: u32,

    #[serde(default)]
    pub total_updated_columns: u32,

    #[serde(default)]
    pub total_updated_cells: u32,

    #[serde(default)]
    pub total_updated_sheets: u32,

    /// Per-range results, in request order
    #[serde(default)]
    pub responses: Vec<UpdateValuesResponse>,
}

/// Response from values:append
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    /// The range the appended values landed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_range: Option<String>,

    #[serde(default)]
    pub updates: UpdateValuesResponse,
}

/// Spreadsheet properties
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Properties of a single sheet (tab)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// A sheet within a spreadsheet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    #[serde(default)]
    pub properties: SheetProperties,
}

/// A spreadsheet resource
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub properties: SpreadsheetProperties,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheets: Vec<Sheet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
}

/// Response from spreadsheets:batchUpdate
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateSpreadsheetResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// One reply per request, in request order
    #[serde(default)]
    pub replies: Vec<Value>,
}

/// A file as returned by the Drive API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Response from Drive files.list
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// Request body for Drive files.create
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileCreateRequest {
    pub name: String,

    pub mime_type: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

/// Request body for Drive permissions.create
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRequest {
    #[serde(rename = "type")]
    pub grantee_type: String,

    pub role: String,

    pub email_address: String,
}

/// A Drive permission grant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_range_deserialization() {
        let json = r#"{
            "range": "'Sheet1'!A1:B2",
            "majorDimension": "ROWS",
            "values": [["a", 1], ["b", true]]
        }"#;

        let range: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(range.range.as_deref(), Some("'Sheet1'!A1:B2"));
        assert_eq!(range.values.len(), 2);
        assert_eq!(range.values[0][0], json!("a"));
        assert_eq!(range.values[1][1], json!(true));
    }

    #[test]
    fn test_value_range_empty_values_default() {
        // Google omits "values" entirely for an empty range
        let range: ValueRange = serde_json::from_str(r#"{"range": "A1:B2"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_update_response_deserialization() {
        let json = r#"{
            "spreadsheetId": "abc",
            "updatedRange": "'Sheet1'!A1:B2",
            "updatedRows": 2,
            "updatedColumns": 2,
            "updatedCells": 4
        }"#;

        let response: UpdateValuesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.updated_cells, 4);
        assert_eq!(response.updated_range.as_deref(), Some("'Sheet1'!A1:B2"));
    }

    #[test]
    fn test_permission_request_serialization() {
        let request = PermissionRequest {
            grantee_type: "user".to_string(),
            role: "writer".to_string(),
            email_address: "a@example.com".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["emailAddress"], "a@example.com");
    }

    #[test]
    fn test_spreadsheet_deserialization() {
        let json = r#"{
            "spreadsheetId": "abc",
            "properties": {"title": "Budget"},
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1", "index": 0}},
                {"properties": {"sheetId": 99, "title": "Data", "index": 1}}
            ]
        }"#;

        let spreadsheet: Spreadsheet = serde_json::from_str(json).unwrap();
        assert_eq!(spreadsheet.sheets.len(), 2);
        assert_eq!(spreadsheet.sheets[1].properties.sheet_id, Some(99));
    }
}
