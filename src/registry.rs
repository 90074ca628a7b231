//! Tool registry shared by both transports
//!
//! A fixed table maps each operation name to a declarative argument schema
//! and a handler. The stdio server and the HTTP server both go through
//! [`ToolRegistry::invoke`], so validation and dispatch behave identically
//! regardless of entry point.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::{Result, ValidationError};
use crate::sheets::client::{RangeUpdate, SheetsClient};
use crate::sheets::types::CellMatrix;

/// Primitive kinds an argument can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// JSON string
    String,
    /// JSON boolean
    Boolean,
    /// Array of strings
    StringList,
    /// Array of rows, each an array of scalars
    Matrix,
    /// Array of `{range, values}` objects
    UpdateList,
}

impl ParamKind {
    /// Whether a JSON value matches this kind
    fn matches(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            ParamKind::Matrix => value.as_array().is_some_and(|rows| {
                rows.iter().all(|row| {
                    row.as_array()
                        .is_some_and(|cells| cells.iter().all(|c| !c.is_array() && !c.is_object()))
                })
            }),
            ParamKind::UpdateList => value.as_array().is_some_and(|items| {
                items.iter().all(|item| {
                    item.get("range").is_some_and(Value::is_string)
                        && item
                            .get("values")
                            .is_some_and(|v| ParamKind::Matrix.matches(v))
                })
            }),
        }
    }

    /// Human-readable name used in validation errors
    fn describe(&self) -> &'static str {
        match self {
            ParamKind::String => "a string",
            ParamKind::Boolean => "a boolean",
            ParamKind::StringList => "an array of strings",
            ParamKind::Matrix => "an array of rows of scalar values",
            ParamKind::UpdateList => "an array of {range, values} objects",
        }
    }

    /// JSON Schema fragment for this kind
    fn json_schema(&self) -> Value {
        match self {
            ParamKind::String => json!({"type": "string"}),
            ParamKind::Boolean => json!({"type": "boolean"}),
            ParamKind::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamKind::Matrix => json!({
                "type": "array",
                "items": {"type": "array"}
            }),
            ParamKind::UpdateList => json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "range": {"type": "string"},
                        "values": {"type": "array", "items": {"type": "array"}}
                    },
                    "required": ["range", "values"]
                }
            }),
        }
    }
}

/// One declared argument of a tool
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

/// A registered tool: name, description and argument table
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolSpec {
    /// Validate an argument object against the declared table.
    ///
    /// Runs before any handler: a missing required argument or a wrong
    /// primitive type never reaches the facade.
    pub fn validate(&self, args: &Value) -> Result<()> {
        let object: &Map<String, Value> = match args {
            Value::Object(map) => map,
            Value::Null => {
                if let Some(param) = self.params.iter().find(|p| p.required) {
                    return Err(ValidationError::MissingArgument {
                        name: param.name.to_string(),
                    }
                    .into());
                }
                return Ok(());
            }
            _ => {
                return Err(ValidationError::InvalidArgument {
                    name: "arguments".to_string(),
                    message: "expected a JSON object".to_string(),
                }
                .into())
            }
        };

        for param in self.params {
            match object.get(param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ValidationError::MissingArgument {
                            name: param.name.to_string(),
                        }
                        .into());
                    }
                }
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(ValidationError::InvalidArgument {
                            name: param.name.to_string(),
                            message: format!("expected {}", param.kind.describe()),
                        }
                        .into());
                    }
                }
            }
        }

        Ok(())
    }

    /// JSON Schema for the argument object, used by MCP tools/list and the
    /// OpenAPI document
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in self.params {
            let mut schema = param.kind.json_schema();
            schema["description"] = Value::String(param.description.to_string());
            properties.insert(param.name.to_string(), schema);
            if param.required {
                required.push(Value::String(param.name.to_string()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

const fn param(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: true,
        description,
    }
}

const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
        description,
    }
}

/// The fixed operation table
pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "get_sheet_data",
        description: "Get data from a specific sheet in a Google Spreadsheet",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("sheet", ParamKind::String, "The name of the sheet"),
            optional("range", ParamKind::String, "Cell range in A1 notation; whole sheet when omitted"),
        ],
    },
    ToolSpec {
        name: "get_sheet_formulas",
        description: "Get formulas instead of rendered values from a sheet",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("sheet", ParamKind::String, "The name of the sheet"),
            optional("range", ParamKind::String, "Cell range in A1 notation; whole sheet when omitted"),
        ],
    },
    ToolSpec {
        name: "update_cells",
        description: "Overwrite a range of cells with a block of values",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("sheet", ParamKind::String, "The name of the sheet"),
            param("range", ParamKind::String, "Cell range in A1 notation"),
            param("data", ParamKind::Matrix, "2D array of values to write"),
        ],
    },
    ToolSpec {
        name: "batch_update_cells",
        description: "Apply several range updates to one spreadsheet in a single call",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("updates", ParamKind::UpdateList, "List of {range, values} update operations"),
        ],
    },
    ToolSpec {
        name: "add_rows",
        description: "Append rows after the last populated row of a sheet",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("sheet", ParamKind::String, "The name of the sheet"),
            param("rows", ParamKind::Matrix, "Rows of data to append"),
        ],
    },
    ToolSpec {
        name: "list_sheets",
        description: "List the names of all sheets in a spreadsheet",
        params: &[param(
            "spreadsheet_id",
            ParamKind::String,
            "The ID of the spreadsheet",
        )],
    },
    ToolSpec {
        name: "create_sheet",
        description: "Create a new sheet (tab) in a spreadsheet",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("title", ParamKind::String, "Title of the new sheet"),
        ],
    },
    ToolSpec {
        name: "rename_sheet",
        description: "Rename a sheet in a spreadsheet",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("old_name", ParamKind::String, "Current name of the sheet"),
            param("new_name", ParamKind::String, "New name for the sheet"),
        ],
    },
    ToolSpec {
        name: "copy_sheet",
        description: "Copy a sheet from one spreadsheet to another",
        params: &[
            param("src_spreadsheet", ParamKind::String, "Source spreadsheet ID"),
            param("src_sheet", ParamKind::String, "Source sheet name"),
            param("dst_spreadsheet", ParamKind::String, "Destination spreadsheet ID"),
            optional("dst_sheet", ParamKind::String, "Name for the copied sheet"),
        ],
    },
    ToolSpec {
        name: "create_spreadsheet",
        description: "Create a new Google Spreadsheet",
        params: &[
            param("title", ParamKind::String, "Title of the new spreadsheet"),
            optional("folder_id", ParamKind::String, "Drive folder to create the spreadsheet in"),
        ],
    },
    ToolSpec {
        name: "list_spreadsheets",
        description: "List spreadsheets visible to the service account",
        params: &[optional(
            "folder_id",
            ParamKind::String,
            "Drive folder to scope the listing to",
        )],
    },
    ToolSpec {
        name: "share_spreadsheet",
        description: "Share a spreadsheet with a list of email addresses",
        params: &[
            param("spreadsheet_id", ParamKind::String, "The ID of the spreadsheet"),
            param("email_addresses", ParamKind::StringList, "Email addresses to share with"),
            optional("role", ParamKind::String, "Permission role: reader, writer or owner (default reader)"),
            optional("send_notification", ParamKind::Boolean, "Send a notification email (default true)"),
        ],
    },
];

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

/// The registry: the static tool table bound to a client facade
pub struct ToolRegistry {
    client: Arc<SheetsClient>,
}

impl ToolRegistry {
    /// Create a new registry over the given facade
    pub fn new(client: Arc<SheetsClient>) -> Self {
        Self { client }
    }

    /// The full tool table
    pub fn tools(&self) -> &'static [ToolSpec] {
        TOOLS
    }

    /// Validate and invoke a tool by name, returning its normalized result
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        let spec = find_tool(name).ok_or_else(|| ValidationError::UnknownTool {
            name: name.to_string(),
        })?;

        spec.validate(&args)?;

        match name {
            "get_sheet_data" => self.get_sheet_data(args, false).await,
            "get_sheet_formulas" => self.get_sheet_data(args, true).await,
            "update_cells" => self.update_cells(args).await,
            "batch_update_cells" => self.batch_update_cells(args).await,
            "add_rows" => self.add_rows(args).await,
            "list_sheets" => self.list_sheets(args).await,
            "create_sheet" => self.create_sheet(args).await,
            "rename_sheet" => self.rename_sheet(args).await,
            "copy_sheet" => self.copy_sheet(args).await,
            "create_spreadsheet" => self.create_spreadsheet(args).await,
            "list_spreadsheets" => self.list_spreadsheets(args).await,
            "share_spreadsheet" => self.share_spreadsheet(args).await,
            _ => Err(ValidationError::UnknownTool {
                name: name.to_string(),
            }
            .into()),
        }
    }

    // ==================== Handlers ====================

    async fn get_sheet_data(&self, args: Value, formulas: bool) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            sheet: String,
            range: Option<String>,
        }

        let args: Args = serde_json::from_value(args)?;
        let result = if formulas {
            self.client
                .get_sheet_formulas(&args.spreadsheet_id, &args.sheet, args.range.as_deref())
                .await?
        } else {
            self.client
                .get_sheet_data(&args.spreadsheet_id, &args.sheet, args.range.as_deref())
                .await?
        };

        Ok(serde_json::to_value(result)?)
    }

    async fn update_cells(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            sheet: String,
            range: String,
            data: CellMatrix,
        }

        let args: Args = serde_json::from_value(args)?;
        let result = self
            .client
            .update_cells(&args.spreadsheet_id, &args.sheet, &args.range, args.data)
            .await?;

        Ok(serde_json::to_value(result)?)
    }

    async fn batch_update_cells(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            updates: Vec<RangeUpdate>,
        }

        let args: Args = serde_json::from_value(args)?;
        let result = self
            .client
            .batch_update_cells(&args.spreadsheet_id, args.updates)
            .await?;

        Ok(serde_json::to_value(result)?)
    }

    async fn add_rows(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            sheet: String,
            rows: CellMatrix,
        }

        let args: Args = serde_json::from_value(args)?;
        let result = self
            .client
            .add_rows(&args.spreadsheet_id, &args.sheet, args.rows)
            .await?;

        Ok(serde_json::to_value(result)?)
    }

    async fn list_sheets(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
        }

        let args: Args = serde_json::from_value(args)?;
        let sheets = self.client.list_sheets(&args.spreadsheet_id).await?;

        Ok(serde_json::to_value(sheets)?)
    }

    async fn create_sheet(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            title: String,
        }

        let args: Args = serde_json::from_value(args)?;
        let properties = self
            .client
            .create_sheet(&args.spreadsheet_id, &args.title)
            .await?;

        Ok(serde_json::to_value(properties)?)
    }

    async fn rename_sheet(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            old_name: String,
            new_name: String,
        }

        let args: Args = serde_json::from_value(args)?;
        self.client
            .rename_sheet(&args.spreadsheet_id, &args.old_name, &args.new_name)
            .await?;

        Ok(json!({
            "spreadsheet_id": args.spreadsheet_id,
            "sheet": args.new_name,
            "renamed": true
        }))
    }

    async fn copy_sheet(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            src_spreadsheet: String,
            src_sheet: String,
            dst_spreadsheet: String,
            dst_sheet: Option<String>,
        }

        let args: Args = serde_json::from_value(args)?;
        let properties = self
            .client
            .copy_sheet(
                &args.src_spreadsheet,
                &args.src_sheet,
                &args.dst_spreadsheet,
                args.dst_sheet.as_deref(),
            )
            .await?;

        Ok(serde_json::to_value(properties)?)
    }

    async fn create_spreadsheet(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            title: String,
            folder_id: Option<String>,
        }

        let args: Args = serde_json::from_value(args)?;
        let spreadsheet = self
            .client
            .create_spreadsheet(&args.title, args.folder_id.as_deref())
            .await?;

        Ok(serde_json::to_value(spreadsheet)?)
    }

    async fn list_spreadsheets(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize, Default)]
        struct Args {
            folder_id: Option<String>,
        }

        let args: Args = match args {
            Value::Null => Args::default(),
            other => serde_json::from_value(other)?,
        };
        let files = self
            .client
            .list_spreadsheets(args.folder_id.as_deref())
            .await?;

        Ok(serde_json::to_value(files)?)
    }

    async fn share_spreadsheet(&self, args: Value) -> Result<Value> {
        #[derive(Deserialize)]
        struct Args {
            spreadsheet_id: String,
            email_addresses: Vec<String>,
            role: Option<String>,
            send_notification: Option<bool>,
        }

        let args: Args = serde_json::from_value(args)?;
        let result = self
            .client
            .share_spreadsheet(
                &args.spreadsheet_id,
                &args.email_addresses,
                args.role.as_deref().unwrap_or("reader"),
                args.send_notification.unwrap_or(true),
            )
            .await?;

        Ok(serde_json::to_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(name: &str) -> &'static ToolSpec {
        find_tool(name).expect("tool registered")
    }

    #[test]
    fn test_tool_table_names_unique() {
        for (i, tool) in TOOLS.iter().enumerate() {
            assert!(
                TOOLS.iter().skip(i + 1).all(|t| t.name != tool.name),
                "duplicate tool name: {}",
                tool.name
            );
        }
    }

    #[test]
    fn test_unknown_tool_lookup() {
        assert!(find_tool("explode_spreadsheet").is_none());
    }

    #[test]
    fn test_validate_missing_required() {
        let result = spec("get_sheet_data").validate(&json!({"sheet": "Sheet1"}));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("spreadsheet_id"));
    }

    #[test]
    fn test_validate_wrong_type() {
        let result = spec("get_sheet_data").validate(&json!({
            "spreadsheet_id": 42,
            "sheet": "Sheet1"
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("spreadsheet_id"));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn test_validate_optional_may_be_absent() {
        let args = json!({"spreadsheet_id": "abc", "sheet": "Sheet1"});
        assert!(spec("get_sheet_data").validate(&args).is_ok());
    }

    #[test]
    fn test_validate_null_args_without_required_params() {
        assert!(spec("list_spreadsheets").validate(&Value::Null).is_ok());
        assert!(spec("list_sheets").validate(&Value::Null).is_err());
    }

    #[test]
    fn test_validate_matrix() {
        let valid = json!({
            "spreadsheet_id": "abc",
            "sheet": "Sheet1",
            "range": "A1:B2",
            "data": [["a", 1], [true, null]]
        });
        assert!(spec("update_cells").validate(&valid).is_ok());

        let nested = json!({
            "spreadsheet_id": "abc",
            "sheet": "Sheet1",
            "range": "A1",
            "data": [[["nested"]]]
        });
        assert!(spec("update_cells").validate(&nested).is_err());

        let flat = json!({
            "spreadsheet_id": "abc",
            "sheet": "Sheet1",
            "range": "A1",
            "data": ["not", "rows"]
        });
        assert!(spec("update_cells").validate(&flat).is_err());
    }

    #[test]
    fn test_validate_update_list() {
        let valid = json!({
            "spreadsheet_id": "abc",
            "updates": [
                {"range": "'Sheet1'!A1:B2", "values": [[1, 2]]},
                {"range": "'Sheet1'!D4", "values": [["x"]]}
            ]
        });
        assert!(spec("batch_update_cells").validate(&valid).is_ok());

        let empty = json!({"spreadsheet_id": "abc", "updates": []});
        assert!(spec("batch_update_cells").validate(&empty).is_ok());

        let missing_values = json!({
            "spreadsheet_id": "abc",
            "updates": [{"range": "A1"}]
        });
        assert!(spec("batch_update_cells").validate(&missing_values).is_err());
    }

    #[test]
    fn test_validate_string_list() {
        let valid = json!({
            "spreadsheet_id": "abc",
            "email_addresses": ["a@example.com", "b@example.com"]
        });
        assert!(spec("share_spreadsheet").validate(&valid).is_ok());

        let mixed = json!({
            "spreadsheet_id": "abc",
            "email_addresses": ["a@example.com", 7]
        });
        assert!(spec("share_spreadsheet").validate(&mixed).is_err());
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = spec("update_cells").input_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["data"].is_object());

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, ["spreadsheet_id", "sheet", "range", "data"]);
    }

    #[test]
    fn test_input_schema_optional_excluded_from_required() {
        let schema = spec("create_spreadsheet").input_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0], "title");
        assert!(schema["properties"]["folder_id"].is_object());
    }
}
