use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One requested availability change. Field names follow the storefront's
/// admin panel, which posts Portuguese keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeItem {
    #[serde(rename = "id")]
    pub product_id: i64,
    /// Spreadsheet row of the product. Row 1 is the header.
    #[serde(rename = "linha")]
    pub row: u32,
    #[serde(rename = "disponivel")]
    pub available: bool,
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub const FIRST_DATA_ROW: u32 = 2;

/// A validated batch, with the target spreadsheet already resolved.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub changes: Vec<ChangeItem>,
    pub spreadsheet_id: String,
}

/// Per-item result, one for each `ChangeItem` in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    #[serde(rename = "sucesso")]
    pub success: bool,
    #[serde(rename = "id")]
    pub product_id: i64,
    #[serde(rename = "disponivel", default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(rename = "erro", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw reply of the update script on success.
    #[serde(rename = "resultado", default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<Value>,
}

impl ItemOutcome {
    pub fn succeeded(item: &ChangeItem, reply: Value) -> Self {
        Self {
            success: true,
            product_id: item.product_id,
            available: Some(item.available),
            error: None,
            reply: Some(reply),
        }
    }

    pub fn failed(product_id: i64, error: impl Into<String>) -> Self {
        Self {
            success: false,
            product_id,
            available: None,
            error: Some(error.into()),
            reply: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(rename = "sucesso")]
    pub success_count: usize,
    #[serde(rename = "erros")]
    pub error_count: usize,
    pub total: usize,
    pub message: String,
    #[serde(rename = "detalhes")]
    pub details: Vec<ItemOutcome>,
    /// Failed outcomes only; omitted when everything succeeded.
    #[serde(rename = "detalhesErros", default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemOutcome>,
    pub timestamp: String,
}

impl BatchResponse {
    pub fn from_outcomes(details: Vec<ItemOutcome>) -> Self {
        let total = details.len();
        let failures: Vec<ItemOutcome> = details.iter().filter(|o| !o.success).cloned().collect();
        let error_count = failures.len();
        let success_count = total - error_count;

        let message = if error_count == 0 {
            format!("{success_count} products updated successfully")
        } else {
            format!("{success_count} products updated, {error_count} failed")
        };

        Self {
            success_count,
            error_count,
            total,
            message,
            details,
            failures,
            timestamp: super::iso_timestamp(),
        }
    }
}

// ── Outbound script contract ──────────────────────────────────────────────────

/// Body of one `updateCell` call to the update script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdate {
    pub action: &'static str,
    pub spreadsheet_id: String,
    pub range: String,
    pub value: &'static str,
}

impl CellUpdate {
    pub fn for_item(item: &ChangeItem, spreadsheet_id: &str, sheet: &str, column: &str) -> Self {
        Self {
            action: "updateCell",
            spreadsheet_id: spreadsheet_id.to_string(),
            range: cell_range(sheet, column, item.row),
            value: cell_value(item.available),
        }
    }
}

pub fn cell_range(sheet: &str, column: &str, row: u32) -> String {
    format!("{sheet}!{column}{row}")
}

/// Sheets stores checkbox state as the literal strings `TRUE` / `FALSE`.
pub fn cell_value(available: bool) -> &'static str {
    if available {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Reply of the update script. Apps Script code is loosely typed, so
/// `success` is judged by truthiness rather than requiring a JSON bool.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptReply {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub error: Value,
}

impl ScriptReply {
    pub fn is_success(&self) -> bool {
        is_truthy(&self.success)
    }

    /// The script's own error text, if it sent a usable one.
    pub fn error_message(&self) -> Option<String> {
        match &self.error {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            other if is_truthy(other) => Some(other.to_string()),
            _ => None,
        }
    }
}

/// `false`, `null`, `0` and `""` are falsy; everything else is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
