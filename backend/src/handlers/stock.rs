use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{iso_timestamp, BatchRequest, BatchResponse, ChangeItem, FIRST_DATA_ROW},
    updater, AppState, STOCK_ENDPOINT,
};

// ── GET /api/admin/atualizar-estoque ─────────────────────────────────────────

pub async fn stock_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "message": "Stock update API is running",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoint": STOCK_ENDPOINT,
            "timestamp": iso_timestamp(),
            "scriptConfigured": state.config.script_configured(),
        })),
    )
}

// ── POST /api/admin/atualizar-estoque ────────────────────────────────────────

pub async fn update_stock(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<BatchResponse>> {
    let body: Value = serde_json::from_slice(&body)?;
    let batch = parse_batch(&body, &state.config.default_spreadsheet_id)?;

    let Some(client) = state.sheets.as_ref() else {
        return Err(AppError::ScriptNotConfigured);
    };

    info!(
        changes = batch.changes.len(),
        spreadsheet_id = %batch.spreadsheet_id,
        "Received stock update batch"
    );

    Ok(Json(updater::apply_batch(client, &state.layout, batch).await))
}

/// Validates the raw body into a batch. Any error here means nothing is sent.
fn parse_batch(body: &Value, default_spreadsheet_id: &str) -> AppResult<BatchRequest> {
    let raw_changes = match body.get("alteracoes") {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(AppError::BadRequest(
                "invalid payload: alteracoes must be an array".to_string(),
            ))
        }
    };

    if raw_changes.is_empty() {
        return Err(AppError::BadRequest("no changes provided".to_string()));
    }

    let mut changes = Vec::with_capacity(raw_changes.len());
    for (index, raw) in raw_changes.iter().enumerate() {
        let item: ChangeItem = serde_json::from_value(raw.clone())
            .map_err(|e| AppError::BadRequest(format!("alteracoes[{index}]: {e}")))?;
        if item.row < FIRST_DATA_ROW {
            return Err(AppError::BadRequest(format!(
                "alteracoes[{index}]: linha must be >= {FIRST_DATA_ROW}, got {}",
                item.row
            )));
        }
        changes.push(item);
    }

    let spreadsheet_id = match body.get("spreadsheetId") {
        None | Some(Value::Null) => default_spreadsheet_id.to_string(),
        Some(Value::String(id)) if id.trim().is_empty() => default_spreadsheet_id.to_string(),
        Some(Value::String(id)) => id.trim().to_string(),
        Some(_) => {
            return Err(AppError::BadRequest(
                "invalid payload: spreadsheetId must be a string".to_string(),
            ))
        }
    };

    Ok(BatchRequest {
        changes,
        spreadsheet_id,
    })
}
