//! Spreadsheet sync API endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::sheets::SheetsStatus;
use crate::AppState;

/// Request body for connecting to a spreadsheet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectSheetRequest {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub sheet_id: String,
}

/// Response for a successful connect.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectSheetResponse {
    pub sheet_url: String,
}

/// Response for a completed sync.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSheetResponse {
    pub synced_count: usize,
}

/// GET /api/sheets/status - Current sync session status.
pub async fn sheets_status(State(state): State<AppState>) -> ApiResult<SheetsStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(state.sheets.status().await, revision_id)
}

/// POST /api/sheets/connect - Probe the spreadsheet and establish a session.
pub async fn sheets_connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectSheetRequest>,
) -> ApiResult<ConnectSheetResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.api_key.is_empty() || request.sheet_id.is_empty() {
        return error(
            AppError::BadRequest(
                "Por favor, configure a API Key e o ID da planilha primeiro.".to_string(),
            ),
            revision_id,
        );
    }

    match state.sheets.connect(request.api_key, request.sheet_id).await {
        Ok(sheet_url) => success(ConnectSheetResponse { sheet_url }, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/sheets/sync - Full-replace sync of the roster.
///
/// An empty roster is rejected here, before the state machine: the sync
/// itself is total, the guard is product policy.
pub async fn sheets_sync(State(state): State<AppState>) -> ApiResult<SyncSheetResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let clients = match state.repo.list_clients().await {
        Ok(clients) => clients,
        Err(e) => return error(e, revision_id),
    };

    if clients.is_empty() {
        return error(
            AppError::BadRequest("Não há dados para sincronizar.".to_string()),
            revision_id,
        );
    }

    match state.sheets.sync(&clients).await {
        Ok(synced_count) => success(SyncSheetResponse { synced_count }, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/sheets/disconnect - Discard the sync session.
pub async fn sheets_disconnect(State(state): State<AppState>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    state.sheets.disconnect().await;
    success((), revision_id)
}
