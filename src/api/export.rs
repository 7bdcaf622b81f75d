//! Roster export endpoints.
//!
//! These return file payloads rather than the JSON envelope. Exporting an
//! empty roster is not an error here; pre-empting it with a notice is the
//! UI's policy.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::errors::AppErrorWithRevision;
use crate::export::{self, ExportFormat};
use crate::AppState;

/// GET /api/clients/export/csv - Download the roster as CSV.
pub async fn export_csv(State(state): State<AppState>) -> Response {
    export_payload(state, ExportFormat::Csv).await
}

/// GET /api/clients/export/xlsx - Download the roster as an XLSX workbook.
pub async fn export_xlsx(State(state): State<AppState>) -> Response {
    export_payload(state, ExportFormat::SpreadsheetBinary).await
}

async fn export_payload(state: AppState, format: ExportFormat) -> Response {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let clients = match state.repo.list_clients().await {
        Ok(clients) => clients,
        Err(error) => {
            return AppErrorWithRevision { error, revision_id }.into_response();
        }
    };

    match export::export_rows(&clients, format) {
        Ok(payload) => (
            [
                (header::CONTENT_TYPE, payload.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", payload.filename),
                ),
            ],
            payload.bytes,
        )
            .into_response(),
        Err(error) => AppErrorWithRevision { error, revision_id }.into_response(),
    }
}
