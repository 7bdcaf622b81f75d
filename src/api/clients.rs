//! Client roster API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Client, ClientForm};
use crate::validation;
use crate::AppState;

/// GET /api/clients - List the whole roster.
pub async fn list_clients(State(state): State<AppState>) -> ApiResult<Vec<Client>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_clients().await {
        Ok(clients) => success(clients, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/clients/:id - Get a single client.
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Client> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_client(&id).await {
        Ok(Some(client)) => success(client, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Client {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/clients - Register a new client.
pub async fn create_client(
    State(state): State<AppState>,
    Json(form): Json<ClientForm>,
) -> ApiResult<Client> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let client = match validation::validate(&form, None) {
        Ok(client) => client,
        Err(errors) => return error(AppError::Validation(errors), revision_id),
    };

    match state.repo.upsert_client(&client).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(client, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/clients/:id - Edit an existing client. The stored record is
/// replaced whole; its id and registration timestamp are preserved.
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ClientForm>,
) -> ApiResult<Client> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let existing = match state.repo.get_client(&id).await {
        Ok(Some(client)) => client,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Client {} not found", id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };

    let client = match validation::validate(&form, Some(&existing)) {
        Ok(client) => client,
        Err(errors) => return error(AppError::Validation(errors), revision_id),
    };

    match state.repo.upsert_client(&client).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(client, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/clients/:id - Delete a client.
pub async fn delete_client(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.delete_client(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
