//! Database repository for roster CRUD operations.
//!
//! Uses prepared statements; records are replaced whole (last-write-wins).

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{Client, Datastore, RevisionInfo};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the full datastore snapshot.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let clients = self.list_clients().await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            clients,
        })
    }

    // ==================== CLIENT OPERATIONS ====================

    /// List the whole roster, oldest registration first.
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, parent_name, instagram, tiktok, phone_number, whatsapp_number, notes, created_at FROM clients ORDER BY created_at, id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| client_from_row(&row)).collect())
    }

    /// Get a client by ID.
    pub async fn get_client(&self, id: &str) -> Result<Option<Client>, AppError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, parent_name, instagram, tiktok, phone_number, whatsapp_number, notes, created_at FROM clients WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(client_from_row))
    }

    /// Insert or replace a client record. The record arrives fully validated;
    /// the store never applies partial-field updates.
    pub async fn upsert_client(&self, client: &Client) -> Result<(), AppError> {
        sqlx::query(
            "INSERT OR REPLACE INTO clients (id, first_name, last_name, parent_name, instagram, tiktok, phone_number, whatsapp_number, notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&client.id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.parent_name)
        .bind(&client.instagram)
        .bind(&client.tiktok)
        .bind(&client.phone_number)
        .bind(&client.whatsapp_number)
        .bind(&client.notes)
        .bind(&client.created_at)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;
        Ok(())
    }

    /// Delete a client.
    pub async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Client {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }
}

fn client_from_row(row: &sqlx::sqlite::SqliteRow) -> Client {
    Client {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        parent_name: row.get("parent_name"),
        instagram: row.get("instagram"),
        tiktok: row.get("tiktok"),
        phone_number: row.get("phone_number"),
        whatsapp_number: row.get("whatsapp_number"),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}
