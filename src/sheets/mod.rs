//! Remote spreadsheet sync session.
//!
//! One named spreadsheet resource, reached over HTTP and authorized by a
//! query-string credential. Sync is a full replace: clear the target range,
//! then write header plus all rows. There is no retry, no queueing and no
//! cancellation; each call is a single explicit attempt.

use serde::Serialize;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::export;
use crate::models::Client;

/// Credential and resource for an established session.
#[derive(Debug, Clone)]
struct Session {
    api_key: String,
    sheet_id: String,
    url: String,
}

/// Session lifecycle. `Connecting` and `Syncing` mark an attempt in flight;
/// a second call while one is running is rejected rather than queued.
#[derive(Debug)]
enum SessionState {
    Disconnected,
    Connecting,
    Connected(Session),
    Syncing(Session),
}

/// Connection status as reported to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsStatus {
    pub connected: bool,
    pub syncing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_url: Option<String>,
}

/// Sync session against the remote spreadsheet endpoint.
pub struct SheetsSync {
    http: reqwest::Client,
    api_base: String,
    view_base: String,
    state: RwLock<SessionState>,
}

impl SheetsSync {
    pub fn new(api_base: String, view_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            view_base,
            state: RwLock::new(SessionState::Disconnected),
        }
    }

    /// Current status snapshot.
    pub async fn status(&self) -> SheetsStatus {
        let state = self.state.read().await;
        match &*state {
            SessionState::Disconnected | SessionState::Connecting => SheetsStatus {
                connected: false,
                syncing: false,
                sheet_url: None,
            },
            SessionState::Connected(session) => SheetsStatus {
                connected: true,
                syncing: false,
                sheet_url: Some(session.url.clone()),
            },
            SessionState::Syncing(session) => SheetsStatus {
                connected: true,
                syncing: true,
                sheet_url: Some(session.url.clone()),
            },
        }
    }

    /// Probe the spreadsheet read-only and establish a session.
    ///
    /// On any non-success response or transport failure the session remains
    /// `Disconnected`. Returns the display URL of the connected sheet.
    pub async fn connect(&self, api_key: String, sheet_id: String) -> Result<String, AppError> {
        {
            let mut state = self.state.write().await;
            match &*state {
                SessionState::Connecting | SessionState::Syncing(_) => {
                    return Err(AppError::SyncInFlight);
                }
                _ => *state = SessionState::Connecting,
            }
        }

        let probe_url = format!("{}/{}?key={}", self.api_base, sheet_id, api_key);
        let result = self.http.get(&probe_url).send().await;

        let mut state = self.state.write().await;
        match result {
            Ok(response) if response.status().is_success() => {
                let url = format!("{}/{}", self.view_base, sheet_id);
                tracing::info!("Connected to spreadsheet {}", sheet_id);
                *state = SessionState::Connected(Session {
                    api_key,
                    sheet_id,
                    url: url.clone(),
                });
                Ok(url)
            }
            Ok(response) => {
                tracing::warn!(
                    "Spreadsheet probe failed with status {}",
                    response.status()
                );
                *state = SessionState::Disconnected;
                Err(AppError::SheetsConnection(
                    "Erro ao conectar com Google Sheets. Verifique suas credenciais.".to_string(),
                ))
            }
            Err(err) => {
                tracing::warn!("Spreadsheet probe transport failure: {:?}", err);
                *state = SessionState::Disconnected;
                Err(AppError::SheetsConnection(
                    "Erro ao conectar com Google Sheets. Verifique suas credenciais.".to_string(),
                ))
            }
        }
    }

    /// Full-replace sync of the roster into the connected sheet.
    ///
    /// Only callable from `Connected`; a call while `Disconnected` is
    /// rejected before any network traffic. Returns the number of records
    /// written. After a partial failure the remote range may be cleared but
    /// not rewritten; the session itself returns to `Connected`.
    pub async fn sync(&self, clients: &[Client]) -> Result<usize, AppError> {
        let session = {
            let mut state = self.state.write().await;
            match &*state {
                SessionState::Disconnected => {
                    return Err(AppError::NotConnected(
                        "Conecte-se ao Google Sheets primeiro.".to_string(),
                    ));
                }
                SessionState::Connecting | SessionState::Syncing(_) => {
                    return Err(AppError::SyncInFlight);
                }
                SessionState::Connected(session) => {
                    let session = session.clone();
                    *state = SessionState::Syncing(session.clone());
                    session
                }
            }
        };

        let result = self.replace_all(&session, clients).await;

        // The session survives a failed attempt; only disconnect() ends it.
        {
            let mut state = self.state.write().await;
            if matches!(&*state, SessionState::Syncing(_)) {
                *state = SessionState::Connected(session);
            }
        }

        result.map(|_| {
            tracing::info!("Synced {} clients to spreadsheet", clients.len());
            clients.len()
        })
    }

    /// Discard the session. Always succeeds.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        *state = SessionState::Disconnected;
        tracing::info!("Disconnected from spreadsheet");
    }

    /// Clear the target range, then append header and rows.
    async fn replace_all(&self, session: &Session, clients: &[Client]) -> Result<(), AppError> {
        let clear_url = format!(
            "{}/{}/values/A:Z:clear?key={}",
            self.api_base, session.sheet_id, session.api_key
        );

        let cleared = self
            .http
            .post(&clear_url)
            .header("Content-Type", "application/json")
            .send()
            .await;

        match cleared {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!("Sheet clear failed with status {}", response.status());
                return Err(AppError::SheetsSync(
                    "Erro ao limpar dados existentes".to_string(),
                ));
            }
            Err(err) => {
                tracing::warn!("Sheet clear transport failure: {:?}", err);
                return Err(AppError::SheetsSync(
                    "Erro ao limpar dados existentes".to_string(),
                ));
            }
        }

        let append_url = format!(
            "{}/{}/values/A1:append?valueInputOption=RAW&key={}",
            self.api_base, session.sheet_id, session.api_key
        );

        let body = serde_json::json!({ "values": export::sheet_values(clients) });

        let appended = self.http.post(&append_url).json(&body).send().await;

        match appended {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => {
                // The range was already cleared; remote state is undefined.
                tracing::warn!("Sheet append failed with status {}", response.status());
                Err(AppError::SheetsSync("Erro ao enviar dados".to_string()))
            }
            Err(err) => {
                tracing::warn!("Sheet append transport failure: {:?}", err);
                Err(AppError::SheetsSync("Erro ao enviar dados".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_service() -> SheetsSync {
        SheetsSync::new(
            "http://127.0.0.1:1/v4/spreadsheets".to_string(),
            "https://docs.google.com/spreadsheets/d".to_string(),
        )
    }

    #[tokio::test]
    async fn test_initial_state_is_disconnected() {
        let sheets = sync_service();
        let status = sheets.status().await;
        assert!(!status.connected);
        assert!(!status.syncing);
        assert!(status.sheet_url.is_none());
    }

    #[tokio::test]
    async fn test_sync_while_disconnected_is_rejected() {
        let sheets = sync_service();
        let err = sheets.sync(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::NotConnected(_)));
    }

    #[tokio::test]
    async fn test_connect_failure_returns_to_disconnected() {
        // Port 1 refuses connections, so the probe fails at transport level
        let sheets = sync_service();
        let err = sheets
            .connect("key".to_string(), "sheet-1".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SheetsConnection(_)));
        assert!(!sheets.status().await.connected);
    }

    #[tokio::test]
    async fn test_disconnect_always_succeeds() {
        let sheets = sync_service();
        sheets.disconnect().await;
        assert!(!sheets.status().await.connected);
    }
}
