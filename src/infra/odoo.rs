use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::BackendCredentials;
use crate::error::{AppError, AppResult};
use crate::services::{HelpdeskRecord, IssueTrackerService, SessionUid};

const HELPDESK_MODEL: &str = "helpdesk.ticket";
const LOGIN_REQUEST_ID: u32 = 1;
const CREATE_REQUEST_ID: u32 = 2;

/// Odoo helpdesk over the external JSON-RPC endpoint.
pub struct OdooClient {
    http: Client,
}

impl OdooClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    fn rpc_endpoint(base_url: &str) -> String {
        format!("{}/jsonrpc", base_url.trim_end_matches('/'))
    }

    async fn call(&self, base_url: &str, request: &JsonRpcRequest) -> AppResult<JsonRpcResponse> {
        let response = self
            .http
            .post(Self::rpc_endpoint(base_url))
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Odoo: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::IssueTracker(format!(
                "Odoo responded with {status}: {body}"
            )));
        }

        let payload: JsonRpcResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Odoo response: {err}"))
        })?;

        if let Some(error) = &payload.error {
            return Err(AppError::IssueTracker(format!(
                "Odoo returned an error: {}",
                error.describe()
            )));
        }

        Ok(payload)
    }
}

impl Default for OdooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IssueTrackerService for OdooClient {
    async fn authenticate(&self, credentials: &BackendCredentials) -> AppResult<SessionUid> {
        let request = JsonRpcRequest::login(credentials);
        debug!(db = %credentials.db, user = %credentials.username, "authenticating with Odoo");

        let payload = self.call(&credentials.url, &request).await?;
        let uid = record_id(&payload.result).ok_or_else(|| {
            AppError::IssueTracker("authentication failed, uid is empty".to_string())
        })?;

        info!(uid, "authenticated with Odoo");
        Ok(SessionUid(uid))
    }

    async fn create_ticket(
        &self,
        credentials: &BackendCredentials,
        uid: SessionUid,
        record: &HelpdeskRecord,
    ) -> AppResult<u64> {
        let request = JsonRpcRequest::create(credentials, uid, record);
        let payload = self.call(&credentials.url, &request).await?;

        let id = record_id(&payload.result).ok_or_else(|| {
            AppError::IssueTracker(format!(
                "no ticket id returned; raw response: {}",
                payload.raw()
            ))
        })?;

        info!(id, "created helpdesk ticket");
        Ok(id)
    }
}

/// Accepts a bare id or a one-element id list; `false`, `0` and `null` are empty.
fn record_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().filter(|id| *id > 0),
        Value::Array(items) => items.first().and_then(record_id),
        _ => None,
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: JsonRpcParams,
    id: u32,
}

#[derive(Serialize)]
struct JsonRpcParams {
    service: &'static str,
    method: &'static str,
    args: Value,
}

impl JsonRpcRequest {
    fn new(service: &'static str, method: &'static str, args: Value, id: u32) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params: JsonRpcParams {
                service,
                method,
                args,
            },
            id,
        }
    }

    fn login(credentials: &BackendCredentials) -> Self {
        Self::new(
            "common",
            "login",
            json!([credentials.db, credentials.username, credentials.password]),
            LOGIN_REQUEST_ID,
        )
    }

    fn create(credentials: &BackendCredentials, uid: SessionUid, record: &HelpdeskRecord) -> Self {
        Self::new(
            "object",
            "execute_kw",
            json!([
                credentials.db,
                uid.0,
                credentials.password,
                HELPDESK_MODEL,
                "create",
                [record],
            ]),
            CREATE_REQUEST_ID,
        )
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn raw(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct JsonRpcError {
    #[serde(default)]
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<JsonRpcErrorData>,
}

#[derive(Debug, Deserialize, Serialize)]
struct JsonRpcErrorData {
    #[serde(default)]
    message: Option<String>,
}

impl JsonRpcError {
    fn describe(&self) -> String {
        match self.data.as_ref().and_then(|data| data.message.as_deref()) {
            Some(detail) if !detail.is_empty() => format!("{} ({detail})", self.message),
            _ => self.message.clone(),
        }
    }
}
