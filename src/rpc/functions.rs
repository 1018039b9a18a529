//! Host functions callable from the served page.

use super::store::JsonStore;
use super::JsonMap;
use crate::keepalive::ExitRequest;
use crate::session::ServerContext;
use crate::BUILD_SHA;
use async_trait::async_trait;
use axum::body::Body;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// Upper bound on an RPC request body.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Delay between answering `exit` and requesting shutdown, so the reply is flushed.
const EXIT_DELAY: Duration = Duration::from_millis(100);

/// Errors returned by a function table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    UnknownFunction { name: String },
    InvalidBody { message: String },
    MissingField { field: String },
    BodyTimeout { seconds: u64 },
    Store { message: String },
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::UnknownFunction { name } => write!(f, "Unknown function: {}", name),
            CallError::InvalidBody { message } => write!(f, "Invalid request body: {}", message),
            CallError::MissingField { field } => write!(f, "Missing field: {}", field),
            CallError::BodyTimeout { seconds } => {
                write!(f, "Request body not received within {}s", seconds)
            }
            CallError::Store { message } => write!(f, "Store error: {}", message),
        }
    }
}

impl std::error::Error for CallError {}

/// A table of named functions reachable through `/call/...`.
#[async_trait]
pub trait FunctionTable: Send + Sync {
    /// Runs `name`. `timeout_secs` bounds how long the call may wait on the client.
    async fn call(
        &self,
        name: &str,
        timeout_secs: u64,
        body: Body,
        context: &ServerContext,
    ) -> Result<JsonMap, CallError>;
}

/// The functions shipped with slfsrv.
#[derive(Debug)]
pub struct BuiltinFunctions {
    store: JsonStore,
}

impl BuiltinFunctions {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    async fn store_get(&self, body: Value) -> Result<JsonMap, CallError> {
        let key = required_str(&body, "key")?;
        let value = self.store.get(key).await.unwrap_or(Value::Null);
        Ok(object(json!({ "key": key, "value": value })))
    }

    async fn store_set(&self, body: Value) -> Result<JsonMap, CallError> {
        let key = required_str(&body, "key")?;
        let value = body.get("value").cloned().ok_or_else(|| CallError::MissingField {
            field: "value".to_string(),
        })?;
        self.store
            .set(key, value)
            .await
            .map_err(|e| CallError::Store {
                message: format!("{:#}", e),
            })?;
        Ok(object(json!({ "ok": true })))
    }
}

#[async_trait]
impl FunctionTable for BuiltinFunctions {
    async fn call(
        &self,
        name: &str,
        timeout_secs: u64,
        body: Body,
        context: &ServerContext,
    ) -> Result<JsonMap, CallError> {
        match name {
            "keepalive" => Ok(object(json!({ "alive": true }))),
            "check_wait_status" => Ok(object(json!({
                "waiting": false,
                "keepalive_seconds": context.keep_alive.as_secs(),
                "uptime_ms": u64::try_from(context.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            }))),
            "info" => Ok(object(json!({
                "os": std::env::consts::OS,
                "port": context.port,
                "root_path": context.session.root_path.to_string_lossy(),
                "init_file": context.session.init_file,
                "self": context.executable.to_string_lossy(),
                "version": format!("{} ({})", env!("CARGO_PKG_VERSION"), BUILD_SHA),
                "started_at": context.started_at.to_rfc3339(),
            }))),
            "store_get" => self.store_get(read_body(body, timeout_secs).await?).await,
            "store_set" => self.store_set(read_body(body, timeout_secs).await?).await,
            "store_keys" => Ok(object(json!({ "keys": self.store.keys().await }))),
            "exit" => {
                let body = read_body(body, timeout_secs).await?;
                let code = body
                    .get("code")
                    .and_then(Value::as_i64)
                    .and_then(|code| i32::try_from(code).ok())
                    .unwrap_or(0);
                let exit = context.exit.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(EXIT_DELAY).await;
                    let _ = exit.send(ExitRequest::Requested { code });
                });
                Ok(object(json!({ "ok": true })))
            }
            _ => Err(CallError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }
}

/// Reads a JSON request body. An empty body reads as `{}`.
async fn read_body(body: Body, timeout_secs: u64) -> Result<Value, CallError> {
    let read = axum::body::to_bytes(body, MAX_BODY_BYTES);
    let bytes = if timeout_secs > 0 {
        tokio::time::timeout(Duration::from_secs(timeout_secs), read)
            .await
            .map_err(|_| CallError::BodyTimeout {
                seconds: timeout_secs,
            })?
    } else {
        read.await
    }
    .map_err(|e| CallError::InvalidBody {
        message: e.to_string(),
    })?;

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(JsonMap::new()));
    }
    serde_json::from_slice(&bytes).map_err(|e| CallError::InvalidBody {
        message: e.to_string(),
    })
}

fn required_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, CallError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CallError::MissingField {
            field: field.to_string(),
        })
}

fn object(value: Value) -> JsonMap {
    match value {
        Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

#[cfg(test)]
#[path = "tests/functions_tests.rs"]
mod tests;
