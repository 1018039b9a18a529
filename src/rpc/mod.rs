//! RPC channel from the served page back into the host process.
//!
//! Calls arrive as `/call/[<secret>/]<function>/<timeoutSeconds>[/...]`. The
//! dispatcher validates the path, runs the function through a [`FunctionTable`]
//! and answers with the returned mapping as indented JSON.

pub mod functions;
pub mod store;

pub use functions::{BuiltinFunctions, CallError, FunctionTable};
pub use store::JsonStore;

use crate::error::RequestError;
use crate::keepalive::KeepaliveHandle;
use crate::session::ServerContext;
use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

pub type JsonMap = serde_json::Map<String, Value>;

/// Functions polled continuously by the page; kept out of verbose call logging.
const QUIET_FUNCTIONS: &[&str] = &["keepalive", "check_wait_status"];

/// A parsed call path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    pub function: String,
    pub timeout_secs: u64,
}

/// Parses `<function>/<timeoutSeconds>[/...]`. Trailing segments are ignored.
pub fn parse_call_path(rest: &str) -> Result<CallTarget, RequestError> {
    let mut parts = rest.split('/');
    let function = parts.next().unwrap_or_default().to_string();
    let raw_timeout = parts.next().ok_or_else(|| RequestError::MalformedRequest {
        reason: format!("missing timeout in \"{}\"", rest),
    })?;
    let timeout_secs = raw_timeout
        .parse::<u64>()
        .map_err(|_| RequestError::MalformedRequest {
            reason: format!("timeout \"{}\" is not a non-negative integer", raw_timeout),
        })?;
    Ok(CallTarget {
        function,
        timeout_secs,
    })
}

/// Handles one call. Any completed call, successful or not, counts as client liveness.
pub async fn dispatch(
    functions: &dyn FunctionTable,
    context: &ServerContext,
    keepalive: &KeepaliveHandle,
    rest: &str,
    body: Body,
) -> Result<Response, RequestError> {
    let target = parse_call_path(rest)?;
    if context.session.verbose && !QUIET_FUNCTIONS.contains(&target.function.as_str()) {
        info!(
            "functionName \"{}\", timeout {}",
            target.function, target.timeout_secs
        );
    }

    let result = functions
        .call(&target.function, target.timeout_secs, body, context)
        .await;
    keepalive.tickle();

    let map = result.map_err(|e| {
        error!("{}", e);
        RequestError::CallFailed {
            function: target.function.clone(),
            message: e.to_string(),
        }
    })?;

    let json = to_indented_json(&map).map_err(|e| {
        error!("Failed to serialize {} response: {}", target.function, e);
        RequestError::RenderFailure {
            message: e.to_string(),
        }
    })?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json,
    )
        .into_response())
}

/// Serializes `map` with one space of indentation per level.
pub fn to_indented_json(map: &JsonMap) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    map.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
#[path = "tests/rpc_tests.rs"]
mod tests;
