//! Secret gate: classifies each request path before any handler runs.

use super::{bootstrap, AppState};
use crate::content::{self, mime, Resolved};
use crate::error::RequestError;
use crate::rpc;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;

pub const CALL_PREFIX: &str = "call";
pub const BOOTSTRAP_SCRIPT: &str = "slfsrv-core.js";

/// Characters escaped when a decoded path is written back into a `Location` header.
const LOCATION: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Where a request path is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// RPC call; holds `<function>/<timeout>[/...]`.
    Call(&'a str),
    Bootstrap,
    /// Raw content; holds the logical path without a leading `/`.
    Content(&'a str),
    /// The bare secret prefix, missing its trailing slash.
    SecretRoot,
    Rejected,
}

/// Classifies a decoded request path. `secret` is the token required as the
/// first segment, or `None` when routes carry no token.
pub fn classify<'a>(path: &'a str, secret: Option<&str>) -> Route<'a> {
    let Some(path) = path.strip_prefix('/') else {
        return Route::Rejected;
    };

    if let Some(call) = path.strip_prefix(CALL_PREFIX).and_then(|p| p.strip_prefix('/')) {
        return match secret {
            Some(secret) => match call.strip_prefix(secret).and_then(|p| p.strip_prefix('/')) {
                Some(rest) => Route::Call(rest),
                None => Route::Rejected,
            },
            None => Route::Call(call),
        };
    }

    let logical = match secret {
        Some(secret) => match path.strip_prefix(secret) {
            Some("") => return Route::SecretRoot,
            Some(rest) => match rest.strip_prefix('/') {
                Some(logical) => logical,
                None => return Route::Rejected,
            },
            None => return Route::Rejected,
        },
        None => path,
    };

    if logical == BOOTSTRAP_SCRIPT {
        Route::Bootstrap
    } else {
        Route::Content(logical)
    }
}

/// Fallback handler behind every path except the favicon.
pub async fn handle(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let session = &state.context.session;
    let path = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .into_owned();

    match classify(&path, session.path_secret()) {
        Route::Call(rest) => {
            let rest = rest.to_string();
            rpc::dispatch(
                state.functions.as_ref(),
                &state.context,
                &state.keepalive,
                &rest,
                request.into_body(),
            )
            .await
            .unwrap_or_else(IntoResponse::into_response)
        }
        Route::Bootstrap => (
            [(header::CONTENT_TYPE, mime::JAVASCRIPT)],
            bootstrap::render(&state.context),
        )
            .into_response(),
        Route::SecretRoot => redirect(&format!("{}/", path), request.uri().query()),
        Route::Content(logical) => {
            let logical = logical.to_string();
            serve_content(&state, &logical, &path, request).await
        }
        Route::Rejected => {
            let err = RequestError::NotMatched { path: path.clone() };
            if session.verbose {
                info!("{}", err);
            }
            err.into_response()
        }
    }
}

async fn serve_content(
    state: &AppState,
    logical: &str,
    request_path: &str,
    mut request: Request,
) -> Response {
    let session = &state.context.session;
    let resolved =
        match content::resolve(&session.content, logical, request_path, session.verbose).await {
            Ok(resolved) => resolved,
            Err(err) => return err.into_response(),
        };
    let download = wants_download(request.uri().query());

    match resolved {
        Resolved::Bytes { body, mime } => {
            let mut response = Response::new(Body::from(body));
            set_content_type(&mut response, mime);
            if download {
                let name = content::ArchiveIndex::entry_name(logical);
                set_attachment(&mut response, file_name(&name));
            }
            response
        }
        Resolved::File { path, mime } => {
            // ServeFile answers 405 to anything but GET and HEAD.
            if request.method() != Method::HEAD {
                *request.method_mut() = Method::GET;
            }
            let mut response = match ServeFile::new(&path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            };
            // 304 and 416 replies carry no entity, so their headers are left alone.
            if response.status().is_success() {
                set_content_type(&mut response, mime);
                if download {
                    set_attachment(&mut response, path_file_name(&path));
                }
            }
            response
        }
        Resolved::Redirect { location } => redirect(&location, request.uri().query()),
        Resolved::Listing { html } => {
            ([(header::CONTENT_TYPE, mime::HTML)], html).into_response()
        }
    }
}

fn redirect(location: &str, query: Option<&str>) -> Response {
    let mut target = utf8_percent_encode(location, LOCATION).to_string();
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    match HeaderValue::from_str(&target) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => RequestError::MalformedRequest {
            reason: format!("unencodable redirect target {}", location),
        }
        .into_response(),
    }
}

/// True when the query string carries a `dl` key.
fn wants_download(query: Option<&str>) -> bool {
    query
        .map(|q| q.split('&').any(|pair| pair.split('=').next() == Some("dl")))
        .unwrap_or(false)
}

fn set_content_type(response: &mut Response, mime: Option<&'static str>) {
    match mime {
        Some(mime) => {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
        }
        None => {
            response.headers_mut().remove(header::CONTENT_TYPE);
        }
    }
}

fn set_attachment(response: &mut Response, name: &str) {
    let value = format!("attachment; filename=\"{}\"", name.replace(['"', '\\'], "_"));
    if let Ok(value) = HeaderValue::from_str(&value) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
}

fn file_name(logical: &str) -> &str {
    logical.rsplit('/').next().unwrap_or(logical)
}

fn path_file_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/gate_tests.rs"]
mod tests;
