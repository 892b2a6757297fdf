use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

use web_assets::icons::bin_favicon_inline_svg;
use web_assets::pages::acceptance_page;

use crate::config::Mode;
use crate::error::{GatewayError, GatewayResult};
use crate::normalize::{normalize, UpstreamShape};
use crate::quote::{AcceptanceRecord, ContractQuote};
use crate::webhook::{form_pairs, WebhookClient};
use crate::BoxError;

pub const MAX_SUBMISSION_BYTES: usize = 64 * 1024;
pub const MISSING_ID_MESSAGE: &str = "Missing ID";
pub const NOT_FOUND_MESSAGE: &str = "No data found for this ID";

/// Everything a request handler needs. Nothing in here is mutated after
/// startup.
pub struct AppState {
    pub webhook: WebhookClient,
    pub mode: Mode,
    pub static_dir: Option<PathBuf>,
}

pub async fn run_http_server(address: String, state: Arc<AppState>) -> Result<(), BoxError> {
    let listener = TcpListener::bind(&address).await?;
    info!("Contract gateway listening on http://{}", address);
    serve(listener, state).await
}

/// Accept loop over an already bound listener, one task per connection.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), BoxError> {
    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(req, state).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("Error serving connection: {:?}", err);
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let accepts_html = req
        .headers()
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/favicon.ico") | (&Method::GET, "/favicon.svg") => Ok(serve_favicon()),
        (&Method::GET, "/health") => Ok(respond(
            StatusCode::OK,
            "application/json",
            json!({ "status": "ok" }).to_string(),
        )),
        (&Method::GET, "/contract") | (&Method::GET, "/api/contract") => {
            serve_contract(query.as_deref(), &state).await
        }
        (&Method::GET, "/api/quote") => serve_quote(query.as_deref(), &state).await,
        (&Method::POST, "/submit") | (&Method::POST, "/api/submit") => {
            forward_submission(req, &state).await
        }
        (&Method::GET, page) => Ok(serve_page(page, accepts_html, &state).await),
        _ => Ok(not_found()),
    };

    Ok(response.unwrap_or_else(|e| {
        match &e {
            GatewayError::Upstream { .. } => {
                error!("{} {} failed with {}: {}", method, path, e.status_code(), e)
            }
            _ => warn!("{} {} rejected with {}: {}", method, path, e.status_code(), e),
        }
        respond(e.status_code(), "application/json", e.to_json())
    }))
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn not_found() -> Response<Full<Bytes>> {
    respond(StatusCode::NOT_FOUND, "text/plain; charset=utf-8", "Not Found")
}

fn serve_favicon() -> Response<Full<Bytes>> {
    respond(
        StatusCode::OK,
        "image/svg+xml",
        Bytes::from_static(bin_favicon_inline_svg().as_bytes()),
    )
}

fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn require_id(query: Option<&str>) -> GatewayResult<String> {
    query_param(query, "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::InvalidRequest(MISSING_ID_MESSAGE.to_string()))
}

/// Fetches and flattens the webhook record for `id`.
async fn lookup_contract(id: &str, state: &AppState) -> GatewayResult<Map<String, Value>> {
    info!("Proxying fetch for ID: {}", id);
    let raw = state.webhook.fetch_contract(id).await?;
    info!("Webhook raw response for {}: {}", id, raw);
    debug!("Webhook payload shape for {}: {:?}", id, UpstreamShape::of(&raw));

    normalize(raw).ok_or_else(|| {
        warn!("Webhook returned empty data for ID: {}", id);
        GatewayError::NotFound(NOT_FOUND_MESSAGE.to_string())
    })
}

async fn serve_contract(query: Option<&str>, state: &AppState) -> GatewayResult<Response<Full<Bytes>>> {
    let id = require_id(query)?;
    let fields = lookup_contract(&id, state).await?;
    Ok(respond(
        StatusCode::OK,
        "application/json",
        Value::Object(fields).to_string(),
    ))
}

async fn serve_quote(query: Option<&str>, state: &AppState) -> GatewayResult<Response<Full<Bytes>>> {
    let id = require_id(query)?;
    let fields = lookup_contract(&id, state).await?;
    let quote = ContractQuote::from_fields(&fields);
    let json = serde_json::to_string(&quote).unwrap_or_else(|_| "{}".to_string());
    Ok(respond(StatusCode::OK, "application/json", json))
}

/// Turns an inbound submission body into form pairs. Form bodies pass
/// through; JSON bodies must be a single object.
fn parse_submission(content_type: &str, body: &[u8]) -> GatewayResult<Vec<(String, String)>> {
    if content_type.starts_with("application/x-www-form-urlencoded") {
        return Ok(form_urlencoded::parse(body).into_owned().collect());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(form_pairs(&fields)),
        Ok(_) => Err(GatewayError::InvalidRequest(
            "Submission body must be a JSON object".to_string(),
        )),
        Err(e) => Err(GatewayError::InvalidRequest(format!(
            "Invalid submission body: {}",
            e
        ))),
    }
}

async fn forward_submission(
    req: Request<Incoming>,
    state: &AppState,
) -> GatewayResult<Response<Full<Bytes>>> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_ascii_lowercase();

    let body = Limited::new(req.into_body(), MAX_SUBMISSION_BYTES)
        .collect()
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("Unreadable submission body: {}", e)))?
        .to_bytes();

    let fields = parse_submission(&content_type, &body)?;

    match AcceptanceRecord::from_form(&fields) {
        Some(record) if record.is_accepted() => info!(
            "Forwarding acceptance for {} accepted at {}",
            record.record_id, record.accepted_at
        ),
        Some(record) => warn!(
            "Forwarding submission for {} with status '{}'",
            record.record_id, record.status
        ),
        None => info!("Forwarding submission with {} fields", fields.len()),
    }

    let reply = state.webhook.submit_form(&fields).await?;

    let mut response = Response::new(Full::new(reply.body));
    *response.status_mut() = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    if let Some(value) = reply
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    Ok(response)
}

/// Acceptance page. In production a prebuilt bundle under `static_dir` takes
/// precedence, and unknown routes requested as HTML get the page as well.
async fn serve_page(path: &str, accepts_html: bool, state: &AppState) -> Response<Full<Bytes>> {
    if state.mode == Mode::Production {
        if let Some(dir) = &state.static_dir {
            if let Some(response) = serve_static(dir, path, accepts_html).await {
                return response;
            }
        }
    }

    let is_index = path == "/" || path == "/index.html";
    let client_route = state.mode == Mode::Production && accepts_html;
    if !is_index && !client_route {
        return not_found();
    }

    let mut response = respond(
        StatusCode::OK,
        "text/html; charset=utf-8",
        Bytes::from_static(acceptance_page().as_bytes()),
    );
    if state.mode == Mode::Development {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    response
}

/// Serves `path` from the bundle. Missing files fall back to `index.html`
/// only for HTML requests and extensionless routes. Returns `None` when the
/// bundle has no usable `index.html`.
async fn serve_static(dir: &Path, path: &str, accepts_html: bool) -> Option<Response<Full<Bytes>>> {
    let relative = path.trim_start_matches('/');
    if relative.split('/').any(|segment| segment == "..") {
        return Some(not_found());
    }

    let index = dir.join("index.html");
    let candidate = if relative.is_empty() {
        index.clone()
    } else {
        dir.join(relative)
    };

    if let Ok(bytes) = tokio::fs::read(&candidate).await {
        return Some(respond(StatusCode::OK, content_type_for(&candidate), bytes));
    }

    let is_asset = Path::new(relative).extension().is_some();
    if is_asset && !accepts_html {
        debug!("Static asset not found: {}", candidate.display());
        return Some(not_found());
    }

    let bytes = tokio::fs::read(&index).await.ok()?;
    Some(respond(StatusCode::OK, content_type_for(&index), bytes))
}

fn content_type_for(file: &Path) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
