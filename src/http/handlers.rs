//! Actix handlers wiring the MCP service and artifact store to HTTP.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::StreamExt;
use log::{error, info};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::mcp::rpc::{RpcRequest, RpcResponse};
use crate::mcp::PROTOCOL_VERSION;
use crate::state::AppState;
use crate::store::session::SessionRegistry;
use crate::ErrorResponse;

/// Header carrying the advisory session id; generated when absent, echoed
/// otherwise.
pub const SESSION_HEADER: &str = "Mcp-Session-Id";

const SSE_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Discovery - GET /mcp
pub async fn discovery() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
    }))
}

/// Liveness probe - GET /health
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    let (artifacts, bundles) = state.store.counts();
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "artifacts": artifacts,
        "bundles": bundles,
        "sessions": state.sessions.len(),
    }))
}

/// JSON-RPC entry point - POST /mcp
///
/// The body is a single request object or a batch array. Batches are handled
/// sequentially in input order; notifications are omitted from the output.
/// When nothing remains to send, the answer is 204 No Content.
pub async fn rpc_handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let session_id = match req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(id) => {
            state.sessions.ensure(id);
            id.to_string()
        }
        None => state.sessions.register(),
    };

    let parsed: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return HttpResponse::Ok()
                .insert_header((SESSION_HEADER, session_id))
                .json(RpcResponse::parse_error(format!("Invalid JSON: {err}")))
        }
    };

    match parsed {
        Value::Array(items) => {
            if items.is_empty() {
                return HttpResponse::Ok()
                    .insert_header((SESSION_HEADER, session_id))
                    .json(RpcResponse::invalid_request(None, "Empty batch"));
            }
            let mut responses = Vec::new();
            for item in items {
                if let Some(response) = handle_element(&state, item).await {
                    responses.push(response);
                }
            }
            if responses.is_empty() {
                HttpResponse::NoContent()
                    .insert_header((SESSION_HEADER, session_id))
                    .finish()
            } else {
                HttpResponse::Ok()
                    .insert_header((SESSION_HEADER, session_id))
                    .json(responses)
            }
        }
        single => match handle_element(&state, single).await {
            Some(response) => HttpResponse::Ok()
                .insert_header((SESSION_HEADER, session_id))
                .json(response),
            None => HttpResponse::NoContent()
                .insert_header((SESSION_HEADER, session_id))
                .finish(),
        },
    }
}

async fn handle_element(state: &web::Data<AppState>, element: Value) -> Option<RpcResponse> {
    let id = element.get("id").cloned();
    let request: RpcRequest = match serde_json::from_value(element) {
        Ok(request) => request,
        Err(err) => {
            return Some(RpcResponse::invalid_request(
                id,
                format!("Invalid request: {err}"),
            ))
        }
    };
    state.service.handle_request(request).await
}

/// Raw artifact download - GET /download/{id}
///
/// Bundle ids miss here by design; the store disambiguates record kinds.
pub async fn download(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    match state.store.get(&id) {
        Some(record) => HttpResponse::Ok()
            .content_type(record.mime_type)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", record.filename),
            ))
            .body(record.bytes),
        None => HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
            "Artifact '{id}' not found"
        ))),
    }
}

/// Zip archive of a bundle - GET /download/zip/{bundle_id}
///
/// Members that expired since the bundle was created are skipped.
pub async fn download_zip(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let bundle_id = path.into_inner();
    let members = match state.store.serve_bundle(&bundle_id) {
        Some(members) => members,
        None => {
            return HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
                "Bundle '{bundle_id}' not found"
            )))
        }
    };

    match build_zip(&members) {
        Ok(archive) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"bundle-{bundle_id}.zip\""),
            ))
            .body(archive),
        Err(err) => {
            error!("failed to assemble zip for bundle {bundle_id}: {err}");
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
                "Failed to assemble the zip archive",
            ))
        }
    }
}

fn build_zip(members: &[(String, Vec<u8>)]) -> Result<Vec<u8>, zip::result::ZipError> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (filename, bytes) in members {
        writer.start_file(filename.as_str(), options)?;
        writer.write_all(bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Legacy SSE compatibility - GET /sse
///
/// Emits an endpoint-advertisement event, then keepalive comments. The
/// session registered here is dropped when the client disconnects and the
/// stream is released.
pub async fn sse_handler(state: web::Data<AppState>) -> HttpResponse {
    let session_id = state.sessions.register();
    info!("sse client connected, session {session_id}");

    let guard = SessionGuard {
        id: session_id.clone(),
        sessions: state.sessions.clone(),
    };

    let initial = web::Bytes::from_static(b"event: endpoint\ndata: /mcp\n\n");
    let keepalives = futures_util::stream::unfold(guard, |guard| async move {
        tokio::time::sleep(SSE_KEEPALIVE_INTERVAL).await;
        Some((
            Ok::<_, std::io::Error>(web::Bytes::from_static(b": keepalive\n\n")),
            guard,
        ))
    });
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(initial) })
        .chain(keepalives);

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header((SESSION_HEADER, session_id))
        .streaming(stream)
}

/// Removes the SSE session when the response stream is dropped.
struct SessionGuard {
    id: String,
    sessions: Arc<SessionRegistry>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.id);
        info!("sse client disconnected, session {} released", self.id);
    }
}

/// Register all routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/mcp")
            .route(web::get().to(discovery))
            .route(web::post().to(rpc_handler)),
    )
    .service(web::resource("/health").route(web::get().to(health)))
    .service(web::resource("/download/zip/{bundle_id}").route(web::get().to(download_zip)))
    .service(web::resource("/download/{id}").route(web::get().to(download)))
    .service(web::resource("/sse").route(web::get().to(sse_handler)));
}
