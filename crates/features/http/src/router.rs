//! The axum entry point: every request goes through [`dispatch`].
//!
//! A request is decoded into an [`OcciRequest`] (path, action query, parsed
//! body, authenticated user), handed to the handler for its kind of path, and
//! the handler's answer is rendered by the codec the client asked for.

use crate::error::ApiError;
use crate::handlers::{CollectionHandler, DiscoveryHandler, EntityHandler, Handler};
use crate::message::{OcciRequest, OcciResponse};
use crate::negotiation::Codecs;
use crate::renderer::Renderer;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use occi_core::User;
use occi_domain::constants::{WELL_KNOWN_DISCOVERY_PATH, media};
use occi_kernel::security::path::PathGuard;
use occi_kernel::server::state::ApiState;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sent as `Server` on every response.
pub const SERVER_HEADER: &str = concat!("occi-rs/", env!("CARGO_PKG_VERSION"), " OCCI/1.1");

/// Request bodies beyond this size are rejected.
const BODY_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
struct OcciService {
    state: ApiState,
    codecs: Arc<Codecs>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionQuery {
    action: Option<String>,
}

/// Router with the default codecs.
pub fn router(state: ApiState) -> Router {
    router_with_codecs(state, Codecs::default())
}

/// Router with custom parser and renderer tables.
pub fn router_with_codecs(state: ApiState, codecs: Codecs) -> Router {
    Router::new().fallback(dispatch).with_state(OcciService { state, codecs: Arc::new(codecs) })
}

async fn dispatch(State(service): State<OcciService>, request: Request) -> Response {
    let mut response = match handle(&service, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };
    response.headers_mut().insert(header::SERVER, HeaderValue::from_static(SERVER_HEADER));
    response
}

#[instrument(skip_all, fields(method = %request.method(), uri = %request.uri()))]
async fn handle(service: &OcciService, request: Request) -> Result<Response, ApiError> {
    let OcciService { state, codecs } = service;
    let (parts, body) = request.into_parts();

    let path = relative_path(state, parts.uri.path())?;
    let user = authenticate(state, &parts.headers).await?;
    let action = action_query(&parts.uri)?;

    let body = read_body(body).await?;
    let parser = codecs.select_parser(header_str(&parts.headers, header::CONTENT_TYPE))?;
    // Chosen before the handler runs: a 406 must not follow a committed change.
    let renderer = codecs.select_renderer(header_str(&parts.headers, header::ACCEPT))?;
    let objects = parser.parse(&parts.headers, &body, &state.translator)?;
    debug!(path, objects = objects.len(), "Request decoded");

    let handler = handler_for(state, &path);
    let request = OcciRequest { path, action, objects, user };
    let response = match parts.method {
        Method::GET | Method::HEAD => handler.get(state, request).await?,
        Method::POST => handler.post(state, request).await?,
        Method::PUT => handler.put(state, request).await?,
        Method::DELETE => handler.delete(state, request).await?,
        other => return Err(ApiError::NotImplemented { message: format!("method {other}").into() }),
    };

    render(renderer, state, response)
}

/// Request path relative to the base path, checked and without a leading slash.
fn relative_path(state: &ApiState, path: &str) -> Result<String, ApiError> {
    let base_path = state.translator.base_path();
    let relative = path
        .strip_prefix(base_path)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .ok_or_else(|| ApiError::NotFound { path: path.to_owned() })?;
    Ok(PathGuard::sanitize(relative)?)
}

fn handler_for(state: &ApiState, path: &str) -> &'static dyn Handler {
    let discovery = state.config.occi.discovery_path.trim_start_matches('/');
    if path == discovery || path == WELL_KNOWN_DISCOVERY_PATH {
        &DiscoveryHandler
    } else if path.is_empty() || path.ends_with('/') {
        &CollectionHandler
    } else {
        &EntityHandler
    }
}

/// Resolves the `Authorization` header to a user.
///
/// Without the header the request proceeds anonymously. `Basic` credentials
/// are decoded into identity and secret; any other scheme passes its token
/// to the store as the identity.
async fn authenticate(state: &ApiState, headers: &HeaderMap) -> Result<Option<User>, ApiError> {
    let Some(authorization) = header_str(headers, header::AUTHORIZATION) else {
        return Ok(None);
    };
    let unauthorized = |message: &'static str| ApiError::Unauthorized { message: message.into() };

    let (scheme, token) = authorization.trim().split_once(' ').ok_or_else(|| unauthorized("malformed credentials"))?;
    let user = if scheme.eq_ignore_ascii_case("basic") {
        let decoded = STANDARD
            .decode(token.trim())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| unauthorized("malformed Basic credentials"))?;
        let (identity, secret) = decoded.split_once(':').ok_or_else(|| unauthorized("malformed Basic credentials"))?;
        state.store.auth_user(identity, Some(secret), Some("Basic")).await
    } else {
        state.store.auth_user(token.trim(), None, Some(scheme)).await
    };

    user.map(Some).ok_or_else(|| unauthorized("invalid credentials"))
}

fn action_query(uri: &Uri) -> Result<Option<String>, ApiError> {
    let Query(query) = Query::<ActionQuery>::try_from_uri(uri)
        .map_err(|e| ApiError::bad_request(format!("Invalid query string: {e}")))?;
    Ok(query.action.filter(|a| !a.is_empty()))
}

async fn read_body(body: Body) -> Result<String, ApiError> {
    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| ApiError::bad_request(format!("Unreadable request body: {e}")))?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ApiError::bad_request("Request body is not valid UTF-8"))
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn render(renderer: &dyn Renderer, state: &ApiState, response: OcciResponse) -> Result<Response, ApiError> {
    let (payload, location) = match response {
        OcciResponse::Ok => {
            return Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, HeaderValue::from_static(media::TEXT_PLAIN_UTF8))],
                "OK",
            )
                .into_response());
        },
        OcciResponse::Rendered { payload, location } => (payload, location),
    };

    let rendered = renderer.render(&payload, &state.translator)?;

    let mut response = Response::new(Body::from(rendered.body));
    let out = response.headers_mut();
    out.insert(header::CONTENT_TYPE, HeaderValue::from_static(rendered.content_type));
    for (name, value) in rendered.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::from(format!("\"{name}\": {e}")))?;
        out.append(name, header_value(&value)?);
    }
    if let Some(location) = location {
        out.insert(header::LOCATION, header_value(&location)?);
    }
    Ok(response)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::from(format!("unencodable header value: {e}")))
}
