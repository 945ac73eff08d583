use axum::Router;
use occi::kernel::server::state::ApiState;
use tower_http::trace::TraceLayer;

/// The OCCI routes with request tracing.
pub(crate) fn init(state: ApiState) -> Router {
    occi::http::router(state).layer(TraceLayer::new_for_http())
}
