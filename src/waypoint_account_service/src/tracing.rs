use std::time::Duration;

use axum::http::{Request, Response};
use tracing::{Level, Span};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing stack: env-filtered compact output plus
/// span-aware error context.
pub fn init_tracing() -> color_eyre::Result<()> {
    let fmt_layer = fmt::layer().compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

/// Open a request span tagged with a fresh request id.
pub fn make_span_with_request_id<B>(request: &Request<B>) -> Span {
    let request_id = uuid::Uuid::new_v4();
    tracing::span!(
        Level::INFO,
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

pub fn on_request<B>(_request: &Request<B>, _span: &Span) {
    tracing::event!(Level::INFO, "started processing request");
}

pub fn on_response<B>(response: &Response<B>, latency: Duration, _span: &Span) {
    tracing::event!(
        Level::INFO,
        latency = ?latency,
        status = %response.status(),
        "finished processing request"
    );
}
