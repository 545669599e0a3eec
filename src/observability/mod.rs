// Observability infrastructure using tracing crate
// Structured JSON logs for the basket service

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "basket_server=info,tower_http=warn";
const VERBOSE_FILTER: &str = "basket_server=debug,tower_http=debug";

/// Initialize the observability system
/// Sets up structured logging to stdout with JSON formatting for machine parsing
pub fn init(verbose: bool) -> Result<()> {
    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(true)
        .with_span_list(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE);

    // Example: RUST_LOG=basket_server=debug
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .context("Failed to create tracing filter")?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .context("Tracing subscriber already installed")?;

    Ok(())
}

/// Span wrapping one basket request
#[inline]
pub fn request_span(method: &str, path: &str) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = method,
        path = path,
        request_id = %uuid::Uuid::new_v4(),
    )
}
