use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured JSON logging. Detail that would be useless in a
/// webhook HTTP response (which configuration rule failed, which remote
/// call broke) lands here instead.
pub fn init_telemetry(log_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(filter)
        .init();

    tracing::info!("projects-automation telemetry initialized");
    Ok(())
}

/// Correlation id for one webhook delivery, used when GitHub's own
/// X-GitHub-Delivery header is not available.
pub fn generate_delivery_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span wrapping one delivery's entire processing chain.
pub fn create_delivery_span(event: &str, delivery_id: &str) -> tracing::Span {
    tracing::info_span!(
        "webhook_delivery",
        event = event,
        delivery.id = delivery_id,
        otel.kind = "server"
    )
}
