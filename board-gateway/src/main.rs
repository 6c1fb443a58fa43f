use anyhow::Context;
use board_gateway::config::GatewaySettings;
use board_gateway::startup::Application;
use gateway_core::observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics().context("failed to install metrics recorder")?;

    let settings = GatewaySettings::load().context("failed to load configuration")?;

    init_tracing(
        "board-gateway",
        &settings.server.log_level,
        settings.server.otlp_endpoint.as_deref(),
    );

    let application = Application::build(settings).await?;
    tracing::info!(port = application.port(), "board-gateway started");

    application.run_until_stopped().await?;
    Ok(())
}
