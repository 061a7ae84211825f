use anyhow::Context;
use innkeep_app::Application;
use innkeep_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load innkeep settings")?;
    innkeep_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "innkeep-app bootstrap starting"
    );

    Application::connect(settings).await?.serve().await
}
