use anyhow::Context;
use clap::{Parser, Subcommand};
use innkeep_app::Application;
use innkeep_kernel::settings::Settings;

/// Room and booking record keeper.
#[derive(Debug, Parser)]
#[command(name = "innkeep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// List known migrations and whether each has been applied
    Migrations,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load innkeep settings")?;
    innkeep_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "innkeep CLI starting");

    let app = Application::connect(settings).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => app.serve().await,
        Command::Migrate => {
            let applied = app.migrate().await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Command::Migrations => {
            for (module, id, applied) in app.migration_status().await? {
                let state = if applied { "applied" } else { "pending" };
                println!("{module}/{id}\t{state}");
            }
            Ok(())
        }
    }
}
