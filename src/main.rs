use anyhow::Result;
use clap::Parser;
use job_chat::app_log;
use job_chat::cli::{self, Cli};
use job_chat::core::ConfigManager;
use job_chat::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ConfigManager::load()?;

    logging::init(
        config.environment.log_path.as_deref(),
        cli.command.log_target(),
    )?;

    app_log!(
        info,
        "Environment: {}",
        std::env::var("JOBCHAT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    );
    app_log!(
        info,
        "Database: {}",
        config.environment.database_path.display()
    );

    cli::run(cli, config).await
}
