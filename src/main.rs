use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    emailforge::logging::init().context("init logging")?;

    let cli = emailforge::cli::Cli::parse();
    tracing::debug!(command = cli.command.name(), lang = ?cli.global.lang, "parsed cli");

    emailforge::commands::run(cli).await
}
