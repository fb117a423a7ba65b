use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;

use chatstream_cli::{
    app::{self, RunOutcome},
    cli::{self, Cli},
    config::Config,
    logging::init_logging,
};
use chatstream_llm::StreamingChatClient;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let config = args.merge_into(config);

    init_logging(&config.logging);

    let request = args.build_request(&config)?;

    let mut builder = StreamingChatClient::builder();
    if let Some(timeout) = cli::timeout(&config) {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("Failed to create HTTP client")?;

    let mut stdout = tokio::io::stdout();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let outcome = app::run(&client, request, &mut stdout, shutdown).await?;

    if let RunOutcome::Rejected { status, body } = &outcome {
        tracing::debug!(status, body = %body, "Chat request rejected");
        eprintln!("Error: {}", status);
    }

    Ok(outcome.exit_code())
}
