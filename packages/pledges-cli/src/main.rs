//! List active patrons for a Patreon campaign.

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use patreon_client::PatreonClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod dump;
mod pledges;
mod report;

#[derive(Parser)]
#[command(name = "patreon-pledges")]
#[command(about = "List active patrons for a Patreon campaign")]
#[command(version)]
struct Cli {
    /// Patreon creator access token (falls back to PATREON_ACCESS_TOKEN)
    #[arg(long)]
    access_token: Option<String>,

    /// Fetch pledge info and print one line per active patron
    #[arg(long)]
    get_pledges: bool,

    /// Dump each raw member page to page-<N>.json
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    init_logging();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

/// Report lines go to stdout; everything diagnostic goes to stderr.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let token = cli
        .access_token
        .or_else(|| std::env::var("PATREON_ACCESS_TOKEN").ok())
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        println!("Please provide your Patreon access-token");
        Cli::command().print_help()?;
        return Ok(());
    };

    if !cli.get_pledges {
        return Ok(());
    }

    let client = PatreonClient::new(token);
    pledges::run(&client, cli.debug).await
}
