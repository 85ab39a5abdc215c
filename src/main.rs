use clap::{Parser, Subcommand};
use jobportal::cli;
use jobportal::core::config;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "jobportal", about = "Job portal client: chatbot and navigation")]
struct Args {
    /// Portal API base URL (overrides API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stream a chatbot reply
    Chat { message: String },
    /// Ask the chatbot without streaming
    Ask { message: String },
    /// Navigate to a page, loading its data first
    Open {
        href: String,
        /// API path to fetch before navigating, e.g. jobs/42
        #[arg(long)]
        fetch: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to jobportal.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("jobportal.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Ignoring config file: {}", e);
        config::PortalConfig::default()
    });
    let resolved = config::resolve(&file_config, args.api_url.as_deref());

    log::info!("jobportal starting up against {}", resolved.api_url);

    match args.command {
        Command::Chat { message } => cli::chat(&resolved, &message).await,
        Command::Ask { message } => cli::ask(&resolved, &message).await,
        Command::Open { href, fetch } => cli::open(&resolved, &href, fetch.as_deref()).await,
    }
}
