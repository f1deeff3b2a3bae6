//! Dataset Discovery - command line front end
//!
//! Drives the client stores against the configured Data API and AI service.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset_discovery::models::{ChatRole, SearchMode};
use dataset_discovery::{Config, DiscoveryApp};

#[derive(Parser)]
#[command(name = "dataset-discovery", version, about = "Search and explore environmental datasets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the catalog
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// keyword, semantic, conversational or hybrid
        #[arg(long, default_value = "semantic")]
        mode: SearchMode,
    },
    /// Show a dataset's details
    Dataset { identifier: String },
    /// Show catalog statistics
    Stats,
    /// Trigger ETL processing for one dataset, or all when no identifier is given
    Process { identifier: Option<String> },
    /// Ask the assistant a question
    Chat { message: String },
    /// Print the saved chat transcript
    History {
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dataset_discovery=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();
    let cli = Cli::parse();

    info!("🔷 Dataset Discovery v{}", env!("CARGO_PKG_VERSION"));

    let app = DiscoveryApp::from_config(config)?;

    match cli.command {
        Command::Search { query, page, mode } => {
            app.search.set_mode(mode);
            app.search.perform_search(Some(query.as_str()), Some(page)).await;

            let state = app.search.snapshot();
            if let Some(error) = &state.error {
                anyhow::bail!("search failed: {}", error);
            }
            println!(
                "{} (page {} of {})",
                state.result_count_label(),
                state.current_page,
                state.total_pages
            );
            for item in &state.results {
                println!("{:.2}  {}  {}", item.relevance_score, item.identifier, item.title);
            }
        }
        Command::Dataset { identifier } => match app.datasets.fetch_dataset(&identifier).await {
            Some(dataset) => println!("{}", serde_json::to_string_pretty(dataset.as_ref())?),
            None => {
                let error = app.datasets.snapshot().error.unwrap_or_default();
                anyhow::bail!("{}", error);
            }
        },
        Command::Stats => {
            app.datasets.fetch_stats().await;
            match app.datasets.snapshot().stats {
                Some(stats) => println!(
                    "{} datasets from {} providers",
                    stats.total_datasets, stats.total_providers
                ),
                None => anyhow::bail!("statistics unavailable"),
            }
        }
        Command::Process { identifier } => {
            match identifier {
                Some(id) => app.datasets.process_identifier(&id).await,
                None => app.datasets.process_all().await,
            }
            let state = app.datasets.snapshot();
            if let Some(validation) = state.validation_message {
                anyhow::bail!("{}", validation);
            }
            println!("{}", state.process_message.unwrap_or_default());
        }
        Command::Chat { message } => {
            app.chat.initialize_chat();
            app.chat.send_message(&message).await;

            let state = app.chat.snapshot();
            if let Some(reply) = state.messages.last() {
                println!("{}", reply.content);
            }
            if let Some(query) = state.suggested_query {
                println!("\nSuggested search: {}", query);
            }
            if !state.related_identifiers.is_empty() {
                println!("Related datasets: {}", state.related_identifiers.join(", "));
            }
        }
        Command::History { clear } => {
            if clear {
                app.chat.clear_messages();
                println!("Chat history cleared");
            } else {
                for message in app.chat.messages() {
                    let who = match message.role {
                        ChatRole::User => "you",
                        ChatRole::Assistant => "assistant",
                    };
                    println!("[{}] {}: {}", message.timestamp.format("%Y-%m-%d %H:%M"), who, message.content);
                }
            }
        }
    }

    Ok(())
}
