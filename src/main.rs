mod agent;
mod api;
mod config;
mod models;
mod normalize;
mod tools;

use anyhow::{Context, Result};
use agent::ResearchAgent;
use api::AppState;
use clap::{Parser, Subcommand};
use config::{AgentConfig, ServeConfig, DEFAULT_LOG_FILTER};
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "research-assistant")]
#[command(about = "Research assistant backed by an LLM agent with web search and Wikipedia tools")]
struct Cli {
    #[command(flatten)]
    agent: AgentConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the research API over HTTP
    Serve {
        #[command(flatten)]
        serve: ServeConfig,
    },
    /// Answer a single query and print the structured response
    Ask {
        /// The research query; read from stdin when omitted
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let agent = tools::llm::build_agent(&cli.agent)?;

    match cli.command {
        Command::Serve { serve } => {
            let app = api::router(AppState { agent });
            let addr = serve.addr();
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            info!("Research assistant API running on http://{}", addr);

            axum::serve(listener, app).await?;
        }
        Command::Ask { query } => {
            let query = match query {
                Some(query) => query,
                None => read_query()?,
            };
            let raw_output = agent.invoke(query.trim(), &[]).await?;
            let response = normalize::normalize(&raw_output)
                .with_context(|| "agent output did not match the research schema")?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

fn read_query() -> Result<String> {
    print!("how can i help you today: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let query = line.trim().to_string();
    anyhow::ensure!(!query.is_empty(), "Query is required");
    Ok(query)
}
