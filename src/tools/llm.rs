use crate::agent::{preamble, ResearchAgent, RigResearchAgent};
use crate::config::{AgentConfig, Provider};
use crate::tools::{tavily::WebSearch, wiki::WikiLookup};
use anyhow::Result;
use rig::agent::AgentBuilder;
use rig::completion::CompletionModel;
use rig::prelude::*;
use rig::providers::{gemini, openai};
use std::sync::Arc;
use tracing::info;

/// Builds the agent once at startup, with both tools attached.
pub fn build_agent(config: &AgentConfig) -> Result<Arc<dyn ResearchAgent>> {
    let http = reqwest::Client::new();
    info!(provider = ?config.provider, model = config.model(), "Building research agent");

    match config.provider {
        Provider::Gemini => {
            let api_key = std::env::var("GOOGLE_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .map_err(|_| anyhow::anyhow!("Gemini API key not configured (set GOOGLE_API_KEY)"))?;
            let client = gemini::Client::new(&api_key);
            Ok(Arc::new(with_tools(
                client.agent(config.model()),
                http,
                config.max_turns,
            )))
        }
        Provider::OpenAi => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow::anyhow!("OpenAI API key not configured"))?;
            let client = openai::Client::new(&api_key);
            Ok(Arc::new(with_tools(
                client.agent(config.model()),
                http,
                config.max_turns,
            )))
        }
    }
}

fn with_tools<M: CompletionModel + 'static>(
    builder: AgentBuilder<M>,
    http: reqwest::Client,
    max_turns: usize,
) -> RigResearchAgent<M> {
    let agent = builder
        .preamble(&preamble())
        .tool(WebSearch::new(http.clone()))
        .tool(WikiLookup::new(http))
        .build();
    RigResearchAgent::new(agent, max_turns)
}
