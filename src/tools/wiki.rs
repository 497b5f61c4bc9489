use super::ToolError;
use crate::models::{WikiSearchResponse, WikiSummary};
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const SEARCH_URL: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("research-assistant/", env!("CARGO_PKG_VERSION"));

/// Longest extract handed back to the agent, in characters.
const MAX_EXTRACT_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub struct WikiLookup {
    client: reqwest::Client,
}

impl WikiLookup {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn summary(&self, title: &str) -> Result<Option<WikiSummary>, ToolError> {
        let url = format!("{}/{}", SUMMARY_URL, urlencoding::encode(&title.replace(' ', "_")));
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status => Err(ToolError::Status(status)),
        }
    }

    async fn top_hit(&self, query: &str) -> Result<Option<String>, ToolError> {
        let response = self
            .client
            .get(SEARCH_URL)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ToolError::Status(response.status()));
        }

        let search: WikiSearchResponse = response.json().await?;
        Ok(search.query.search.into_iter().next().map(|hit| hit.title))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WikiLookupArgs {
    pub query: String,
}

impl Tool for WikiLookup {
    const NAME: &'static str = "wikipedia";

    type Error = ToolError;
    type Args = WikiLookupArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Look up a topic on Wikipedia and return a summary of the best matching article"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Article title or search terms"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        debug!(query = %args.query, "wikipedia lookup");

        if let Some(summary) = self.summary(&args.query).await? {
            return Ok(format_summary(&summary));
        }

        // No article under that exact title; fall back to full-text search.
        let title = self
            .top_hit(&args.query)
            .await?
            .ok_or_else(|| ToolError::NotFound(args.query.clone()))?;
        let summary = self
            .summary(&title)
            .await?
            .ok_or(ToolError::NotFound(args.query))?;
        Ok(format_summary(&summary))
    }
}

fn format_summary(summary: &WikiSummary) -> String {
    let extract: String = summary.extract.chars().take(MAX_EXTRACT_CHARS).collect();
    format!(
        "Page: {}\nURL: https://en.wikipedia.org/wiki/{}\nSummary: {}",
        summary.title,
        urlencoding::encode(&summary.title.replace(' ', "_")),
        extract
    )
}
