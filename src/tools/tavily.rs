use super::ToolError;
use crate::models::{TavilyResult, TavilySearchRequest, TavilySearchResponse};
use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use tracing::debug;

const TAVILY_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Clone)]
pub struct WebSearch {
    client: reqwest::Client,
}

impl WebSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
}

impl Tool for WebSearch {
    const NAME: &'static str = "search";

    type Error = ToolError;
    type Args = WebSearchArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the web for information".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let api_key =
            env::var("TAVILY_API_KEY").map_err(|_| ToolError::MissingApiKey("TAVILY_API_KEY"))?;
        debug!(query = %args.query, "web search");

        let request = TavilySearchRequest {
            query: args.query.clone(),
            max_results: 5,
            search_depth: "basic".to_string(),
            include_raw_content: false,
        };

        let response = self
            .client
            .post(TAVILY_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ToolError::Status(response.status()));
        }

        let search_response: TavilySearchResponse = response.json().await?;
        if search_response.results.is_empty() {
            return Err(ToolError::NotFound(args.query));
        }
        Ok(format_results(&search_response.results))
    }
}

fn format_results(results: &[TavilyResult]) -> String {
    results
        .iter()
        .map(|r| format!("Title: {}\nURL: {}\nContent: {}\n", r.title, r.url, r.content))
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_are_formatted_as_sections() {
        let results = vec![
            TavilyResult {
                title: "Rust".to_string(),
                url: "https://www.rust-lang.org".to_string(),
                content: "A language empowering everyone".to_string(),
                score: 0.9,
            },
            TavilyResult {
                title: "Cargo".to_string(),
                url: "https://doc.rust-lang.org/cargo".to_string(),
                content: "The Rust package manager".to_string(),
                score: 0.5,
            },
        ];
        let text = format_results(&results);
        assert_eq!(
            text,
            "Title: Rust\nURL: https://www.rust-lang.org\nContent: A language empowering everyone\n\
             \n---\n\
             Title: Cargo\nURL: https://doc.rust-lang.org/cargo\nContent: The Rust package manager\n"
        );
    }

    #[tokio::test]
    async fn definition_requires_query() {
        let def = WebSearch::new(reqwest::Client::new()).definition(String::new()).await;
        assert_eq!(def.name, "search");
        assert_eq!(def.parameters["required"], json!(["query"]));
    }
}
