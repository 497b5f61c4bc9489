pub mod llm;
pub mod tavily;
pub mod wiki;

use thiserror::Error;

/// Failure of a tool call, reported back to the agent as the tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0} not set")]
    MissingApiKey(&'static str),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("No results for '{0}'")]
    NotFound(String),
}
