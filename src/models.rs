use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

impl ResearchRequest {
    /// The query with surrounding whitespace removed, `None` when blank.
    pub fn query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// The structured answer returned to HTTP and CLI callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResponse {
    pub topic: String,
    pub summary: Option<String>,
    pub sources: Option<Vec<String>>,
    pub tools_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilySearchRequest {
    pub query: String,
    pub max_results: i32,
    pub search_depth: String,
    pub include_raw_content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilySearchResponse {
    pub results: Vec<TavilyResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TavilyResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSummary {
    pub title: String,
    #[serde(default)]
    pub extract: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSearchResponse {
    pub query: WikiSearchQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSearchQuery {
    #[serde(default)]
    pub search: Vec<WikiSearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSearchHit {
    pub title: String,
}
