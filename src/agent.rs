use crate::models::{ChatTurn, Role};
use crate::normalize::schema::format_instructions;
use anyhow::Result;
use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::{CompletionModel, Message, Prompt};
use tracing::{debug, instrument};

/// Something that answers a research query with free text.
///
/// The handlers only see this seam, so tests can swap in a canned agent.
#[async_trait]
pub trait ResearchAgent: Send + Sync {
    async fn invoke(&self, query: &str, chat_history: &[ChatTurn]) -> Result<String>;
}

pub fn preamble() -> String {
    format!(
        "You are a research assistant that helps generate a research paper. \
         Answer the user's query using necessary tools and provide a descriptive research first draft paper, \
         a detailed and comprehensive summary which is labelled as summary on top, relevant sources, \
         and tools used in the final JSON output. \
         Output must be raw JSON only, with no markdown or code blocks.\n\n{}",
        format_instructions()
    )
}

impl From<&ChatTurn> for Message {
    fn from(turn: &ChatTurn) -> Self {
        match turn.role {
            Role::User => Message::user(turn.content.clone()),
            Role::Assistant => Message::assistant(turn.content.clone()),
        }
    }
}

pub struct RigResearchAgent<M: CompletionModel> {
    agent: Agent<M>,
    max_turns: usize,
}

impl<M: CompletionModel> RigResearchAgent<M> {
    pub fn new(agent: Agent<M>, max_turns: usize) -> Self {
        Self { agent, max_turns }
    }
}

#[async_trait]
impl<M: CompletionModel + 'static> ResearchAgent for RigResearchAgent<M> {
    #[instrument(skip(self, chat_history), fields(history = chat_history.len()))]
    async fn invoke(&self, query: &str, chat_history: &[ChatTurn]) -> Result<String> {
        let mut history: Vec<Message> = chat_history.iter().map(Message::from).collect();
        let output = self
            .agent
            .prompt(query)
            .with_history(&mut history)
            .multi_turn(self.max_turns)
            .await
            .map_err(|e| anyhow::anyhow!("Prompt error: {}", e))?;
        debug!("Agent replied with {} characters", output.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_forbids_markdown_and_embeds_schema() {
        let text = preamble();
        assert!(text.contains("raw JSON only"));
        assert!(text.contains("tools_used"));
        assert!(text.ends_with(&format_instructions()));
    }
}
