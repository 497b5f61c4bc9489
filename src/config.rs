use clap::{Args, ValueEnum};

pub const DEFAULT_LOG_FILTER: &str = "research_assistant=debug,tower_http=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    Gemini,
    #[value(name = "openai")]
    OpenAi,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-flash",
            Provider::OpenAi => "gpt-4o-mini",
        }
    }
}

/// Options shared by every command that talks to the model.
#[derive(Debug, Clone, Args)]
pub struct AgentConfig {
    /// Model provider backing the agent
    #[arg(long, global = true, env = "RESEARCH_PROVIDER", value_enum, default_value_t = Provider::Gemini)]
    pub provider: Provider,

    /// Model name; defaults to the provider's standard model
    #[arg(long, global = true, env = "RESEARCH_MODEL")]
    pub model: Option<String>,

    /// Maximum rounds of tool calls before the agent must answer
    #[arg(long, global = true, env = "RESEARCH_MAX_TURNS", default_value_t = 5)]
    pub max_turns: usize,
}

impl AgentConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    #[arg(long, env = "RESEARCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "RESEARCH_PORT", default_value_t = 3000)]
    pub port: u16,
}

impl ServeConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        agent: AgentConfig,
        #[command(flatten)]
        serve: ServeConfig,
    }

    #[test]
    fn model_defaults_follow_provider() {
        let cli = Harness::parse_from(["test", "--provider", "openai"]);
        assert_eq!(cli.agent.provider, Provider::OpenAi);
        assert_eq!(cli.agent.model(), "gpt-4o-mini");

        let cli = Harness::parse_from(["test", "--model", "gemini-2.0-flash"]);
        assert_eq!(cli.agent.provider, Provider::Gemini);
        assert_eq!(cli.agent.model(), "gemini-2.0-flash");
    }

    #[test]
    fn serve_address_is_host_and_port() {
        let cli = Harness::parse_from(["test", "--host", "127.0.0.1", "--port", "8080"]);
        assert_eq!(cli.serve.addr(), "127.0.0.1:8080");
        assert_eq!(cli.agent.max_turns, 5);
    }
}
