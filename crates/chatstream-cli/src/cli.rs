use anyhow::{bail, Result};
use chatstream_llm::{ChatOptions, ChatRequest, Message};
use clap::Parser;
use std::time::Duration;

use crate::config::Config;

/// Stream a chat completion from an OpenAI-compatible endpoint to stdout
#[derive(Parser, Debug)]
#[command(name = "chatstream")]
#[command(about = "Stream a chat completion from an OpenAI-compatible endpoint")]
#[command(after_help = r#"Environment Variables:
    CHAT_API_KEY: Bearer token sent with the request (required)
    CHAT_ENDPOINT: Chat completions URL
    CHAT_MODEL: Model identifier
    CHAT_TIMEOUT_SECS: Whole-request timeout in seconds
    LOG_LEVEL / LOG_FORMAT: Logging level and format (pretty or json)

Examples:
    chatstream "Write a short essay about friendship"
    chatstream --endpoint http://localhost:3000/v1/chat/completions --model gpt-4 "Hello"
"#)]
pub struct Cli {
    /// Text of the user message
    pub prompt: String,

    /// Chat completions URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// API key (overrides CHAT_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// System message sent before the prompt
    #[arg(long)]
    pub system: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Whole-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Logging level (e.g. info, debug)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Logging format
    #[arg(long, value_parser = ["pretty", "json"])]
    pub log_format: Option<String>,
}

impl Cli {
    /// Apply flags on top of the loaded configuration
    pub fn merge_into(&self, mut config: Config) -> Config {
        if let Some(endpoint) = &self.endpoint {
            config.chat.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            config.chat.model = model.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.chat.timeout_secs = Some(timeout);
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        config
    }

    /// Build the single request this run will send
    pub fn build_request(&self, config: &Config) -> Result<ChatRequest> {
        if config.api_key.is_empty() {
            bail!("API key is required: set CHAT_API_KEY or pass --api-key");
        }
        if config.chat.endpoint.trim().is_empty() {
            bail!("Endpoint is required: set CHAT_ENDPOINT or pass --endpoint");
        }

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system.clone()));
        }
        messages.push(Message::user(self.prompt.clone()));

        let mut options = ChatOptions::new();
        if let Some(temp) = self.temperature {
            options = options.temperature(temp);
        }
        if let Some(tokens) = self.max_tokens {
            options = options.max_tokens(tokens);
        }

        Ok(ChatRequest::new(&config.chat.endpoint, &config.api_key, &config.chat.model, messages)
            .with_options(options))
    }
}

pub fn timeout(config: &Config) -> Option<Duration> {
    config.chat.timeout_secs.map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstream_llm::Role;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("chatstream").chain(args.iter().copied())).unwrap()
    }

    fn config_with_key() -> Config {
        Config {
            api_key: "sk-env".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_prompt_required() {
        assert!(Cli::try_parse_from(["chatstream"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&["--model", "gpt-4", "--api-key", "sk-flag", "--timeout-secs", "30", "hi"]);
        let config = cli.merge_into(config_with_key());

        assert_eq!(config.chat.model, "gpt-4");
        assert_eq!(config.api_key, "sk-flag");
        assert_eq!(timeout(&config), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let cli = parse(&["hi"]);
        let err = cli.build_request(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("CHAT_API_KEY"));
    }

    #[test]
    fn test_request_messages_in_order() {
        let cli = parse(&["--system", "be brief", "hello"]);
        let request = cli.build_request(&config_with_key()).unwrap();

        let roles: Vec<Role> = request.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert_eq!(request.messages()[1].content, "hello");
        assert_eq!(request.api_key(), "sk-env");
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let result = Cli::try_parse_from(["chatstream", "--log-format", "xml", "hi"]);
        assert!(result.is_err());
    }
}
