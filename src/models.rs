//! Data models and configuration
//!
//! Defines the chat message types shared across handlers and providers,
//! plus the process-wide configuration read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Chat role as understood by the completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation sent to a chat model.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub environment: Environment,
    pub bind_addr: SocketAddr,
    /// Model for the plain text endpoint.
    pub chat_model: String,
    /// JSON-mode model for adventure turns.
    pub turn_model: String,
    pub image_model: String,
    /// Hard cap on story length; the server forces an ending at this turn.
    pub max_turns: usize,
    /// Upper bound on inbound history, so replayed requests stay small.
    pub max_history_turns: usize,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("development") => Environment::Development,
            _ => Environment::Production,
        };

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .map_err(|e| crate::Error::Generic(format!("Invalid BIND_ADDR: {}", e)))?;

        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| crate::Error::Generic("OPENAI_API_KEY not set".to_string()))?,
            environment,
            bind_addr,
            chat_model: std::env::var("CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            turn_model: std::env::var("TURN_MODEL")
                .unwrap_or_else(|_| "gpt-4-1106-preview".to_string()),
            image_model: std::env::var("IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string()),
            max_turns: parse_env_count("MAX_TURNS", 3)?,
            max_history_turns: parse_env_count("MAX_HISTORY_TURNS", 20)?,
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        })
    }
}

fn parse_env_count(name: &str, default: usize) -> crate::Result<usize> {
    match std::env::var(name) {
        Ok(raw) => {
            let value: usize = raw
                .parse()
                .map_err(|_| crate::Error::Generic(format!("{} must be a number: {}", name, raw)))?;
            if value == 0 {
                return Err(crate::Error::Generic(format!("{} must be at least 1", name)));
            }
            Ok(value)
        }
        Err(_) => Ok(default),
    }
}
