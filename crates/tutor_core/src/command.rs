use std::fmt;
use std::path::PathBuf;

use crate::catalog::{self, InteractAction};
use crate::credentials::CredentialKey;
use crate::message::ImageSource;

pub const HELP_TEXT: &str = "Commands: /agent <name>, /topic [name], /upload <path>, \
/image <url-or-path> <question>, /interact <action> [content], /interrupt, /speak, \
/history, /status, /key <name> <value>, /help. Plain text asks the selected agent.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    SelectAgent(String),
    SelectTopic(Option<String>),
    Upload(PathBuf),
    Image { source: ImageSource, question: String },
    Interact { action: InteractAction, content: String },
    Interrupt,
    Speak,
    History,
    Status,
    SetKey { key: CredentialKey, value: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Unknown(String),
    Usage(&'static str),
    UnknownAgent(String),
    UnknownTopic(String),
    UnknownAction(String),
    UnknownKey(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Unknown(name) => write!(f, "unknown command /{name} (try /help)"),
            CommandError::Usage(usage) => write!(f, "usage: {usage}"),
            CommandError::UnknownAgent(name) => write!(f, "unknown agent {name}"),
            CommandError::UnknownTopic(name) => write!(f, "unknown topic {name}"),
            CommandError::UnknownAction(name) => write!(f, "unknown interaction {name}"),
            CommandError::UnknownKey(name) => write!(f, "unknown credential {name}"),
        }
    }
}

/// Parses one submitted input line. Returns `None` for blank input.
pub fn parse_input(raw: &str) -> Option<Result<Command, CommandError>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Some(Ok(Command::Ask(trimmed.to_string())));
    };

    let (name, args) = split_word(rest);
    Some(parse_command(name, args))
}

fn parse_command(name: &str, args: &str) -> Result<Command, CommandError> {
    match name {
        "agent" => {
            let (agent, _) = split_word(args);
            if agent.is_empty() {
                return Err(CommandError::Usage("/agent <name>"));
            }
            catalog::find_agent(agent)
                .map(|info| Command::SelectAgent(info.id.to_string()))
                .ok_or_else(|| CommandError::UnknownAgent(agent.to_string()))
        }
        "topic" => {
            let (topic, _) = split_word(args);
            if topic.is_empty() {
                return Ok(Command::SelectTopic(None));
            }
            catalog::find_topic(topic)
                .map(|info| Command::SelectTopic(Some(info.id.to_string())))
                .ok_or_else(|| CommandError::UnknownTopic(topic.to_string()))
        }
        "upload" => {
            if args.is_empty() {
                return Err(CommandError::Usage("/upload <path>"));
            }
            Ok(Command::Upload(PathBuf::from(args)))
        }
        "image" => {
            let (source, question) = split_word(args);
            if source.is_empty() || question.is_empty() {
                return Err(CommandError::Usage("/image <url-or-path> <question>"));
            }
            Ok(Command::Image {
                source: ImageSource::classify(source),
                question: question.to_string(),
            })
        }
        "interact" => {
            let (action, content) = split_word(args);
            if action.is_empty() {
                return Err(CommandError::Usage("/interact <action> [content]"));
            }
            let action = InteractAction::parse(action)
                .ok_or_else(|| CommandError::UnknownAction(action.to_string()))?;
            Ok(Command::Interact {
                action,
                content: content.to_string(),
            })
        }
        "key" => {
            let (key, value) = split_word(args);
            if key.is_empty() {
                return Err(CommandError::Usage("/key <name> <value>"));
            }
            let key = CredentialKey::parse(key)
                .ok_or_else(|| CommandError::UnknownKey(key.to_string()))?;
            Ok(Command::SetKey {
                key,
                value: value.to_string(),
            })
        }
        "interrupt" => Ok(Command::Interrupt),
        "speak" => Ok(Command::Speak),
        "history" => Ok(Command::History),
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn split_word(raw: &str) -> (&str, &str) {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (raw, ""),
    }
}
