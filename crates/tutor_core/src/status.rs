use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Online,
    Busy,
    Offline,
    Unknown(String),
}

impl StatusKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "online" => StatusKind::Online,
            "busy" => StatusKind::Busy,
            "offline" => StatusKind::Offline,
            _ => StatusKind::Unknown(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StatusKind::Online => "online",
            StatusKind::Busy => "busy",
            StatusKind::Offline => "offline",
            StatusKind::Unknown(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    pub status: StatusKind,
    pub message: Option<String>,
}

/// Agent name to its last reported status. Replaced wholesale on every push.
pub type AgentStatusMap = BTreeMap<String, AgentStatus>;
