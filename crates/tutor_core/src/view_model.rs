use crate::{ChatMessage, LiveState, StatusKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub student_id: String,
    pub input: String,
    pub selected_agent: String,
    pub agent_label: String,
    pub topic: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub agents: Vec<AgentStatusRow>,
    pub live: LiveState,
    pub pending_requests: usize,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatusRow {
    pub name: String,
    pub status: StatusKind,
    pub message: Option<String>,
}
