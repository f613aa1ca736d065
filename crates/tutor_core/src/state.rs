use std::collections::BTreeMap;

use crate::view_model::{AgentStatusRow, AppViewModel};
use crate::{
    catalog, AgentStatusMap, ChatMessage, Credentials, Merge, MessageBody, MessageLog, Role,
};

pub type RequestId = u64;

pub const DEFAULT_STUDENT_ID: &str = "student_1";
pub(crate) const SYSTEM_SENDER: &str = "system";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveState {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// What an in-flight request was for, so its reply lands in the right place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingRequest {
    Ask { agent_name: String },
    Upload { file_name: String },
    Multimodal,
    Interact,
    Interrupt,
    History,
    Status,
    Speech { text: String },
}

impl PendingRequest {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            PendingRequest::Ask { .. } => "Question",
            PendingRequest::Upload { .. } => "Upload",
            PendingRequest::Multimodal => "Image question",
            PendingRequest::Interact => "Interaction",
            PendingRequest::Interrupt => "Interrupt",
            PendingRequest::History => "History request",
            PendingRequest::Status => "Status request",
            PendingRequest::Speech { .. } => "Speech synthesis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    student_id: String,
    input: String,
    selected_agent: String,
    topic: Option<String>,
    log: MessageLog,
    agents: AgentStatusMap,
    credentials: Credentials,
    live: LiveState,
    pending: BTreeMap<RequestId, PendingRequest>,
    next_request_id: RequestId,
    last_error: Option<String>,
    now: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_student(DEFAULT_STUDENT_ID)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            input: String::new(),
            selected_agent: catalog::DEFAULT_AGENT.to_string(),
            topic: None,
            log: MessageLog::new(),
            agents: AgentStatusMap::new(),
            credentials: Credentials::default(),
            live: LiveState::default(),
            pending: BTreeMap::new(),
            next_request_id: 1,
            last_error: None,
            now: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            student_id: self.student_id.clone(),
            input: self.input.clone(),
            selected_agent: self.selected_agent.clone(),
            agent_label: catalog::find_agent(&self.selected_agent)
                .map(|agent| agent.label.to_string())
                .unwrap_or_else(|| self.selected_agent.clone()),
            topic: self.topic.clone(),
            messages: self.log.entries().to_vec(),
            agents: self
                .agents
                .iter()
                .map(|(name, status)| AgentStatusRow {
                    name: name.clone(),
                    status: status.status.clone(),
                    message: status.message.clone(),
                })
                .collect(),
            live: self.live,
            pending_requests: self.pending.len(),
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.entries()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns whether a redraw is needed and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn student_id(&self) -> &str {
        &self.student_id
    }

    pub(crate) fn selected_agent(&self) -> &str {
        &self.selected_agent
    }

    pub(crate) fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub(crate) fn set_input(&mut self, input: String) {
        if self.input != input {
            self.input = input;
            self.mark_dirty();
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn take_input(&mut self) -> String {
        self.mark_dirty();
        std::mem::take(&mut self.input)
    }

    pub(crate) fn select_agent(&mut self, agent: impl Into<String>) {
        self.selected_agent = agent.into();
        self.mark_dirty();
    }

    pub(crate) fn select_topic(&mut self, topic: Option<String>) {
        self.topic = topic;
        self.mark_dirty();
    }

    pub(crate) fn set_now(&mut self, now: String) {
        self.now = Some(now);
    }

    pub(crate) fn set_live(&mut self, live: LiveState) {
        if self.live != live {
            self.live = live;
            self.mark_dirty();
        }
    }

    pub(crate) fn replace_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
        self.mark_dirty();
    }

    pub(crate) fn credentials_mut(&mut self) -> &mut Credentials {
        self.mark_dirty();
        &mut self.credentials
    }

    pub(crate) fn replace_agent_status(&mut self, agents: AgentStatusMap) {
        self.agents = agents;
        self.mark_dirty();
    }

    pub(crate) fn begin_request(&mut self, pending: PendingRequest) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.pending.insert(id, pending);
        self.mark_dirty();
        id
    }

    pub(crate) fn finish_request(&mut self, request_id: RequestId) -> Option<PendingRequest> {
        let pending = self.pending.remove(&request_id);
        if pending.is_some() {
            self.mark_dirty();
        }
        pending
    }

    /// Appends a locally created entry stamped with the latest clock reading.
    pub(crate) fn push_local(&mut self, sender: &str, role: Role, body: MessageBody) {
        let message = ChatMessage::local(sender, role, body, self.now.clone());
        self.log.merge(message);
        self.mark_dirty();
    }

    pub(crate) fn merge_remote(&mut self, message: ChatMessage) {
        if self.log.merge(message) != Merge::Duplicate {
            self.mark_dirty();
        }
    }

    pub(crate) fn last_assistant_text(&self) -> Option<String> {
        self.log.last_assistant_text().map(ToOwned::to_owned)
    }

    /// Records a failure both in the log and in the status line.
    pub(crate) fn push_notice(&mut self, text: String) {
        self.last_error = Some(text.clone());
        self.push_local(SYSTEM_SENDER, Role::System, MessageBody::Notice(text));
    }

    pub(crate) fn set_last_error(&mut self, error: Option<String>) {
        if self.last_error != error {
            self.last_error = error;
            self.mark_dirty();
        }
    }
}
