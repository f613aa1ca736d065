use std::path::PathBuf;

use crate::{AgentStatusMap, ChatMessage, Credentials, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the input line.
    InputChanged(String),
    /// User pressed Enter on the input line.
    InputSubmitted,
    /// User asked for the next agent in the catalogue.
    AgentCycled,
    /// User asked for the next topic in the catalogue.
    TopicCycled,
    /// Credentials read from local storage at startup.
    CredentialsLoaded(Credentials),
    /// Outcome of writing credentials to local storage.
    CredentialsSaved(Result<(), String>),
    /// Wall clock reading used to stamp locally created messages.
    ClockAdvanced(String),
    /// Live socket opened.
    LiveConnected,
    /// Live socket closed or failed to open.
    LiveDisconnected { reason: Option<String> },
    /// Chat message pushed over the live socket.
    ServerMessage(ChatMessage),
    /// Agent status snapshot pushed over the live socket.
    StatusSnapshot(AgentStatusMap),
    /// Result of the periodic history poll.
    HistoryPolled(Result<Vec<ChatMessage>, String>),
    /// A request started by an effect succeeded.
    RequestSucceeded { request_id: RequestId, reply: Reply },
    /// A request started by an effect failed.
    RequestFailed { request_id: RequestId, error: String },
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Uploaded { message: String, bytes: u64 },
    Speech { path: PathBuf },
    History(Vec<ChatMessage>),
    Status(AgentStatusMap),
}
