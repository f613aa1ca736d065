//! Tutor chat core: pure state machine and view-model helpers.
pub mod catalog;
mod command;
mod credentials;
mod effect;
mod message;
mod msg;
mod state;
mod status;
mod update;
mod view_model;

pub use catalog::{AgentInfo, InteractAction, TopicInfo, AGENTS, DEFAULT_AGENT, TOPICS};
pub use command::{parse_input, Command, CommandError, HELP_TEXT};
pub use credentials::{CredentialKey, Credentials, DEFAULT_MODEL_NAME};
pub use effect::Effect;
pub use message::{ChatMessage, ImageSource, Merge, MessageBody, MessageLog, Role, Seq};
pub use msg::{Msg, Reply};
pub use state::{AppState, LiveState, RequestId, DEFAULT_STUDENT_ID};
pub use status::{AgentStatus, AgentStatusMap, StatusKind};
pub use update::update;
pub use view_model::{AgentStatusRow, AppViewModel};
