use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tutor_core::{
    AgentStatus, AgentStatusMap, ChatMessage, CredentialKey, Credentials, Effect, ImageSource,
    MessageBody, Msg, Reply, Role, StatusKind,
};
use tutor_engine::{
    ApiCall, ApiReply, AskRequest, EngineEvent, EngineHandle, ImageInput, InteractRequest,
    LiveEvent, ServerFrame, WireMessage, WireStatusMap,
};

use super::app::LoopEvent;
use super::persistence;

/// Executes core effects against the engine and feeds engine events back
/// into the loop as core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    data_dir: PathBuf,
    loop_tx: mpsc::Sender<LoopEvent>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, data_dir: PathBuf, loop_tx: mpsc::Sender<LoopEvent>) -> Self {
        let runner = Self {
            engine,
            data_dir,
            loop_tx,
        };
        runner.spawn_event_loop(runner.loop_tx.clone());
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Ask {
                    request_id,
                    student_id,
                    question,
                    agent_name,
                    topic,
                } => {
                    engine_info!(
                        "Ask request_id={} agent={} question_len={}",
                        request_id,
                        agent_name,
                        question.len()
                    );
                    self.engine.call(
                        request_id,
                        ApiCall::Ask(AskRequest {
                            student_id,
                            question,
                            agent_name,
                            topic,
                        }),
                    );
                }
                Effect::UploadFile { request_id, path } => {
                    engine_info!("Upload request_id={} path={:?}", request_id, path);
                    self.engine.call(request_id, ApiCall::Upload { path });
                }
                Effect::AskMultimodal {
                    request_id,
                    question,
                    image,
                } => {
                    let image = match image {
                        ImageSource::Url(url) => ImageInput::Url(url),
                        ImageSource::Path(path) => ImageInput::Path(path),
                    };
                    self.engine
                        .call(request_id, ApiCall::Multimodal { question, image });
                }
                Effect::Interact {
                    request_id,
                    sender_id,
                    receiver_id,
                    action,
                    content,
                } => {
                    self.engine.call(
                        request_id,
                        ApiCall::Interact(InteractRequest {
                            sender_id,
                            receiver_id,
                            action: action.as_str().to_string(),
                            content,
                        }),
                    );
                }
                Effect::Interrupt {
                    request_id,
                    agent_name,
                } => {
                    engine_info!("Interrupt request_id={} agent={}", request_id, agent_name);
                    self.engine
                        .call(request_id, ApiCall::Interrupt { agent_name });
                }
                Effect::FetchHistory {
                    request_id,
                    student_id,
                } => {
                    self.engine
                        .call(request_id, ApiCall::History { student_id });
                }
                Effect::FetchAgentStatus { request_id } => {
                    self.engine.call(request_id, ApiCall::AgentStatus);
                }
                Effect::SynthesizeSpeech { request_id, text } => {
                    self.engine.call(request_id, ApiCall::Speech { text });
                }
                Effect::ApplyCredentials(credentials) => {
                    self.engine.set_headers(credential_headers(&credentials));
                }
                Effect::PersistCredentials(credentials) => {
                    let outcome = persistence::save_credentials(&self.data_dir, &credentials)
                        .map(|_| ())
                        .map_err(|err| err.to_string());
                    let _ = self
                        .loop_tx
                        .send(LoopEvent::Core(Msg::CredentialsSaved(outcome)));
                }
            }
        }
    }

    fn spawn_event_loop(&self, loop_tx: mpsc::Sender<LoopEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if loop_tx.send(LoopEvent::Core(engine_event_to_msg(event))).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn header_name(key: CredentialKey) -> &'static str {
    match key {
        CredentialKey::ModelScope => "X-ModelScope-Api-Key",
        CredentialKey::FishAudio => "X-Fish-Audio-Api-Key",
        CredentialKey::FishAudioUrl => "X-Fish-Audio-Url",
        CredentialKey::Chunkr => "X-Chunkr-Api-Key",
        CredentialKey::Firecrawl => "X-Firecrawl-Api-Key",
        CredentialKey::ModelName => "X-Model-Name",
    }
}

pub(crate) fn credential_headers(credentials: &Credentials) -> Vec<(String, String)> {
    credentials
        .present()
        .into_iter()
        .map(|(key, value)| (header_name(key).to_string(), value.to_string()))
        .collect()
}

pub(crate) fn engine_event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Live(LiveEvent::Connected) => Msg::LiveConnected,
        EngineEvent::Live(LiveEvent::Disconnected { reason }) => {
            engine_debug!("Live socket down: {:?}", reason);
            Msg::LiveDisconnected { reason }
        }
        EngineEvent::Live(LiveEvent::Frame(ServerFrame::Message(message))) => {
            Msg::ServerMessage(to_chat_message(message))
        }
        EngineEvent::Live(LiveEvent::Frame(ServerFrame::AgentStatus(status))) => {
            Msg::StatusSnapshot(to_status_map(status))
        }
        EngineEvent::HistoryPolled(result) => Msg::HistoryPolled(
            result
                .map(|messages| messages.into_iter().map(to_chat_message).collect())
                .map_err(|err| err.to_string()),
        ),
        EngineEvent::Completed {
            request_id,
            result: Ok(reply),
        } => Msg::RequestSucceeded {
            request_id,
            reply: to_reply(reply),
        },
        EngineEvent::Completed {
            request_id,
            result: Err(err),
        } => {
            engine_warn!("Request {} failed: {}", request_id, err);
            Msg::RequestFailed {
                request_id,
                error: err.to_string(),
            }
        }
    }
}

/// A missing role is inferred from the sender: the student's own id means
/// a user message, `system` a system message, anything else an agent.
fn to_chat_message(message: WireMessage) -> ChatMessage {
    let sender = message.sender.unwrap_or_else(|| "unknown".to_string());
    let role = match message.role.as_deref() {
        Some(raw) => Role::parse(raw),
        None if message.student_id.as_deref() == Some(sender.as_str()) => Role::User,
        None => Role::parse(&sender),
    };
    ChatMessage {
        seq: message.id,
        sender,
        role,
        body: MessageBody::Text(message.content.unwrap_or_default()),
        timestamp: message.timestamp,
    }
}

fn to_status_map(status: WireStatusMap) -> AgentStatusMap {
    status
        .into_iter()
        .map(|(name, entry)| {
            let status = AgentStatus {
                status: StatusKind::parse(&entry.status),
                message: entry.message,
            };
            (name, status)
        })
        .collect()
}

fn to_reply(reply: ApiReply) -> Reply {
    match reply {
        ApiReply::Text(text) => Reply::Text(text),
        ApiReply::Uploaded(receipt) => Reply::Uploaded {
            message: receipt.message,
            bytes: receipt.bytes,
        },
        ApiReply::Speech { path, .. } => Reply::Speech { path },
        ApiReply::History(messages) => {
            Reply::History(messages.into_iter().map(to_chat_message).collect())
        }
        ApiReply::Status(status) => Reply::Status(to_status_map(status)),
    }
}
