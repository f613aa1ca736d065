use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiSettings, ImageInput, ReqwestApi, TutorApi};
use crate::live::{run_live, LiveSettings};
use crate::persist::AtomicFileWriter;
use crate::poll::run_history_poller;
use crate::sink::{ChannelEventSink, EventSink};
use crate::wire::{AskRequest, InteractRequest};
use crate::{ApiError, ApiReply, EngineEvent, FailureKind, RequestId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    /// Where synthesized speech clips are written.
    pub output_dir: PathBuf,
}

/// One backend request; its outcome arrives as [`EngineEvent::Completed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Ask(AskRequest),
    Upload { path: PathBuf },
    Multimodal { question: String, image: ImageInput },
    Interact(InteractRequest),
    Interrupt { agent_name: String },
    History { student_id: String },
    AgentStatus,
    Speech { text: String },
}

enum EngineCommand {
    Call { request_id: RequestId, call: ApiCall },
    SetHeaders(Vec<(String, String)>),
    StartLive(LiveSettings),
    StartPolling { student_id: String, every: Duration },
    Shutdown,
}

#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestApi::new(config.api)?);
        let writer = AtomicFileWriter::new(config.output_dir);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
            let mut worker = Worker {
                api,
                writer,
                sink,
                runtime,
                live: None,
                polling: None,
            };
            while let Ok(command) = cmd_rx.recv() {
                if !worker.handle(command) {
                    break;
                }
            }
            worker.stop_background();
            engine_info!("Engine stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn call(&self, request_id: RequestId, call: ApiCall) {
        let _ = self.cmd_tx.send(EngineCommand::Call { request_id, call });
    }

    /// Replaces the extra headers sent with every request.
    pub fn set_headers(&self, headers: Vec<(String, String)>) {
        let _ = self.cmd_tx.send(EngineCommand::SetHeaders(headers));
    }

    /// Starts (or restarts) the live socket subscription.
    pub fn start_live(&self, settings: LiveSettings) {
        let _ = self.cmd_tx.send(EngineCommand::StartLive(settings));
    }

    /// Starts (or restarts) periodic history polling for `student_id`.
    pub fn start_polling(&self, student_id: impl Into<String>, every: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::StartPolling {
            student_id: student_id.into(),
            every,
        });
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

struct Worker {
    api: Arc<ReqwestApi>,
    writer: AtomicFileWriter,
    sink: Arc<dyn EventSink>,
    runtime: tokio::runtime::Runtime,
    live: Option<CancellationToken>,
    polling: Option<CancellationToken>,
}

impl Worker {
    /// Returns `false` once the engine should stop.
    fn handle(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::Call { request_id, call } => {
                let api = self.api.clone();
                let writer = self.writer.clone();
                let sink = self.sink.clone();
                self.runtime.spawn(async move {
                    let result = execute(api.as_ref(), &writer, request_id, call).await;
                    sink.emit(EngineEvent::Completed { request_id, result });
                });
            }
            EngineCommand::SetHeaders(headers) => {
                engine_debug!("Applying {} credential headers", headers.len());
                self.api.set_headers(&headers);
            }
            EngineCommand::StartLive(settings) => {
                let cancel = replace_token(&mut self.live);
                let sink = self.sink.clone();
                self.runtime.spawn(run_live(settings, sink, cancel));
            }
            EngineCommand::StartPolling { student_id, every } => {
                let cancel = replace_token(&mut self.polling);
                let api: Arc<dyn TutorApi> = self.api.clone();
                let sink = self.sink.clone();
                self.runtime
                    .spawn(run_history_poller(api, student_id, every, sink, cancel));
            }
            EngineCommand::Shutdown => return false,
        }
        true
    }

    fn stop_background(&mut self) {
        for token in [self.live.take(), self.polling.take()].into_iter().flatten() {
            token.cancel();
        }
    }
}

fn replace_token(slot: &mut Option<CancellationToken>) -> CancellationToken {
    if let Some(previous) = slot.take() {
        previous.cancel();
    }
    let token = CancellationToken::new();
    *slot = Some(token.clone());
    token
}

async fn execute(
    api: &dyn TutorApi,
    writer: &AtomicFileWriter,
    request_id: RequestId,
    call: ApiCall,
) -> Result<ApiReply, ApiError> {
    match call {
        ApiCall::Ask(request) => api.ask(&request).await.map(ApiReply::Text),
        ApiCall::Upload { path } => api.upload_file(&path).await.map(ApiReply::Uploaded),
        ApiCall::Multimodal { question, image } => {
            api.ask_multimodal(&question, &image).await.map(ApiReply::Text)
        }
        ApiCall::Interact(request) => api.interact(&request).await.map(ApiReply::Text),
        ApiCall::Interrupt { agent_name } => api.interrupt(&agent_name).await.map(ApiReply::Text),
        ApiCall::History { student_id } => api.history(&student_id).await.map(ApiReply::History),
        ApiCall::AgentStatus => api.agent_status().await.map(ApiReply::Status),
        ApiCall::Speech { text } => {
            let audio = api.text_to_speech(&text).await?;
            let filename = format!("speech-{request_id}.{}", audio.extension());
            let bytes = audio.bytes.len() as u64;
            let writer = writer.clone();
            let path = tokio::task::spawn_blocking(move || {
                writer.write_bytes(&filename, &audio.bytes)
            })
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
            engine_info!("Saved speech clip {} ({} bytes)", path.display(), bytes);
            Ok(ApiReply::Speech { path, bytes })
        }
    }
}
