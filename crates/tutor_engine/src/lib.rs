//! Tutor chat engine: backend HTTP calls, live socket, polling and file output.
mod api;
mod engine;
mod live;
mod persist;
mod poll;
mod sink;
mod types;
mod wire;

pub use api::{ApiSettings, ImageInput, ReqwestApi, SpeechAudio, TutorApi, UploadSettings};
pub use engine::{ApiCall, EngineConfig, EngineHandle};
pub use live::{run_live, LiveSettings};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use poll::run_history_poller;
pub use sink::{ChannelEventSink, EventSink};
pub use types::{ApiError, ApiReply, EngineEvent, FailureKind, LiveEvent, RequestId, UploadReceipt};
pub use wire::{
    decode_frame, AskRequest, InteractRequest, MultimodalRequest, ServerFrame, WireMessage,
    WireStatus, WireStatusMap,
};
