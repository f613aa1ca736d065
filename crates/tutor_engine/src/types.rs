use std::fmt;
use std::path::PathBuf;

use crate::wire::{ServerFrame, WireMessage, WireStatusMap};

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Live(LiveEvent),
    HistoryPolled(Result<Vec<WireMessage>, ApiError>),
    Completed {
        request_id: RequestId,
        result: Result<ApiReply, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEvent {
    Connected,
    Frame(ServerFrame),
    Disconnected { reason: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    /// Answer or acknowledgement text extracted from a JSON reply.
    Text(String),
    Uploaded(UploadReceipt),
    Speech { path: PathBuf, bytes: u64 },
    History(Vec<WireMessage>),
    Status(WireStatusMap),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_name: String,
    pub bytes: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    TooLarge { max_bytes: u64, actual: u64 },
    UnsupportedFile { extension: Option<String> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unreadable response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "file too large (max {max_bytes} bytes, got {actual})")
            }
            FailureKind::UnsupportedFile { extension: Some(ext) } => {
                write!(f, "unsupported file type .{ext}")
            }
            FailureKind::UnsupportedFile { extension: None } => {
                write!(f, "unsupported file type")
            }
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
