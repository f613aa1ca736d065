use std::collections::BTreeSet;
use std::path::PathBuf;

/// Server-assigned message id. Monotonic on the backend.
pub type Seq = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Maps a backend role string. The backend also writes `student` for
    /// user-originated interaction records; anything unrecognised is treated
    /// as an agent reply.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" | "student" => Role::User,
            "system" => Role::System,
            _ => Role::Assistant,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Path(PathBuf),
}

impl ImageSource {
    /// `http(s)` URLs are sent as-is; everything else is a local file.
    pub fn classify(raw: &str) -> Self {
        match url::Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                ImageSource::Url(raw.to_string())
            }
            _ => ImageSource::Path(PathBuf::from(raw)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ImageSource::Url(url) => url.clone(),
            ImageSource::Path(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    File { name: String, bytes: Option<u64> },
    Image { source: ImageSource, question: String },
    Audio { path: PathBuf, transcript: String },
    /// Failure notice produced locally when a request is rejected.
    Notice(String),
}

impl MessageBody {
    fn same_text(&self, other: &MessageBody) -> bool {
        match (self, other) {
            (MessageBody::Text(a), MessageBody::Text(b)) => a.trim() == b.trim(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub seq: Option<Seq>,
    pub sender: String,
    pub role: Role,
    pub body: MessageBody,
    pub timestamp: Option<String>,
}

impl ChatMessage {
    pub fn local(
        sender: impl Into<String>,
        role: Role,
        body: MessageBody,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            seq: None,
            sender: sender.into(),
            role,
            body,
            timestamp,
        }
    }

    pub fn is_notice(&self) -> bool {
        matches!(self.body, MessageBody::Notice(_))
    }
}

/// Outcome of merging a message into the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Appended,
    /// Placed before a later sequenced entry that arrived first.
    Inserted,
    /// Matched a local entry still waiting for its server id.
    Reconciled,
    Duplicate,
}

/// Ordered conversation log fed by local sends, socket pushes and history
/// polls. Server ids are the single deduplication key across all sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageLog {
    entries: Vec<ChatMessage>,
    seen: BTreeSet<Seq>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn merge(&mut self, message: ChatMessage) -> Merge {
        let Some(seq) = message.seq else {
            self.entries.push(message);
            return Merge::Appended;
        };
        if !self.seen.insert(seq) {
            return Merge::Duplicate;
        }

        let local = self.entries.iter().position(|entry| {
            entry.seq.is_none()
                && entry.sender == message.sender
                && entry.role == message.role
                && entry.body.same_text(&message.body)
        });
        if let Some(index) = local {
            let mut local = self.entries.remove(index);
            local.seq = Some(seq);
            if local.timestamp.is_none() {
                local.timestamp = message.timestamp;
            }
            self.insert_sequenced(local);
            return Merge::Reconciled;
        }

        if self.insert_sequenced(message) {
            Merge::Inserted
        } else {
            Merge::Appended
        }
    }

    /// Places a sequenced entry before the first entry with a higher seq.
    /// Returns whether it landed before the end of the log.
    fn insert_sequenced(&mut self, message: ChatMessage) -> bool {
        let seq = message.seq;
        let later = self
            .entries
            .iter()
            .position(|entry| entry.seq.is_some() && entry.seq > seq);
        match later {
            Some(index) => {
                self.entries.insert(index, message);
                true
            }
            None => {
                self.entries.push(message);
                false
            }
        }
    }

    pub fn last_assistant_text(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find_map(|entry| match (&entry.role, &entry.body) {
                (Role::Assistant, MessageBody::Text(text)) => Some(text.as_str()),
                _ => None,
            })
    }
}

