use std::path::PathBuf;

use crate::{Credentials, ImageSource, InteractAction, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Ask {
        request_id: RequestId,
        student_id: String,
        question: String,
        agent_name: String,
        topic: Option<String>,
    },
    UploadFile {
        request_id: RequestId,
        path: PathBuf,
    },
    AskMultimodal {
        request_id: RequestId,
        question: String,
        image: ImageSource,
    },
    Interact {
        request_id: RequestId,
        sender_id: String,
        receiver_id: String,
        action: InteractAction,
        content: String,
    },
    Interrupt {
        request_id: RequestId,
        agent_name: String,
    },
    FetchHistory {
        request_id: RequestId,
        student_id: String,
    },
    FetchAgentStatus {
        request_id: RequestId,
    },
    SynthesizeSpeech {
        request_id: RequestId,
        text: String,
    },
    /// Forward credentials to outgoing request headers.
    ApplyCredentials(Credentials),
    PersistCredentials(Credentials),
}
