use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tutor_engine::{
    run_history_poller, ApiError, AskRequest, EngineEvent, EventSink, FailureKind, ImageInput,
    InteractRequest, SpeechAudio, TutorApi, UploadReceipt, WireMessage, WireStatusMap,
};

fn unused() -> ApiError {
    ApiError {
        kind: FailureKind::Network,
        message: "not used in this test".to_string(),
    }
}

/// Serves history from a script; every other endpoint fails.
struct ScriptedApi {
    calls: AtomicUsize,
    fail_on: usize,
}

#[async_trait]
impl TutorApi for ScriptedApi {
    async fn ask(&self, _request: &AskRequest) -> Result<String, ApiError> {
        Err(unused())
    }

    async fn upload_file(&self, _path: &Path) -> Result<UploadReceipt, ApiError> {
        Err(unused())
    }

    async fn ask_multimodal(
        &self,
        _question: &str,
        _image: &ImageInput,
    ) -> Result<String, ApiError> {
        Err(unused())
    }

    async fn interact(&self, _request: &InteractRequest) -> Result<String, ApiError> {
        Err(unused())
    }

    async fn interrupt(&self, _agent_name: &str) -> Result<String, ApiError> {
        Err(unused())
    }

    async fn history(&self, student_id: &str) -> Result<Vec<WireMessage>, ApiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(ApiError {
                kind: FailureKind::HttpStatus(503),
                message: "busy".to_string(),
            });
        }
        Ok(vec![WireMessage {
            id: Some(call as u64),
            student_id: Some(student_id.to_string()),
            content: Some(format!("poll {call}")),
            ..WireMessage::default()
        }])
    }

    async fn messages(&self) -> Result<Vec<WireMessage>, ApiError> {
        Err(unused())
    }

    async fn agent_status(&self) -> Result<WireStatusMap, ApiError> {
        Err(unused())
    }

    async fn text_to_speech(&self, _text: &str) -> Result<SpeechAudio, ApiError> {
        Err(unused())
    }
}

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[tokio::test(start_paused = true)]
async fn poller_reports_each_round_including_failures() {
    let api = Arc::new(ScriptedApi {
        calls: AtomicUsize::new(0),
        fail_on: 2,
    });
    let sink = Arc::new(TestSink::default());
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_history_poller(
        api.clone(),
        "student_1".to_string(),
        Duration::from_secs(5),
        sink.clone(),
        cancel.clone(),
    ));

    // First poll is immediate, then one every five seconds.
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    cancel.cancel();
    task.await.unwrap();

    let events = sink.events.lock().unwrap().clone();
    assert_eq!(events.len(), 3);
    match &events[0] {
        EngineEvent::HistoryPolled(Ok(messages)) => {
            assert_eq!(messages[0].student_id.as_deref(), Some("student_1"));
            assert_eq!(messages[0].content.as_deref(), Some("poll 1"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(
        &events[1],
        EngineEvent::HistoryPolled(Err(err)) if err.kind == FailureKind::HttpStatus(503)
    ));
    assert!(matches!(&events[2], EngineEvent::HistoryPolled(Ok(_))));
    assert_eq!(api.calls.load(Ordering::SeqCst), 3);
}
