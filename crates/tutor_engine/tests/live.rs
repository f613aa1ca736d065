use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::SinkExt;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tutor_engine::{
    run_live, EngineEvent, EventSink, LiveEvent, LiveSettings, ServerFrame, WireMessage,
};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Accepts one socket client, sends `frames` and closes.
async fn serve_once(frames: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();
        for frame in frames {
            socket.send(Message::text(frame)).await.unwrap();
        }
        socket.close(None).await.unwrap();
    });
    url
}

#[tokio::test]
async fn frames_are_forwarded_until_server_closes() {
    let url = serve_once(vec![
        r#"{"type":"message","data":{"id":4,"sender":"teacher_agent","content":"Hello"}}"#,
        "not json at all",
        r#"{"type":"agent_status","data":{"teacher_agent":{"status":"online"}}}"#,
    ])
    .await;

    let sink = Arc::new(TestSink::default());
    let settings = LiveSettings {
        url,
        reconnect_delay: None,
    };
    tokio::time::timeout(
        Duration::from_secs(5),
        run_live(settings, sink.clone(), CancellationToken::new()),
    )
    .await
    .unwrap();

    let events = sink.take();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], EngineEvent::Live(LiveEvent::Connected));
    assert_eq!(
        events[1],
        EngineEvent::Live(LiveEvent::Frame(ServerFrame::Message(WireMessage {
            id: Some(4),
            sender: Some("teacher_agent".to_string()),
            content: Some("Hello".to_string()),
            ..WireMessage::default()
        })))
    );
    assert!(matches!(
        &events[2],
        EngineEvent::Live(LiveEvent::Frame(ServerFrame::AgentStatus(map))) if map.contains_key("teacher_agent")
    ));
    assert!(matches!(
        events[3],
        EngineEvent::Live(LiveEvent::Disconnected { .. })
    ));
}

#[tokio::test]
async fn refused_connection_reports_disconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    drop(listener);

    let sink = Arc::new(TestSink::default());
    let settings = LiveSettings {
        url,
        reconnect_delay: None,
    };
    run_live(settings, sink.clone(), CancellationToken::new()).await;

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        EngineEvent::Live(LiveEvent::Disconnected { reason: Some(_) })
    ));
}

#[tokio::test]
async fn cancellation_stops_reconnect_loop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    drop(listener);

    let sink = Arc::new(TestSink::default());
    let cancel = CancellationToken::new();
    let settings = LiveSettings {
        url,
        reconnect_delay: Some(Duration::from_millis(20)),
    };
    let task = tokio::spawn(run_live(settings, sink.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(120)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap();

    let disconnects = sink.take().len();
    assert!(disconnects >= 2, "expected retries, saw {disconnects}");
}
