use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tutor_engine::{ApiSettings, EngineConfig, EngineEvent, EngineHandle};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event(engine: &EngineHandle) -> Option<EngineEvent> {
    for _ in 0..250 {
        if let Some(event) = engine.try_recv() {
            return Some(event);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

#[tokio::test]
async fn headers_set_before_polling_reach_the_first_poll() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/student_1"))
        .and(header("X-ModelScope-Api-Key", "ms-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "missing key"})))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let engine = EngineHandle::new(EngineConfig {
        api: ApiSettings {
            base_url: server.uri(),
            ..ApiSettings::default()
        },
        output_dir: temp.path().to_path_buf(),
    })
    .unwrap();

    engine.set_headers(vec![("X-ModelScope-Api-Key".to_string(), "ms-key".to_string())]);
    engine.start_polling("student_1", Duration::from_secs(60));

    let event = next_event(&engine).await.expect("first poll result");
    engine.shutdown();
    assert_eq!(event, EngineEvent::HistoryPolled(Ok(Vec::new())));
}
