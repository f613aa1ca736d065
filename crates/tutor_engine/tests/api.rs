use std::fs;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tutor_engine::{
    ApiSettings, AskRequest, FailureKind, ImageInput, InteractRequest, ReqwestApi, TutorApi,
    WireMessage, WireStatus,
};
use wiremock::matchers::{
    body_json, body_string_contains, header, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .unwrap()
}

fn ask_request() -> AskRequest {
    AskRequest {
        student_id: "student_1".to_string(),
        question: "What is chlorophyll?".to_string(),
        agent_name: "teacher_agent".to_string(),
        topic: Some("photosynthesis".to_string()),
    }
}

#[tokio::test]
async fn ask_posts_json_with_credential_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .and(header("X-ModelScope-Api-Key", "ms-key"))
        .and(body_json(json!({
            "student_id": "student_1",
            "question": "What is chlorophyll?",
            "agent_name": "teacher_agent",
            "topic": "photosynthesis",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "A pigment."})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.set_headers(&[("X-ModelScope-Api-Key".to_string(), "ms-key".to_string())]);

    let answer = api.ask(&ask_request()).await.unwrap();
    assert_eq!(answer, "A pigment.");
}

#[tokio::test]
async fn ask_falls_back_to_message_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"answer": "", "message": "Queued."})),
        )
        .mount(&server)
        .await;

    let answer = api_for(&server).ask(&ask_request()).await.unwrap();
    assert_eq!(answer, "Queued.");
}

#[tokio::test]
async fn reply_without_text_fields_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let err = api_for(&server).ask(&ask_request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn http_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ask"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "model unavailable"})),
        )
        .mount(&server)
        .await;

    let err = api_for(&server).ask(&ask_request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "model unavailable");
    assert_eq!(err.to_string(), "http status 500: model unavailable");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let api = ReqwestApi::new(ApiSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        ..ApiSettings::default()
    })
    .unwrap();

    let err = api.ask(&ask_request()).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[tokio::test]
async fn upload_sends_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload_pdf"))
        .and(body_string_contains("filename=\"notes.pdf\""))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Indexed notes.pdf"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = temp.path().join("notes.pdf");
    fs::write(&file, b"%PDF-1.4 tiny").unwrap();

    let receipt = api_for(&server).upload_file(&file).await.unwrap();
    assert_eq!(receipt.file_name, "notes.pdf");
    assert_eq!(receipt.bytes, 13);
    assert_eq!(receipt.message, "Indexed notes.pdf");
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = temp.path().join("big.pdf");
    fs::write(&file, vec![0u8; 2048]).unwrap();

    let mut settings = ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    };
    settings.upload.max_bytes = 1024;
    let api = ReqwestApi::new(settings).unwrap();

    let err = api.upload_file(&file).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 1024,
            actual: 2048
        }
    );
}

#[tokio::test]
async fn unsupported_extension_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let file = temp.path().join("script.exe");
    fs::write(&file, b"MZ").unwrap();

    let err = api_for(&server).upload_file(&file).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedFile {
            extension: Some("exe".to_string())
        }
    );
}

#[tokio::test]
async fn multimodal_sends_image_url_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/multimodal"))
        .and(body_json(json!({
            "question": "What is shown?",
            "image": "https://img.example/leaf.png",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "A leaf."})))
        .mount(&server)
        .await;

    let answer = api_for(&server)
        .ask_multimodal(
            "What is shown?",
            &ImageInput::Url("https://img.example/leaf.png".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(answer, "A leaf.");
}

#[tokio::test]
async fn multimodal_encodes_local_image_as_base64() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/multimodal"))
        .and(body_json(json!({"question": "Describe", "image": "aGVsbG8="})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let image = temp.path().join("leaf.png");
    fs::write(&image, b"hello").unwrap();

    let answer = api_for(&server)
        .ask_multimodal("Describe", &ImageInput::Path(image))
        .await
        .unwrap();
    assert_eq!(answer, "ok");
}

#[tokio::test]
async fn interact_posts_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interact"))
        .and(body_json(json!({
            "sender_id": "student_1",
            "receiver_id": "student_agent_1",
            "action": "discuss",
            "content": "Let's compare notes",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Delivered"})))
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .interact(&InteractRequest {
            sender_id: "student_1".to_string(),
            receiver_id: "student_agent_1".to_string(),
            action: "discuss".to_string(),
            content: "Let's compare notes".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(reply, "Delivered");
}

#[tokio::test]
async fn interrupt_passes_agent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/interrupt"))
        .and(query_param("agent_name", "teacher_agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Interrupted"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api_for(&server).interrupt("teacher_agent").await.unwrap();
    assert_eq!(reply, "Interrupted");
}

#[tokio::test]
async fn history_reads_messages_for_student() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history/student_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"id": 7, "sender": "student_1", "role": "user", "content": "Hi", "timestamp": "2024-05-01T10:00:00"},
                {"id": 8, "sender": "teacher_agent", "content": "Hello"}
            ]
        })))
        .mount(&server)
        .await;

    let messages = api_for(&server).history("student_1").await.unwrap();
    assert_eq!(
        messages,
        vec![
            WireMessage {
                id: Some(7),
                student_id: None,
                sender: Some("student_1".to_string()),
                role: Some("user".to_string()),
                content: Some("Hi".to_string()),
                timestamp: Some("2024-05-01T10:00:00".to_string()),
            },
            WireMessage {
                id: Some(8),
                sender: Some("teacher_agent".to_string()),
                content: Some("Hello".to_string()),
                ..WireMessage::default()
            },
        ]
    );
}

#[tokio::test]
async fn messages_endpoint_tolerates_missing_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let messages = api_for(&server).messages().await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn agent_status_accepts_wrapped_map() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agents": {
                "teacher_agent": {"status": "online"},
                "student_agent_1": {"status": "busy", "message": "thinking"}
            }
        })))
        .mount(&server)
        .await;

    let status = api_for(&server).agent_status().await.unwrap();
    assert_eq!(status.len(), 2);
    assert_eq!(
        status.get("student_agent_1"),
        Some(&WireStatus {
            status: "busy".to_string(),
            message: Some("thinking".to_string()),
        })
    );
}

#[tokio::test]
async fn speech_returns_raw_audio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/text_to_speech"))
        .and(body_json(json!({"text": "Hello there"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![1u8, 2, 3], "audio/mpeg"))
        .mount(&server)
        .await;

    let audio = api_for(&server).text_to_speech("Hello there").await.unwrap();
    assert_eq!(audio.bytes.to_vec(), vec![1u8, 2, 3]);
    assert_eq!(audio.extension(), "mp3");
}

#[tokio::test]
async fn speech_decodes_base64_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/text_to_speech"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"audio": "AQID"})))
        .mount(&server)
        .await;

    let audio = api_for(&server).text_to_speech("Hi").await.unwrap();
    assert_eq!(audio.bytes.to_vec(), vec![1u8, 2, 3]);
}
