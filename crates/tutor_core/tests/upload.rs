use tutor_core::{update, AppState, Effect, MessageBody, Msg, Reply, Role};

fn submit(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::InputSubmitted)
}

fn seeded_state() -> AppState {
    let (state, effects) = submit(AppState::new(), "hello");
    let (state, _) = update(
        state,
        Msg::RequestSucceeded {
            request_id: match effects[0] {
                Effect::Ask { request_id, .. } => request_id,
                _ => unreachable!(),
            },
            reply: Reply::Text("hi".to_string()),
        },
    );
    state
}

#[test]
fn upload_command_emits_effect_without_touching_log() {
    engine_logging::initialize_for_tests();
    let state = seeded_state();
    let before = state.messages().to_vec();

    let (state, effects) = submit(state, "/upload notes/chapter one.pdf");

    assert_eq!(
        effects,
        vec![Effect::UploadFile {
            request_id: 2,
            path: "notes/chapter one.pdf".into(),
        }]
    );
    assert_eq!(state.messages(), &before[..]);
}

#[test]
fn failed_upload_only_adds_error_notice() {
    engine_logging::initialize_for_tests();
    let state = seeded_state();
    let before = state.messages().to_vec();

    let (state, _) = submit(state, "/upload huge.pdf");
    let (state, effects) = update(
        state,
        Msg::RequestFailed {
            request_id: 2,
            error: "file too large (max 10485760 bytes)".to_string(),
        },
    );

    assert!(effects.is_empty());
    let after = state.messages();
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(
        after[before.len()].body,
        MessageBody::Notice("Upload failed: file too large (max 10485760 bytes)".to_string())
    );
}

#[test]
fn successful_upload_records_file_and_server_reply() {
    engine_logging::initialize_for_tests();
    let (state, _) = submit(AppState::new(), "/upload ./lesson.pdf");
    let (state, _) = update(
        state,
        Msg::RequestSucceeded {
            request_id: 1,
            reply: Reply::Uploaded {
                message: "File uploaded and processed successfully".to_string(),
                bytes: 2048,
            },
        },
    );

    let messages = state.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(
        messages[0].body,
        MessageBody::File {
            name: "lesson.pdf".to_string(),
            bytes: Some(2048),
        }
    );
    assert_eq!(messages[1].role, Role::System);
}
