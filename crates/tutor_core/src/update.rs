use crate::state::{PendingRequest, SYSTEM_SENDER};
use crate::{
    catalog, parse_input, AppState, Command, Effect, LiveState, MessageBody, Msg, Reply, Role,
    HELP_TEXT,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::InputSubmitted => {
            // Blank input leaves everything untouched, including the input line.
            let Some(parsed) = parse_input(state.input()) else {
                return (state, Vec::new());
            };
            state.take_input();
            match parsed {
                Ok(command) => apply_command(&mut state, command),
                Err(err) => {
                    state.push_notice(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::AgentCycled => {
            let next = catalog::next_agent(state.selected_agent());
            state.select_agent(next);
            Vec::new()
        }
        Msg::TopicCycled => {
            let next = catalog::next_topic(state.topic()).map(ToOwned::to_owned);
            state.select_topic(next);
            Vec::new()
        }
        Msg::CredentialsLoaded(credentials) => {
            state.replace_credentials(credentials.clone());
            let request_id = state.begin_request(PendingRequest::Status);
            vec![
                Effect::ApplyCredentials(credentials),
                Effect::FetchAgentStatus { request_id },
            ]
        }
        Msg::CredentialsSaved(Ok(())) => {
            state.push_local(
                SYSTEM_SENDER,
                Role::System,
                MessageBody::Text("Credentials saved".to_string()),
            );
            Vec::new()
        }
        Msg::CredentialsSaved(Err(error)) => {
            state.push_notice(format!("Saving credentials failed: {error}"));
            Vec::new()
        }
        Msg::ClockAdvanced(now) => {
            state.set_now(now);
            Vec::new()
        }
        Msg::LiveConnected => {
            state.set_live(LiveState::Connected);
            Vec::new()
        }
        Msg::LiveDisconnected { .. } => {
            state.set_live(LiveState::Disconnected);
            Vec::new()
        }
        Msg::ServerMessage(message) => {
            state.merge_remote(message);
            Vec::new()
        }
        Msg::StatusSnapshot(agents) => {
            state.replace_agent_status(agents);
            Vec::new()
        }
        Msg::HistoryPolled(Ok(messages)) => {
            for message in messages {
                state.merge_remote(message);
            }
            Vec::new()
        }
        Msg::HistoryPolled(Err(error)) => {
            // Polls repeat on their own; surface in the status line only.
            state.set_last_error(Some(format!("History poll failed: {error}")));
            Vec::new()
        }
        Msg::RequestSucceeded { request_id, reply } => {
            if let Some(pending) = state.finish_request(request_id) {
                apply_reply(&mut state, pending, reply);
            }
            Vec::new()
        }
        Msg::RequestFailed { request_id, error } => {
            if let Some(pending) = state.finish_request(request_id) {
                state.push_notice(format!("{} failed: {error}", pending.label()));
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_command(state: &mut AppState, command: Command) -> Vec<Effect> {
    match command {
        Command::Ask(question) => {
            let student_id = state.student_id().to_string();
            let agent_name = state.selected_agent().to_string();
            state.push_local(&student_id, Role::User, MessageBody::Text(question.clone()));
            let request_id = state.begin_request(PendingRequest::Ask {
                agent_name: agent_name.clone(),
            });
            vec![Effect::Ask {
                request_id,
                student_id,
                question,
                agent_name,
                topic: state.topic().map(ToOwned::to_owned),
            }]
        }
        Command::SelectAgent(agent) => {
            state.select_agent(agent);
            Vec::new()
        }
        Command::SelectTopic(topic) => {
            state.select_topic(topic);
            Vec::new()
        }
        Command::Upload(path) => {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let request_id = state.begin_request(PendingRequest::Upload { file_name });
            vec![Effect::UploadFile { request_id, path }]
        }
        Command::Image { source, question } => {
            let student_id = state.student_id().to_string();
            state.push_local(
                &student_id,
                Role::User,
                MessageBody::Image {
                    source: source.clone(),
                    question: question.clone(),
                },
            );
            let request_id = state.begin_request(PendingRequest::Multimodal);
            vec![Effect::AskMultimodal {
                request_id,
                question,
                image: source,
            }]
        }
        Command::Interact { action, content } => {
            let request_id = state.begin_request(PendingRequest::Interact);
            vec![Effect::Interact {
                request_id,
                sender_id: state.student_id().to_string(),
                receiver_id: state.selected_agent().to_string(),
                action,
                content,
            }]
        }
        Command::Interrupt => {
            let request_id = state.begin_request(PendingRequest::Interrupt);
            vec![Effect::Interrupt {
                request_id,
                agent_name: state.selected_agent().to_string(),
            }]
        }
        Command::Speak => match state.last_assistant_text() {
            Some(text) => {
                let request_id =
                    state.begin_request(PendingRequest::Speech { text: text.clone() });
                vec![Effect::SynthesizeSpeech { request_id, text }]
            }
            None => {
                state.push_notice("Nothing to speak yet".to_string());
                Vec::new()
            }
        },
        Command::History => {
            let request_id = state.begin_request(PendingRequest::History);
            vec![Effect::FetchHistory {
                request_id,
                student_id: state.student_id().to_string(),
            }]
        }
        Command::Status => {
            let request_id = state.begin_request(PendingRequest::Status);
            vec![Effect::FetchAgentStatus { request_id }]
        }
        Command::SetKey { key, value } => {
            state.credentials_mut().set(key, value);
            let credentials = state.credentials().clone();
            state.push_local(
                SYSTEM_SENDER,
                Role::System,
                MessageBody::Text(format!("Applied {}", key.name())),
            );
            vec![
                Effect::ApplyCredentials(credentials.clone()),
                Effect::PersistCredentials(credentials),
            ]
        }
        Command::Help => {
            state.push_local(
                SYSTEM_SENDER,
                Role::System,
                MessageBody::Text(HELP_TEXT.to_string()),
            );
            Vec::new()
        }
    }
}

fn apply_reply(state: &mut AppState, pending: PendingRequest, reply: Reply) {
    match (pending, reply) {
        (PendingRequest::Ask { agent_name }, Reply::Text(answer)) => {
            state.push_local(&agent_name, Role::Assistant, MessageBody::Text(answer));
        }
        (PendingRequest::Multimodal, Reply::Text(answer)) => {
            state.push_local(
                catalog::MULTIMODAL_AGENT,
                Role::Assistant,
                MessageBody::Text(answer),
            );
        }
        (PendingRequest::Interact | PendingRequest::Interrupt, Reply::Text(message)) => {
            state.push_local(SYSTEM_SENDER, Role::System, MessageBody::Text(message));
        }
        (PendingRequest::Upload { file_name }, Reply::Uploaded { message, bytes }) => {
            let student_id = state.student_id().to_string();
            state.push_local(
                &student_id,
                Role::User,
                MessageBody::File {
                    name: file_name,
                    bytes: Some(bytes),
                },
            );
            state.push_local(SYSTEM_SENDER, Role::System, MessageBody::Text(message));
        }
        (PendingRequest::Speech { text }, Reply::Speech { path }) => {
            let sender = state.selected_agent().to_string();
            state.push_local(
                &sender,
                Role::Assistant,
                MessageBody::Audio {
                    path,
                    transcript: text,
                },
            );
        }
        (PendingRequest::History, Reply::History(messages)) => {
            for message in messages {
                state.merge_remote(message);
            }
        }
        (PendingRequest::Status, Reply::Status(agents)) => {
            state.replace_agent_status(agents);
        }
        (pending, _) => {
            state.push_notice(format!("{} returned an unexpected reply", pending.label()));
        }
    }
}
