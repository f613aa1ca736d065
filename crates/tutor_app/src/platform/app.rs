use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use ratatui::crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use tutor_core::{update, AppState, Msg};
use tutor_engine::{ApiSettings, EngineConfig, EngineHandle, LiveSettings};

use super::effects::{credential_headers, EffectRunner};
use super::ui::keys::{self, KeyAction};
use super::{logging, persistence, ui};
use crate::cli::AppConfig;

/// Everything the main loop reacts to, in arrival order.
pub(crate) enum LoopEvent {
    Core(Msg),
    Terminal(Event),
}

const CLOCK_INTERVAL: Duration = Duration::from_secs(1);
const SPEECH_DIR: &str = "speech";

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    logging::initialize(&config.log_file, config.log_level);
    engine_info!(
        "Starting tutor chat server={} ws={} student={}",
        config.server,
        config.ws_url,
        config.student_id
    );

    let engine = EngineHandle::new(EngineConfig {
        api: ApiSettings {
            base_url: config.server.clone(),
            ..ApiSettings::default()
        },
        output_dir: config.data_dir.join(SPEECH_DIR),
    })
    .context("failed to build the HTTP client")?;

    // Headers go out first so the first poll already carries them.
    let credentials = persistence::load_credentials(&config.data_dir);
    engine.set_headers(credential_headers(&credentials));
    engine.start_live(LiveSettings {
        url: config.ws_url.clone(),
        reconnect_delay: config.reconnect_delay,
    });
    if let Some(every) = config.poll_interval {
        engine.start_polling(config.student_id.clone(), every);
    }

    let (loop_tx, loop_rx) = mpsc::channel();
    let runner = EffectRunner::new(engine.clone(), config.data_dir.clone(), loop_tx.clone());
    spawn_clock(loop_tx.clone());
    spawn_terminal_input(loop_tx.clone());
    let _ = loop_tx.send(LoopEvent::Core(Msg::CredentialsLoaded(credentials)));

    let mut terminal = ratatui::try_init().context("failed to initialise the terminal")?;
    let result = event_loop(
        &mut terminal,
        AppState::with_student(config.student_id),
        &loop_rx,
        &runner,
    );
    if let Err(err) = ratatui::try_restore() {
        engine_warn!("Failed to restore the terminal: {}", err);
    }

    engine.shutdown();
    engine_info!("Tutor chat stopped");
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    mut state: AppState,
    loop_rx: &mpsc::Receiver<LoopEvent>,
    runner: &EffectRunner,
) -> anyhow::Result<()> {
    terminal.draw(|frame| ui::render::render(frame, &state.view()))?;

    while let Ok(event) = loop_rx.recv() {
        let msg = match event {
            LoopEvent::Core(msg) => msg,
            LoopEvent::Terminal(event) => match keys::map_event(&event, state.input()) {
                KeyAction::Dispatch(msg) => msg,
                KeyAction::Redraw => {
                    terminal.draw(|frame| ui::render::render(frame, &state.view()))?;
                    continue;
                }
                KeyAction::Quit => break,
                KeyAction::Ignore => continue,
            },
        };

        let (next, effects) = update(state, msg);
        state = next;
        runner.enqueue(effects);

        if state.consume_dirty() {
            let view = state.view();
            terminal.draw(|frame| ui::render::render(frame, &view))?;
        }
    }
    Ok(())
}

/// Stamps locally created messages with wall-clock time.
fn spawn_clock(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || loop {
        let now = Utc::now().to_rfc3339();
        if loop_tx.send(LoopEvent::Core(Msg::ClockAdvanced(now))).is_err() {
            break;
        }
        thread::sleep(CLOCK_INTERVAL);
    });
}

fn spawn_terminal_input(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(event) => {
                if loop_tx.send(LoopEvent::Terminal(event)).is_err() {
                    break;
                }
            }
            Err(err) => {
                engine_warn!("Terminal input failed: {}", err);
                break;
            }
        }
    });
}
