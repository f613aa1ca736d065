use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::TutorApi;
use crate::sink::EventSink;
use crate::EngineEvent;

/// Polls the student's history every `every` as a fallback to the live
/// socket. The first poll happens immediately.
pub async fn run_history_poller(
    api: Arc<dyn TutorApi>,
    student_id: String,
    every: Duration,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let result = api.history(&student_id).await;
                match &result {
                    Ok(messages) => engine_debug!("History poll returned {} messages", messages.len()),
                    Err(err) => engine_warn!("History poll failed: {}", err),
                }
                sink.emit(EngineEvent::HistoryPolled(result));
            }
        }
    }
}
