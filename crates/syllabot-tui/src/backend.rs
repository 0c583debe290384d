//! Background task that runs assistant queries and reveal tickers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use syllabot_client::{ask_classified, AssistantService};
use syllabot_core::{QueryRequest, RevealTicket};

use crate::event::{BackendCommand, UiEvent};

/// Timing knobs for the backend.
#[derive(Debug, Clone, Copy)]
pub struct BackendTiming {
    pub tick_interval: Duration,
    pub reply_delay: Duration,
    pub greeting_delay: Duration,
}

/// Run the background loop.
///
/// This function runs in a separate thread with its own tokio runtime.
/// Queries run as spawned tasks so a slow backend never stalls ticker
/// commands. Every send to the UI tolerates a closed channel: once the UI
/// has gone away, late results are dropped.
pub async fn run_backend(
    assistant: Arc<dyn AssistantService>,
    timing: BackendTiming,
    ui_tx: mpsc::Sender<UiEvent>,
    mut cmd_rx: mpsc::Receiver<BackendCommand>,
) {
    let shutdown = CancellationToken::new();
    let mut tickers: HashMap<RevealTicket, CancellationToken> = HashMap::new();

    tokio::spawn(greet_after(
        timing.greeting_delay,
        ui_tx.clone(),
        shutdown.child_token(),
    ));

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            BackendCommand::Query(request) => {
                tokio::spawn(run_query(
                    assistant.clone(),
                    request,
                    timing.reply_delay,
                    ui_tx.clone(),
                ));
            }
            BackendCommand::StartTicker(ticket) => {
                let token = shutdown.child_token();
                if let Some(previous) = tickers.insert(ticket, token.clone()) {
                    previous.cancel();
                }
                tokio::spawn(run_ticker(
                    ticket,
                    timing.tick_interval,
                    ui_tx.clone(),
                    token,
                ));
            }
            BackendCommand::StopTicker(ticket) => {
                if let Some(token) = tickers.remove(&ticket) {
                    debug!(%ticket, "Stopping ticker");
                    token.cancel();
                }
            }
            BackendCommand::Quit => {
                info!("Received quit command, shutting down backend");
                break;
            }
        }
    }

    shutdown.cancel();
    info!("Backend shutdown complete");
}

async fn greet_after(delay: Duration, ui_tx: mpsc::Sender<UiEvent>, token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(delay) => {
            let _ = ui_tx.send(UiEvent::Greet).await;
        }
    }
}

/// Ask the assistant and report back. Not cancelled on quit.
async fn run_query(
    assistant: Arc<dyn AssistantService>,
    request: QueryRequest,
    reply_delay: Duration,
    ui_tx: mpsc::Sender<UiEvent>,
) {
    let result = ask_classified(assistant.as_ref(), &request).await;
    if result.is_ok() {
        tokio::time::sleep(reply_delay).await;
    }

    let event = UiEvent::Reply {
        request_id: request.request_id,
        result,
    };
    if ui_tx.send(event).await.is_err() {
        debug!("UI closed before reply arrived");
    }
}

async fn run_ticker(
    ticket: RevealTicket,
    period: Duration,
    ui_tx: mpsc::Sender<UiEvent>,
    token: CancellationToken,
) {
    debug!(%ticket, period_ms = period.as_millis() as u64, "Ticker started");
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                if ui_tx.send(UiEvent::RevealTick(ticket)).await.is_err() {
                    break;
                }
            }
        }
    }
}
