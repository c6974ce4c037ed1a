use std::sync::Arc;

use kanal::AsyncSender;
use langcap_core::{CaptureError, CaptureOutcome};
use langcap_types::{CaptureInput, UiEvent};

use super::capture_error;
use crate::state::AppState;

pub fn reply(result: Result<(), CaptureError>) -> UiEvent {
    match result {
        Ok(()) => UiEvent::Ack,
        Err(e) => capture_error(&e),
    }
}

/// Start a capture and resolve it in the background
pub async fn handle_capture(
    state: Arc<AppState>,
    input: CaptureInput,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> UiEvent {
    tracing::debug!("Capture received: {} chars", input.text.len());

    // Starting over abandons any capture in progress, including a pending lookup
    state.cancel_lookup();
    state.resolver.reset();
    if let Err(e) = state.resolver.begin(input) {
        if !matches!(e, CaptureError::EmptyCapture) {
            tracing::warn!("Capture rejected: {}", e);
        }
        return capture_error(&e);
    }

    spawn_resolve(state, app_to_ui_tx).await
}

/// Run the lookup off the event loop so cancel requests stay responsive.
/// The outcome arrives later as its own event.
pub async fn spawn_resolve(state: Arc<AppState>, app_to_ui_tx: &AsyncSender<UiEvent>) -> UiEvent {
    // Read once per lookup
    let config = state.config.read().await.clone();

    // Claim the resolver first so a refused request leaves a running lookup alone
    let lookup = match state.resolver.start_lookup(&config) {
        Ok(lookup) => lookup,
        Err(e) => {
            if !matches!(e, CaptureError::InvalidTransition { .. }) {
                state.status.capture_failed().await;
            }
            return capture_error(&e);
        }
    };

    let token = state.next_lookup_token();
    let tx = app_to_ui_tx.clone();

    state.status.lookup_started().await;
    tokio::spawn(async move {
        let result = state.resolver.finish_lookup(lookup, &token).await;

        let event = match result {
            Ok(CaptureOutcome::Saved(word)) => {
                state.status.lookup_finished().await;
                state.status.capture_saved(word.created_at).await;
                UiEvent::CaptureSaved(word)
            }
            Ok(CaptureOutcome::AwaitingConfirmation(draft)) => {
                state.status.lookup_finished().await;
                UiEvent::CaptureAwaitingConfirmation(draft)
            }
            Err(CaptureError::Cancelled) => {
                state.status.lookup_finished().await;
                UiEvent::CaptureCancelled
            }
            Err(e) => {
                state.status.lookup_failed().await;
                capture_error(&e)
            }
        };

        if let Err(e) = tx.send(event).await {
            tracing::error!("Failed to deliver capture result: {}", e);
        }
    });

    UiEvent::Ack
}

pub async fn handle_confirm(state: &AppState) -> UiEvent {
    match state.resolver.confirm() {
        Ok(word) => {
            state.status.capture_saved(word.created_at).await;
            UiEvent::CaptureSaved(word)
        }
        Err(e) => {
            if matches!(e, CaptureError::Store(_)) {
                state.status.capture_failed().await;
            }
            capture_error(&e)
        }
    }
}
