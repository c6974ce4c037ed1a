use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use langcap_core::{CaptureError, StoreError};
use langcap_provider::LookupError;
use langcap_types::{AppEvent, ErrorKind, UiEvent};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod capture;
pub mod groups;
pub mod study;
pub mod words;

/// App's main loop: one reply per request, in request order
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<UiEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    app_to_ui_tx.send(UiEvent::BackendReady).await?;
    tracing::info!("Event loop started");

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => {
                    tracing::info!("Request channel closed");
                    break;
                }
            },
        };

        if event == AppEvent::Shutdown {
            tracing::info!("Shutdown requested");
            app_to_ui_tx.send(UiEvent::Ack).await?;
            cancel.cancel();
            break;
        }

        let reply = handle_event(state.clone(), &app_to_ui_tx, event).await;
        app_to_ui_tx.send(reply).await?;
    }

    state.cancel_lookup();
    tracing::info!("Event loop stopped");
    Ok(())
}

async fn handle_event(
    state: Arc<AppState>,
    app_to_ui_tx: &AsyncSender<UiEvent>,
    event: AppEvent,
) -> UiEvent {
    tracing::debug!("Handling {:?}", event);
    let store = state.store.as_ref();

    match event {
        AppEvent::Capture(input) => capture::handle_capture(state, input, app_to_ui_tx).await,
        AppEvent::SelectRegion { region, screenshot } => {
            capture::reply(state.resolver.select_region(region, screenshot))
        }
        AppEvent::SubmitText(text) => capture::reply(state.resolver.submit_text(&text)),
        AppEvent::ResolveCapture => capture::spawn_resolve(state, app_to_ui_tx).await,
        AppEvent::ConfirmCapture => capture::handle_confirm(&state).await,
        AppEvent::DiscardCapture => capture::reply(state.resolver.discard()),
        AppEvent::RetryCapture => capture::reply(state.resolver.retry()),
        AppEvent::CancelCapture => {
            state.cancel_lookup();
            UiEvent::Ack
        }
        AppEvent::ResetCapture => {
            state.cancel_lookup();
            state.resolver.reset();
            UiEvent::Ack
        }
        AppEvent::SetActiveGroups(groups) => {
            state.resolver.set_active_groups(groups);
            UiEvent::Ack
        }
        AppEvent::CaptureStatus => {
            let name = state.resolver.state().name();
            UiEvent::CaptureStatus(state.status.snapshot(name).await)
        }

        AppEvent::CreateWord(draft) => reply(words::create(store, draft)),
        AppEvent::UpdateWord { id, patch } => reply(words::update(store, &id, patch)),
        AppEvent::ToggleFavorite(id) => reply(words::toggle_favorite(store, &id)),
        AppEvent::DeleteWord(id) => reply(words::delete(store, &id)),
        AppEvent::GetWord(id) => reply(words::get(store, &id)),
        AppEvent::ListWords(filter) => reply(words::list(store, &filter)),
        AppEvent::ListTags => reply(words::tags(store)),

        AppEvent::CreateGroup(draft) => reply(groups::create(store, draft)),
        AppEvent::UpdateGroup { id, patch } => reply(groups::update(store, &id, patch)),
        AppEvent::DeleteGroup(id) => reply(groups::delete(store, &id)),
        AppEvent::GetGroup(id) => reply(groups::get(store, &id)),
        AppEvent::ListGroups => reply(groups::list(store)),
        AppEvent::GetWordCount(id) => reply(groups::word_count(store, &id)),

        AppEvent::Stats => reply(study::stats(&state)),
        AppEvent::GroupBreakdown => reply(study::breakdown(&state)),
        AppEvent::DueWords { limit } => reply(study::due_words(&state, limit).await),
        AppEvent::RecordOutcome { id, correct } => {
            reply(study::record_outcome(&state, &id, correct).await)
        }
        AppEvent::GetReviewState(id) => reply(study::review_state(&state, &id).await),

        AppEvent::ConfigChanged => reload_config(&state).await,
        // Handled by the loop
        AppEvent::Shutdown => UiEvent::Ack,
    }
}

/// Re-read the profile from disk and apply environment overrides
async fn reload_config(state: &AppState) -> UiEvent {
    let Some(profile) = &state.profile else {
        tracing::debug!("No profile on disk, keeping current config");
        return UiEvent::Ack;
    };

    let loaded = profile.load().and_then(|mut config| {
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    });

    match loaded {
        Ok(config) => {
            *state.config.write().await = config;
            tracing::info!("Reloaded profile {}", profile.name);
            UiEvent::Ack
        }
        Err(e) => {
            tracing::warn!("Keeping previous config: {:#}", e);
            error(ErrorKind::Config, format!("{e:#}"))
        }
    }
}

pub fn error(kind: ErrorKind, message: impl Into<String>) -> UiEvent {
    UiEvent::Error {
        kind,
        message: message.into(),
    }
}

fn reply(result: Result<UiEvent, StoreError>) -> UiEvent {
    result.unwrap_or_else(|e| store_error(&e))
}

pub fn store_error(e: &StoreError) -> UiEvent {
    let kind = match e {
        StoreError::Validation(_) => ErrorKind::Validation,
        StoreError::NotFound { .. } => ErrorKind::NotFound,
        StoreError::Conflict(_) => ErrorKind::Conflict,
        StoreError::Io(_)
        | StoreError::Serialization(_)
        | StoreError::UnsupportedVersion { .. }
        | StoreError::LockPoisoned => ErrorKind::Storage,
    };
    error(kind, e.to_string())
}

pub fn capture_error(e: &CaptureError) -> UiEvent {
    match e {
        CaptureError::EmptyCapture => error(ErrorKind::EmptyCapture, e.to_string()),
        CaptureError::Lookup(LookupError::InvalidConfiguration(_)) => {
            error(ErrorKind::Config, e.to_string())
        }
        CaptureError::Lookup(_) => error(ErrorKind::Lookup, e.to_string()),
        CaptureError::Store(inner) => store_error(inner),
        CaptureError::Cancelled => UiEvent::CaptureCancelled,
        CaptureError::InvalidTransition { .. } => error(ErrorKind::InvalidState, e.to_string()),
    }
}
