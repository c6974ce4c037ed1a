use langcap_core::StoreError;
use langcap_types::{UiEvent, WordId};

use crate::state::AppState;

pub fn stats(state: &AppState) -> Result<UiEvent, StoreError> {
    let now = state.store.now();
    state.stats().snapshot(now).map(UiEvent::Stats)
}

pub fn breakdown(state: &AppState) -> Result<UiEvent, StoreError> {
    state.stats().group_breakdown().map(UiEvent::GroupBreakdown)
}

pub async fn due_words(state: &AppState, limit: Option<usize>) -> Result<UiEvent, StoreError> {
    let limit = match limit {
        Some(limit) => limit,
        None => state.config.read().await.study.session_size,
    };
    let now = state.store.now();

    let words = state.scheduler().await.due_words(now, limit)?;
    tracing::debug!("{} words due", words.len());
    Ok(UiEvent::Words(words))
}

pub async fn record_outcome(
    state: &AppState,
    id: &WordId,
    correct: bool,
) -> Result<UiEvent, StoreError> {
    let now = state.store.now();
    let review = state.scheduler().await.record_outcome(id, correct, now)?;
    Ok(UiEvent::ReviewState {
        word: *id,
        state: Some(review),
    })
}

pub async fn review_state(state: &AppState, id: &WordId) -> Result<UiEvent, StoreError> {
    let review = state.scheduler().await.review_state(id)?;
    Ok(UiEvent::ReviewState {
        word: *id,
        state: review,
    })
}
