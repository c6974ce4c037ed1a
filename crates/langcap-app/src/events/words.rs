use langcap_core::{StoreError, WordStore};
use langcap_types::{UiEvent, WordDraft, WordFilter, WordId};

pub fn create(store: &WordStore, draft: WordDraft) -> Result<UiEvent, StoreError> {
    store.create_word(draft).map(UiEvent::Word)
}

pub fn update(
    store: &WordStore,
    id: &WordId,
    patch: serde_json::Value,
) -> Result<UiEvent, StoreError> {
    store.update_word_json(id, patch).map(UiEvent::Word)
}

pub fn toggle_favorite(store: &WordStore, id: &WordId) -> Result<UiEvent, StoreError> {
    store.toggle_favorite(id).map(UiEvent::Word)
}

pub fn delete(store: &WordStore, id: &WordId) -> Result<UiEvent, StoreError> {
    store.delete_word(id)?;
    Ok(UiEvent::Deleted { id: id.to_string() })
}

pub fn get(store: &WordStore, id: &WordId) -> Result<UiEvent, StoreError> {
    store.get_word(id).map(UiEvent::Word)
}

pub fn list(store: &WordStore, filter: &WordFilter) -> Result<UiEvent, StoreError> {
    let words = store.list_words(filter)?;
    tracing::debug!("Listing {} words", words.len());
    Ok(UiEvent::Words(words))
}

pub fn tags(store: &WordStore) -> Result<UiEvent, StoreError> {
    store.all_tags().map(UiEvent::Tags)
}
