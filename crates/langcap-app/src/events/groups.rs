use langcap_core::{StoreError, WordStore};
use langcap_types::{GroupDraft, GroupId, GroupPatch, UiEvent};

pub fn create(store: &WordStore, draft: GroupDraft) -> Result<UiEvent, StoreError> {
    store.create_group(draft).map(UiEvent::Group)
}

pub fn update(store: &WordStore, id: &GroupId, patch: GroupPatch) -> Result<UiEvent, StoreError> {
    store.update_group(id, patch).map(UiEvent::Group)
}

/// Members stay; they just lose the group
pub fn delete(store: &WordStore, id: &GroupId) -> Result<UiEvent, StoreError> {
    store.delete_group(id)?;
    Ok(UiEvent::Deleted { id: id.to_string() })
}

pub fn get(store: &WordStore, id: &GroupId) -> Result<UiEvent, StoreError> {
    store.get_group(id).map(UiEvent::Group)
}

pub fn list(store: &WordStore) -> Result<UiEvent, StoreError> {
    store.list_groups().map(UiEvent::Groups)
}

pub fn word_count(store: &WordStore, id: &GroupId) -> Result<UiEvent, StoreError> {
    let count = store.get_word_count(id)?;
    Ok(UiEvent::WordCount { group: *id, count })
}
