use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use langcap_types::{GroupDraft, GroupPatch, WordDraft, WordPatch};
use proptest::prelude::*;
use serde_json::json;

use super::*;
use crate::clock::ManualClock;

fn draft(word: &str) -> WordDraft {
    WordDraft::new(word, format!("meaning of {word}")).with_languages("fr", "en")
}

fn clocked_store() -> (WordStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    ));
    let store = WordStore::in_memory().with_clock(clock.clone());
    (store, clock)
}

fn word_total(store: &WordStore) -> usize {
    store.read(|c| c.word_total()).unwrap()
}

#[test]
fn create_word_assigns_id_and_timestamp() {
    let (store, clock) = clocked_store();
    let word = store.create_word(draft("pomme")).unwrap();

    assert_eq!(word.word, "pomme");
    assert_eq!(word.created_at, clock.now());
    assert!(!word.is_favorite);
    assert_eq!(store.get_word(&word.id).unwrap(), word);
}

#[test]
fn empty_word_is_rejected_and_store_unchanged() {
    let store = WordStore::in_memory();
    store.create_word(draft("chat")).unwrap();

    let result = store.create_word(WordDraft::new("   ", "something"));
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = store.create_word(WordDraft::new("chien", ""));
    assert!(matches!(result, Err(StoreError::Validation(_))));

    assert_eq!(word_total(&store), 1);
}

#[test]
fn unknown_group_is_rejected() {
    let store = WordStore::in_memory();
    let result = store.create_word(draft("chat").with_groups([GroupId::new()]));

    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(word_total(&store), 0);
}

#[test]
fn empty_tags_are_rejected_and_others_trimmed() {
    let store = WordStore::in_memory();
    assert!(matches!(
        store.create_word(draft("chat").with_tags([" "])),
        Err(StoreError::Validation(_))
    ));

    let word = store.create_word(draft("chat").with_tags([" animal "])).unwrap();
    assert!(word.has_tag("animal"));
}

#[test]
fn duplicate_group_name_conflicts() {
    let store = WordStore::in_memory();
    store.create_group(GroupDraft::new("Travel")).unwrap();

    let second = store.create_group(GroupDraft::new("Travel"));
    assert!(matches!(second, Err(StoreError::Conflict(_))));

    // Exact match only
    store.create_group(GroupDraft::new("travel")).unwrap();

    let travel = store
        .list_groups()
        .unwrap()
        .into_iter()
        .filter(|g| g.name == "Travel")
        .count();
    assert_eq!(travel, 1);
}

#[test]
fn renaming_onto_existing_name_conflicts() {
    let store = WordStore::in_memory();
    store.create_group(GroupDraft::new("Food")).unwrap();
    let travel = store.create_group(GroupDraft::new("Travel")).unwrap();

    let result = store.update_group(&travel.id, GroupPatch::rename("Food"));
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    // Renaming to its own name is fine
    let same = store.update_group(&travel.id, GroupPatch::rename("Travel")).unwrap();
    assert_eq!(same.name, "Travel");
}

#[test]
fn deleting_group_detaches_it_from_every_word() {
    let store = WordStore::in_memory();
    let a = store.create_group(GroupDraft::new("A")).unwrap();
    let b = store.create_group(GroupDraft::new("B")).unwrap();

    let w1 = store.create_word(draft("un").with_groups([a.id, b.id])).unwrap();
    let w2 = store.create_word(draft("deux").with_groups([a.id])).unwrap();

    store.delete_group(&a.id).unwrap();

    let w1 = store.get_word(&w1.id).unwrap();
    let w2 = store.get_word(&w2.id).unwrap();
    assert_eq!(w1.group_ids, BTreeSet::from([b.id]));
    assert!(w2.group_ids.is_empty());

    assert!(matches!(
        store.get_group(&a.id),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.delete_group(&a.id),
        Err(StoreError::NotFound { .. })
    ));
    assert!(store.read(|c| c.is_consistent()).unwrap());
}

#[test]
fn word_count_follows_membership() {
    let store = WordStore::in_memory();
    let group = store.create_group(GroupDraft::new("Verbs")).unwrap();
    assert_eq!(group.word_count, 0);

    let w1 = store.create_word(draft("aller").with_groups([group.id])).unwrap();
    store.create_word(draft("venir").with_groups([group.id])).unwrap();
    assert_eq!(store.get_word_count(&group.id).unwrap(), 2);

    store.update_word(&w1.id, WordPatch::groups([])).unwrap();
    assert_eq!(store.get_word_count(&group.id).unwrap(), 1);
    assert_eq!(store.get_group(&group.id).unwrap().word_count, 1);

    assert!(matches!(
        store.get_word_count(&GroupId::new()),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn update_word_changes_only_mutable_fields() {
    let store = WordStore::in_memory();
    let group = store.create_group(GroupDraft::new("Animals")).unwrap();
    let word = store.create_word(draft("chat")).unwrap();

    let patch = WordPatch {
        is_favorite: Some(true),
        tags: Some(BTreeSet::from(["pet".to_string()])),
        group_ids: Some(BTreeSet::from([group.id])),
        notes: Some(Some("feline".to_string())),
        examples: Some(Some(vec!["le chat dort".to_string()])),
    };
    let updated = store.update_word(&word.id, patch).unwrap();

    assert!(updated.is_favorite);
    assert!(updated.has_tag("pet"));
    assert!(updated.in_group(&group.id));
    assert_eq!(updated.notes.as_deref(), Some("feline"));
    assert_eq!(updated.word, word.word);
    assert_eq!(updated.created_at, word.created_at);

    let cleared = store
        .update_word(
            &word.id,
            WordPatch {
                notes: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(cleared.notes, None);
    assert!(cleared.is_favorite);
}

#[test]
fn update_with_unknown_group_leaves_word_untouched() {
    let store = WordStore::in_memory();
    let word = store.create_word(draft("chat")).unwrap();

    let patch = WordPatch {
        is_favorite: Some(true),
        group_ids: Some(BTreeSet::from([GroupId::new()])),
        ..Default::default()
    };
    assert!(matches!(
        store.update_word(&word.id, patch),
        Err(StoreError::Validation(_))
    ));
    assert!(!store.get_word(&word.id).unwrap().is_favorite);
}

#[test]
fn json_patch_cannot_touch_provenance() {
    let store = WordStore::in_memory();
    let word = store.create_word(draft("chat")).unwrap();

    for field in ["word", "sourceLanguage", "targetLanguage", "translatedText", "createdAt", "id"] {
        let mut patch = json!({ "isFavorite": true });
        patch[field] = json!("changed");
        let result = store.update_word_json(&word.id, patch);
        assert!(
            matches!(&result, Err(StoreError::Validation(msg)) if msg.contains(field)),
            "{field}: {result:?}"
        );
    }
    assert_eq!(store.get_word(&word.id).unwrap(), word);

    let updated = store
        .update_word_json(&word.id, json!({ "isFavorite": true, "tags": ["x"] }))
        .unwrap();
    assert!(updated.is_favorite);
}

#[test]
fn unknown_ids_are_not_found() {
    let store = WordStore::in_memory();
    let missing = WordId::new();

    assert!(matches!(store.get_word(&missing), Err(StoreError::NotFound { .. })));
    assert!(matches!(
        store.update_word(&missing, WordPatch::favorite(true)),
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(store.delete_word(&missing), Err(StoreError::NotFound { .. })));
    assert!(matches!(store.toggle_favorite(&missing), Err(StoreError::NotFound { .. })));
}

#[test]
fn delete_word_removes_only_that_word() {
    let store = WordStore::in_memory();
    let group = store.create_group(GroupDraft::new("G")).unwrap();
    let keep = store.create_word(draft("garder").with_groups([group.id])).unwrap();
    let gone = store.create_word(draft("partir").with_groups([group.id])).unwrap();

    store.delete_word(&gone.id).unwrap();

    assert!(store.get_word(&keep.id).is_ok());
    assert_eq!(store.get_word_count(&group.id).unwrap(), 1);
    assert!(matches!(store.delete_word(&gone.id), Err(StoreError::NotFound { .. })));
}

#[test]
fn list_words_filters_and_orders() {
    let (store, clock) = clocked_store();
    let group = store.create_group(GroupDraft::new("Kitchen")).unwrap();

    let oldest = store
        .create_word(draft("couteau").with_groups([group.id]).with_tags(["tool"]))
        .unwrap();
    clock.advance(Duration::days(1));
    let middle = store.create_word(draft("fourchette").with_tags(["tool"])).unwrap();
    clock.advance(Duration::days(1));
    let newest = store.create_word(draft("cuillère").with_groups([group.id])).unwrap();
    store.toggle_favorite(&middle.id).unwrap();

    let all = store.list_words(&WordFilter::default()).unwrap();
    let ids: Vec<_> = all.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

    let oldest_first = store
        .list_words(&WordFilter {
            oldest_first: true,
            limit: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(oldest_first[0].id, oldest.id);
    assert_eq!(oldest_first.len(), 1);

    let in_group = store.list_words(&WordFilter::in_group(group.id)).unwrap();
    assert_eq!(in_group.len(), 2);

    let tagged = store.list_words(&WordFilter::tagged("tool")).unwrap();
    assert_eq!(tagged.len(), 2);

    let favorites = store.list_words(&WordFilter::favorites()).unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, middle.id);

    // Bounds are inclusive
    let range = store
        .list_words(&WordFilter::between(middle.created_at, newest.created_at))
        .unwrap();
    assert_eq!(range.len(), 2);

    let search = store
        .list_words(&WordFilter {
            query: Some("FOUR".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(search.len(), 1);

    assert!(matches!(
        store.list_words(&WordFilter::in_group(GroupId::new())),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn all_tags_are_distinct_and_sorted() {
    let store = WordStore::in_memory();
    store.create_word(draft("a").with_tags(["verb", "food"])).unwrap();
    store.create_word(draft("b").with_tags(["food"])).unwrap();

    assert_eq!(store.all_tags().unwrap(), vec!["food", "verb"]);
}

#[test]
fn store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let (word, group) = {
        let store = WordStore::open(&path).unwrap();
        let group = store.create_group(GroupDraft::new("Travel")).unwrap();
        let word = store
            .create_word(draft("gare").with_groups([group.id]).with_tags(["place"]))
            .unwrap();
        (word, group)
    };

    let reopened = WordStore::open(&path).unwrap();
    assert_eq!(reopened.get_word(&word.id).unwrap(), word);
    assert_eq!(reopened.get_group(&group.id).unwrap().word_count, 1);

    // Constraints still apply after a restart
    assert!(matches!(
        reopened.create_group(GroupDraft::new("Travel")),
        Err(StoreError::Conflict(_))
    ));
}

#[test]
fn failed_write_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("profile");
    let store = WordStore::open(parent.join("store.json")).unwrap();

    // Once the parent directory is a regular file, every save fails
    std::fs::write(&parent, b"file").unwrap();
    let result = store.create_word(draft("perdu"));

    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(word_total(&store), 0);
}

#[test]
fn open_drops_dangling_references() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let word_id = WordId::new();
    let ghost = GroupId::new();

    let mut doc = json!({
        "version": snapshot::FORMAT_VERSION,
        "words": {},
        "reviews": {}
    });
    doc["words"][word_id.to_string()] = json!({
        "id": word_id,
        "word": "fantôme",
        "meaning": "ghost",
        "screenshot": "shot.png",
        "translatedText": "ghost",
        "sourceLanguage": "fr",
        "targetLanguage": "en",
        "createdAt": "2024-01-01T00:00:00Z",
        "isFavorite": false,
        "groupIds": [ghost],
        "tags": []
    });
    doc["reviews"][WordId::new().to_string()] = json!({
        "lastReviewed": "2024-01-02T00:00:00Z",
        "intervalSecs": 86400,
        "due": "2024-01-03T00:00:00Z",
        "reviews": 1,
        "streak": 1
    });
    std::fs::write(&path, doc.to_string()).unwrap();

    let store = WordStore::open(&path).unwrap();
    assert!(store.get_word(&word_id).unwrap().group_ids.is_empty());
    assert!(store.read(|c| c.is_consistent()).unwrap());
}

#[test]
fn unknown_format_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, r#"{"version": 99}"#).unwrap();

    assert!(matches!(
        WordStore::open(&path),
        Err(StoreError::UnsupportedVersion { found: 99, .. })
    ));
}

#[derive(Debug, Clone)]
enum Op {
    CreateGroup(u8),
    DeleteGroup(u8),
    CreateWord(Vec<u8>),
    SetGroups(u8, Vec<u8>),
    DeleteWord(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::CreateGroup),
        (0u8..6).prop_map(Op::DeleteGroup),
        prop::collection::vec(0u8..6, 0..4).prop_map(Op::CreateWord),
        (0u8..8, prop::collection::vec(0u8..6, 0..4)).prop_map(|(w, g)| Op::SetGroups(w, g)),
        (0u8..8).prop_map(Op::DeleteWord),
    ]
}

proptest! {
    #[test]
    fn membership_stays_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let store = WordStore::in_memory();

        for op in ops {
            let groups: Vec<GroupId> = store.list_groups().unwrap().iter().map(|g| g.id).collect();
            let words: Vec<WordId> = store.list_words(&WordFilter::default()).unwrap().iter().map(|w| w.id).collect();
            let pick_groups = |idx: &[u8]| -> Vec<GroupId> {
                idx.iter().filter_map(|i| groups.get(*i as usize).copied()).collect()
            };

            // Individual operations may legitimately fail; the invariants must hold regardless
            let _ = match op {
                Op::CreateGroup(n) => store.create_group(GroupDraft::new(format!("g{n}"))).map(|_| ()),
                Op::DeleteGroup(i) => match groups.get(i as usize) {
                    Some(id) => store.delete_group(id),
                    None => Ok(()),
                },
                Op::CreateWord(idx) => store.create_word(draft("mot").with_groups(pick_groups(&idx))).map(|_| ()),
                Op::SetGroups(w, idx) => match words.get(w as usize) {
                    Some(id) => store.update_word(id, WordPatch::groups(pick_groups(&idx))).map(|_| ()),
                    None => Ok(()),
                },
                Op::DeleteWord(w) => match words.get(w as usize) {
                    Some(id) => store.delete_word(id),
                    None => Ok(()),
                },
            };

            prop_assert!(store.read(|c| c.is_consistent()).unwrap());

            let all = store.list_words(&WordFilter::default()).unwrap();
            for group in store.list_groups().unwrap() {
                let expected = all.iter().filter(|w| w.in_group(&group.id)).count();
                prop_assert_eq!(store.get_word_count(&group.id).unwrap(), expected);
                prop_assert_eq!(group.word_count, expected);
            }
        }
    }
}
