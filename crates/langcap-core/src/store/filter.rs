use langcap_types::{Word, WordFilter};

/// Whether `word` passes `filter`. `query` is the filter's normalized query,
/// computed once per listing.
pub(crate) fn matches(filter: &WordFilter, word: &Word, query: Option<&str>) -> bool {
    if let Some(group) = &filter.group {
        if !word.in_group(group) {
            return false;
        }
    }

    if let Some(tag) = &filter.tag {
        if !word.has_tag(tag.trim()) {
            return false;
        }
    }

    if filter.favorites_only && !word.is_favorite {
        return false;
    }

    if filter.created_from.is_some_and(|from| word.created_at < from) {
        return false;
    }

    if filter.created_to.is_some_and(|to| word.created_at > to) {
        return false;
    }

    match query {
        Some(query) => [&word.word, &word.meaning, &word.translated_text]
            .iter()
            .any(|field| field.to_lowercase().contains(query)),
        None => true,
    }
}
