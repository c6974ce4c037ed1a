use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use langcap_types::{GroupCount, UserStats};

use crate::error::StoreError;
use crate::store::{StoreContents, WordStore};

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

/// Dashboard numbers, derived on demand from the store
pub struct StatsEngine {
    store: Arc<WordStore>,
}

impl StatsEngine {
    pub fn new(store: Arc<WordStore>) -> Self {
        Self { store }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Result<UserStats, StoreError> {
        self.store.read(|contents| compute(contents, now))
    }

    /// Every group with its word count, largest first, then by name
    pub fn group_breakdown(&self) -> Result<Vec<GroupCount>, StoreError> {
        self.store.read(|contents| {
            let counts = contents.member_counts();
            let mut breakdown: Vec<GroupCount> = contents
                .groups()
                .map(|g| GroupCount {
                    id: g.id,
                    name: g.name.clone(),
                    word_count: counts.get(&g.id).copied().unwrap_or(0),
                })
                .collect();

            breakdown.sort_by(|a, b| {
                b.word_count
                    .cmp(&a.word_count)
                    .then_with(|| a.name.cmp(&b.name))
            });
            breakdown
        })
    }
}

/// Stats as of `now`. Windows are `[now - n days, now]`; words dated after
/// `now` fall outside every window.
pub fn compute(contents: &StoreContents, now: DateTime<Utc>) -> UserStats {
    let week_start = now - Duration::days(WEEK_DAYS);
    let month_start = now - Duration::days(MONTH_DAYS);
    let within = |at: DateTime<Utc>, from: DateTime<Utc>| at >= from && at <= now;

    let mut stats = UserStats {
        total_words: contents.word_total(),
        group_count: contents.group_total(),
        ..Default::default()
    };

    for word in contents.words() {
        if within(word.created_at, week_start) {
            stats.words_this_week += 1;
        }
        if within(word.created_at, month_start) {
            stats.words_this_month += 1;
        }
        if word.is_favorite {
            stats.favorite_count += 1;
        }
    }

    let log = contents.study_log();
    stats.study_sessions = log.len();
    stats.last_study_date = log.iter().map(|entry| entry.at).max();

    stats
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use langcap_config::study::StudyConfig;
    use langcap_types::{GroupDraft, WordDraft, WordPatch};

    use super::*;
    use crate::clock::ManualClock;
    use crate::scheduler::StudyScheduler;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap()
    }

    fn store_with_clock() -> (Arc<WordStore>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now()));
        let store = Arc::new(WordStore::in_memory().with_clock(clock.clone()));
        (store, clock)
    }

    fn add_at(store: &WordStore, clock: &ManualClock, word: &str, at: DateTime<Utc>) {
        clock.set(at);
        store.create_word(WordDraft::new(word, "m")).unwrap();
    }

    #[test]
    fn empty_store_has_zero_stats() {
        let (store, _) = store_with_clock();
        let stats = StatsEngine::new(store).snapshot(now()).unwrap();

        assert_eq!(stats, UserStats::default());
    }

    #[test]
    fn week_window_includes_lower_bound() {
        let (store, clock) = store_with_clock();
        add_at(&store, &clock, "limite", now() - Duration::days(7));
        add_at(&store, &clock, "trop tard", now() - Duration::days(7) - Duration::seconds(1));

        let stats = StatsEngine::new(store).snapshot(now()).unwrap();
        assert_eq!(stats.words_this_week, 1);
        assert_eq!(stats.words_this_month, 2);
        assert_eq!(stats.total_words, 2);
    }

    #[test]
    fn future_words_are_outside_windows() {
        let (store, clock) = store_with_clock();
        add_at(&store, &clock, "demain", now() + Duration::hours(1));
        add_at(&store, &clock, "maintenant", now());

        let stats = StatsEngine::new(store).snapshot(now()).unwrap();
        assert_eq!(stats.words_this_week, 1);
        assert_eq!(stats.words_this_month, 1);
        assert_eq!(stats.total_words, 2);
    }

    #[test]
    fn month_window_is_thirty_days() {
        let (store, clock) = store_with_clock();
        add_at(&store, &clock, "trente", now() - Duration::days(30));
        add_at(&store, &clock, "trente et un", now() - Duration::days(31));

        let stats = StatsEngine::new(store).snapshot(now()).unwrap();
        assert_eq!(stats.words_this_week, 0);
        assert_eq!(stats.words_this_month, 1);
    }

    #[test]
    fn favorites_groups_and_study_log_are_counted() {
        let (store, _clock) = store_with_clock();
        store.create_group(GroupDraft::new("A")).unwrap();
        let word = store.create_word(WordDraft::new("étoile", "star")).unwrap();
        store.update_word(&word.id, WordPatch::favorite(true)).unwrap();

        let scheduler = StudyScheduler::new(store.clone(), &StudyConfig::default());
        let first = now() - Duration::days(2);
        let last = now() - Duration::hours(1);
        scheduler.record_outcome(&word.id, true, first).unwrap();
        scheduler.record_outcome(&word.id, false, last).unwrap();

        let stats = StatsEngine::new(store).snapshot(now()).unwrap();
        assert_eq!(stats.favorite_count, 1);
        assert_eq!(stats.group_count, 1);
        assert_eq!(stats.study_sessions, 2);
        assert_eq!(stats.last_study_date, Some(last));
    }

    #[test]
    fn breakdown_lists_largest_group_first() {
        let (store, _clock) = store_with_clock();
        let small = store.create_group(GroupDraft::new("Small")).unwrap();
        let big = store.create_group(GroupDraft::new("Big")).unwrap();
        store.create_group(GroupDraft::new("Empty")).unwrap();

        store
            .create_word(WordDraft::new("a", "m").with_groups([small.id, big.id]))
            .unwrap();
        store
            .create_word(WordDraft::new("b", "m").with_groups([big.id]))
            .unwrap();

        let breakdown = StatsEngine::new(store).group_breakdown().unwrap();
        let summary: Vec<_> = breakdown
            .iter()
            .map(|g| (g.name.as_str(), g.word_count))
            .collect();
        assert_eq!(summary, vec![("Big", 2), ("Small", 1), ("Empty", 0)]);
    }
}
