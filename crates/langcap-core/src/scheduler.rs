use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use langcap_config::study::StudyConfig;
use langcap_types::{ReviewState, Word, WordId};

use crate::error::StoreError;
use crate::store::WordStore;

/// How review intervals grow and shrink
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalPolicy {
    pub min: Duration,
    pub max: Duration,
    pub growth: f64,
}

impl IntervalPolicy {
    pub fn from_config(config: &StudyConfig) -> Self {
        Self {
            min: Duration::hours(i64::from(config.min_interval_hours)),
            max: Duration::days(i64::from(config.max_interval_days)),
            growth: config.growth_factor,
        }
    }

    /// Interval after an outcome, given the previous state (if any).
    ///
    /// A miss always falls back to `min`. A hit grows the previous interval
    /// (never less than `min`) by `growth`, capped at `max`.
    pub fn next_interval(&self, previous: Option<&ReviewState>, correct: bool) -> Duration {
        if !correct {
            return self.min;
        }

        let base = previous
            .map(|state| state.interval())
            .unwrap_or(self.min)
            .max(self.min);

        let grown = (base.num_seconds() as f64 * self.growth).round();
        let max_secs = self.max.num_seconds();
        let secs = if grown.is_finite() && grown < max_secs as f64 {
            grown as i64
        } else {
            max_secs
        };

        Duration::seconds(secs.max(self.min.num_seconds()))
    }

    pub fn next_state(
        &self,
        previous: Option<&ReviewState>,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ReviewState {
        let interval = self.next_interval(previous, correct);
        let reviews = previous.map_or(0, |s| s.reviews).saturating_add(1);
        let streak = if correct {
            previous.map_or(0, |s| s.streak).saturating_add(1)
        } else {
            0
        };

        ReviewState {
            last_reviewed: now,
            interval_secs: interval.num_seconds(),
            due: now + interval,
            reviews,
            streak,
        }
    }
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self::from_config(&StudyConfig::default())
    }
}

/// Picks words to study and records how each review went
pub struct StudyScheduler {
    store: Arc<WordStore>,
    policy: IntervalPolicy,
}

impl StudyScheduler {
    pub fn new(store: Arc<WordStore>, config: &StudyConfig) -> Self {
        Self {
            store,
            policy: IntervalPolicy::from_config(config),
        }
    }

    pub fn with_policy(store: Arc<WordStore>, policy: IntervalPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &IntervalPolicy {
        &self.policy
    }

    /// Words to study at `now`: never-reviewed words first, then overdue
    /// words by earliest due date. Ties go to the oldest capture.
    pub fn due_words(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Word>, StoreError> {
        self.store.read(|contents| {
            let mut due: Vec<(Option<DateTime<Utc>>, &Word)> = contents
                .words()
                .filter_map(|word| match contents.review(&word.id) {
                    None => Some((None, word)),
                    Some(state) if state.is_due(now) => Some((Some(state.due), word)),
                    Some(_) => None,
                })
                .collect();

            due.sort_by(|(a_due, a), (b_due, b)| {
                due_order(*a_due, *b_due)
                    .then(a.created_at.cmp(&b.created_at))
                    .then(a.id.cmp(&b.id))
            });

            due.into_iter()
                .take(limit)
                .map(|(_, word)| word.clone())
                .collect()
        })
    }

    pub fn record_outcome(
        &self,
        word_id: &WordId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<ReviewState, StoreError> {
        let state = self
            .store
            .record_review(word_id, now, correct, |previous| {
                self.policy.next_state(previous, correct, now)
            })?;

        tracing::debug!(
            "Reviewed {} ({}): next due {} after {}s",
            word_id,
            if correct { "correct" } else { "missed" },
            state.due,
            state.interval_secs
        );
        Ok(state)
    }

    /// Current review state, `None` if the word was never reviewed
    pub fn review_state(&self, word_id: &WordId) -> Result<Option<ReviewState>, StoreError> {
        self.store.read(|contents| {
            contents
                .word(word_id)
                .map(|_| contents.review(word_id).cloned())
                .ok_or_else(|| StoreError::word_not_found(word_id))
        })?
    }
}

// Never-reviewed (None) sorts before any due date
fn due_order(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}
