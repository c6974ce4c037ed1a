//! Capture resolution: OCR text in, stored word out.
//!
//! The resolver walks one capture at a time through
//! `Idle -> RegionSelected -> TextExtracted -> LookupInFlight`, ending in
//! `Resolved`, `Failed` or (with auto-save off) `AwaitingConfirmation`.
//! The store is only written on the way into `Resolved`.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use langcap_config::AppConfig;
use langcap_provider::{DictionaryProvider, ProviderFactory};
use langcap_types::{CaptureInput, CaptureRegion, GroupId, ScreenshotRef, Word, WordDraft};
use tokio_util::sync::CancellationToken;

use crate::error::CaptureError;
use crate::preprocess::{DefaultPreprocessor, Preprocessor};
use crate::store::WordStore;

/// Everything known about the capture being resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCapture {
    pub region: CaptureRegion,
    pub screenshot: ScreenshotRef,
    /// Preprocessed text, empty until submitted
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    RegionSelected {
        region: CaptureRegion,
        screenshot: ScreenshotRef,
    },
    TextExtracted(PendingCapture),
    LookupInFlight {
        capture: PendingCapture,
        attempt: u64,
    },
    AwaitingConfirmation {
        capture: PendingCapture,
        draft: WordDraft,
    },
    Resolved(Word),
    Failed {
        capture: PendingCapture,
        reason: String,
    },
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::RegionSelected { .. } => "region selected",
            CaptureState::TextExtracted(_) => "text extracted",
            CaptureState::LookupInFlight { .. } => "lookup in flight",
            CaptureState::AwaitingConfirmation { .. } => "awaiting confirmation",
            CaptureState::Resolved(_) => "resolved",
            CaptureState::Failed { .. } => "failed",
        }
    }

    /// A new capture may start from here without losing work in progress
    fn accepts_new_capture(&self) -> bool {
        matches!(
            self,
            CaptureState::Idle
                | CaptureState::RegionSelected { .. }
                | CaptureState::Resolved(_)
                | CaptureState::Failed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Saved(Word),
    /// Auto-save is off; call `confirm` or `discard`
    AwaitingConfirmation(WordDraft),
}

/// A lookup that has claimed the resolver; finish it with
/// `CaptureResolver::finish_lookup`
pub struct StartedLookup {
    capture: PendingCapture,
    attempt: u64,
    provider: Arc<dyn DictionaryProvider>,
    source: String,
    target: String,
    auto_save: bool,
}

struct Inner {
    state: CaptureState,
    active_groups: BTreeSet<GroupId>,
    attempt: u64,
}

pub struct CaptureResolver {
    store: Arc<WordStore>,
    providers: Arc<dyn ProviderFactory>,
    preprocessor: DefaultPreprocessor,
    inner: Mutex<Inner>,
}

impl CaptureResolver {
    pub fn new(store: Arc<WordStore>, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            store,
            providers,
            preprocessor: DefaultPreprocessor,
            inner: Mutex::new(Inner {
                state: CaptureState::Idle,
                active_groups: BTreeSet::new(),
                attempt: 0,
            }),
        }
    }

    // Never held across an await
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> CaptureState {
        self.lock().state.clone()
    }

    pub fn active_groups(&self) -> BTreeSet<GroupId> {
        self.lock().active_groups.clone()
    }

    /// Groups that newly saved words are filed under
    pub fn set_active_groups(&self, groups: impl IntoIterator<Item = GroupId>) {
        self.lock().active_groups = groups.into_iter().collect();
    }

    pub fn select_region(
        &self,
        region: CaptureRegion,
        screenshot: ScreenshotRef,
    ) -> Result<(), CaptureError> {
        let mut inner = self.lock();
        if !inner.state.accepts_new_capture() {
            return Err(invalid("select a region", &inner.state));
        }

        tracing::debug!("Capture region selected: {:?}", region);
        inner.state = CaptureState::RegionSelected { region, screenshot };
        Ok(())
    }

    /// Attach OCR text to the selected region. Blank text fails the capture
    /// right away.
    pub fn submit_text(&self, text: &str) -> Result<(), CaptureError> {
        let mut inner = self.lock();
        let (region, screenshot) = match &inner.state {
            CaptureState::RegionSelected { region, screenshot } => (*region, screenshot.clone()),
            CaptureState::TextExtracted(capture) => (capture.region, capture.screenshot.clone()),
            other => return Err(invalid("submit text", other)),
        };

        let capture = PendingCapture {
            region,
            screenshot,
            text: self.preprocessor.process(text),
        };

        if capture.text.is_empty() {
            tracing::debug!("Captured text is blank");
            inner.state = CaptureState::Failed {
                capture,
                reason: CaptureError::EmptyCapture.to_string(),
            };
            return Err(CaptureError::EmptyCapture);
        }

        inner.state = CaptureState::TextExtracted(capture);
        Ok(())
    }

    /// Start a capture from one OCR bundle
    pub fn begin(&self, input: CaptureInput) -> Result<(), CaptureError> {
        self.select_region(input.region, input.screenshot)?;
        self.submit_text(&input.text)
    }

    /// Look up the extracted text and, with auto-save on, store the word.
    ///
    /// `config` is read once, here. Cancelling `cancel` while the lookup is
    /// pending returns the resolver to `Idle` without touching the store.
    pub async fn resolve(
        &self,
        config: &AppConfig,
        cancel: &CancellationToken,
    ) -> Result<CaptureOutcome, CaptureError> {
        let lookup = self.start_lookup(config)?;
        self.finish_lookup(lookup, cancel).await
    }

    /// Move an extracted capture into `LookupInFlight` without waiting on
    /// the provider. Any other state is left untouched.
    pub fn start_lookup(&self, config: &AppConfig) -> Result<StartedLookup, CaptureError> {
        let mut inner = self.lock();
        let capture = match &inner.state {
            CaptureState::TextExtracted(capture) => capture.clone(),
            other => return Err(invalid("look up", other)),
        };

        let provider = match self.providers.build(&config.dictionary) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("Cannot build dictionary provider: {}", e);
                inner.state = CaptureState::Failed {
                    capture,
                    reason: e.to_string(),
                };
                return Err(e.into());
            }
        };

        inner.attempt += 1;
        let attempt = inner.attempt;
        inner.state = CaptureState::LookupInFlight {
            capture: capture.clone(),
            attempt,
        };

        Ok(StartedLookup {
            capture,
            attempt,
            provider,
            source: config.capture.source_language.clone(),
            target: config.capture.target_language.clone(),
            auto_save: config.capture.auto_save,
        })
    }

    /// Await a lookup begun by `start_lookup`
    pub async fn finish_lookup(
        &self,
        lookup: StartedLookup,
        cancel: &CancellationToken,
    ) -> Result<CaptureOutcome, CaptureError> {
        let StartedLookup {
            capture,
            attempt,
            provider,
            source,
            target,
            auto_save,
        } = lookup;

        tracing::debug!(
            "Looking up '{}' ({} -> {}) with {}",
            capture.text,
            source,
            target,
            provider.metadata().name
        );

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = provider.lookup(&capture.text, &source, &target) => Some(result),
        };

        let mut inner = self.lock();
        if !is_current(&inner.state, attempt) {
            // Reset while the lookup was running
            return Err(CaptureError::Cancelled);
        }

        let lookup = match result {
            None => {
                tracing::debug!("Lookup for '{}' cancelled", capture.text);
                inner.state = CaptureState::Idle;
                return Err(CaptureError::Cancelled);
            }
            Some(Err(e)) => {
                tracing::warn!("Lookup for '{}' failed: {}", capture.text, e);
                inner.state = CaptureState::Failed {
                    capture,
                    reason: e.to_string(),
                };
                return Err(e.into());
            }
            Some(Ok(lookup)) => lookup,
        };

        let draft = WordDraft::from_lookup(
            capture.text.clone(),
            lookup,
            capture.screenshot.clone(),
            source,
            target,
        );

        if !auto_save {
            inner.state = CaptureState::AwaitingConfirmation {
                capture,
                draft: draft.clone(),
            };
            return Ok(CaptureOutcome::AwaitingConfirmation(draft));
        }

        let draft = draft.with_groups(inner.active_groups.iter().copied());
        self.save(&mut inner, capture, draft)
            .map(CaptureOutcome::Saved)
    }

    /// Store a capture waiting for confirmation, under the groups active now
    pub fn confirm(&self) -> Result<Word, CaptureError> {
        let mut inner = self.lock();
        let (capture, draft) = match &inner.state {
            CaptureState::AwaitingConfirmation { capture, draft } => {
                (capture.clone(), draft.clone())
            }
            other => return Err(invalid("confirm", other)),
        };

        let draft = draft.with_groups(inner.active_groups.iter().copied());
        self.save(&mut inner, capture, draft)
    }

    /// Drop a capture waiting for confirmation
    pub fn discard(&self) -> Result<(), CaptureError> {
        let mut inner = self.lock();
        if !matches!(inner.state, CaptureState::AwaitingConfirmation { .. }) {
            return Err(invalid("discard", &inner.state));
        }

        inner.state = CaptureState::Idle;
        Ok(())
    }

    /// Go back to the extracted text of a failed capture so it can be
    /// looked up again without re-capturing
    pub fn retry(&self) -> Result<(), CaptureError> {
        let mut inner = self.lock();
        let capture = match &inner.state {
            CaptureState::Failed { capture, .. } if !capture.text.is_empty() => capture.clone(),
            other => return Err(invalid("retry", other)),
        };

        inner.state = CaptureState::TextExtracted(capture);
        Ok(())
    }

    /// Abandon whatever is in progress. A pending lookup's result is ignored.
    pub fn reset(&self) {
        let mut inner = self.lock();
        if !matches!(inner.state, CaptureState::Idle) {
            tracing::debug!("Capture reset from {}", inner.state.name());
        }
        inner.state = CaptureState::Idle;
    }

    fn save(
        &self,
        inner: &mut Inner,
        capture: PendingCapture,
        draft: WordDraft,
    ) -> Result<Word, CaptureError> {
        match self.store.create_word(draft) {
            Ok(word) => {
                tracing::info!("Saved '{}' ({})", word.word, word.id);
                inner.state = CaptureState::Resolved(word.clone());
                Ok(word)
            }
            Err(e) => {
                tracing::warn!("Store rejected '{}': {}", capture.text, e);
                inner.state = CaptureState::Failed {
                    capture,
                    reason: e.to_string(),
                };
                Err(e.into())
            }
        }
    }
}

fn is_current(state: &CaptureState, attempt: u64) -> bool {
    matches!(state, CaptureState::LookupInFlight { attempt: a, .. } if *a == attempt)
}

fn invalid(action: &'static str, state: &CaptureState) -> CaptureError {
    CaptureError::InvalidTransition {
        action,
        state: state.name(),
    }
}
