use std::sync::{Arc, Mutex};

use langcap_config::AppConfig;
use langcap_core::{CaptureResolver, StatsEngine, StudyScheduler, WordStore};
use langcap_provider::ProviderFactory;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::profile::ProfileLocation;
use crate::status::AppStatus;

pub struct AppState {
    pub config: Arc<RwLock<AppConfig>>,
    pub store: Arc<WordStore>,
    pub resolver: Arc<CaptureResolver>,
    pub status: AppStatus,
    /// None when running without a profile on disk
    pub profile: Option<ProfileLocation>,
    lookup_cancel: Mutex<CancellationToken>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<WordStore>,
        providers: Arc<dyn ProviderFactory>,
        profile: Option<ProfileLocation>,
    ) -> Self {
        let resolver = Arc::new(CaptureResolver::new(store.clone(), providers));
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            resolver,
            status: AppStatus::new(),
            profile,
            lookup_cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Fresh token for the next lookup; cancels the previous one
    pub fn next_lookup_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = {
            let mut current = self.lookup_cancel.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *current, token.clone())
        };
        previous.cancel();
        token
    }

    pub fn cancel_lookup(&self) {
        self.lookup_cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .cancel();
    }

    pub fn stats(&self) -> StatsEngine {
        StatsEngine::new(self.store.clone())
    }

    /// Scheduler tuned by the current study settings
    pub async fn scheduler(&self) -> StudyScheduler {
        let config = self.config.read().await;
        StudyScheduler::new(self.store.clone(), &config.study)
    }
}
