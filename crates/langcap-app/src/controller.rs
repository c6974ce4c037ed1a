use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use langcap_types::{AppEvent, UiEvent};
use tokio::io::BufReader;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::input_io;
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<UiEvent>, AsyncReceiver<UiEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // replies plus capture notifications
            ui_to_app: kanal::bounded_async(64),  // requests
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Event loop only; the caller owns both channel ends. A shutdown
    /// request stops every task.
    pub fn spawn_backend(&self, tasks: &mut JoinSet<anyhow::Result<()>>) {
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.cancel_token.clone(),
        ));
    }

    /// Event loop plus the stdin/stdout bridge
    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        self.spawn_backend(&mut tasks);

        // Replies
        tasks.spawn(ui_loop(
            self.channels.app_to_ui.1.clone(),
            tokio::io::stdout(),
            self.cancel_token.child_token(),
        ));

        // Requests
        tasks.spawn(input_io(
            BufReader::new(tokio::io::stdin()),
            self.cancel_token.child_token(),
            self.channels.ui_to_app.0.clone(),
            self.channels.app_to_ui.0.clone(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
