use kanal::AsyncSender;
use langcap_types::{AppEvent, ErrorKind, UiEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::events::error;

/// Read one JSON request per line and forward it to the event loop.
/// End of input asks the app to shut down.
pub async fn input_io<R>(
    reader: R,
    cancel: CancellationToken,
    ui_to_app_tx: AsyncSender<AppEvent>,
    app_to_ui_tx: AsyncSender<UiEvent>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            tracing::info!("Input closed");
            ui_to_app_tx.send(AppEvent::Shutdown).await?;
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<AppEvent>(line) {
            Ok(event) => ui_to_app_tx.send(event).await?,
            Err(e) => {
                tracing::warn!("Ignoring malformed request: {}", e);
                app_to_ui_tx
                    .send(error(ErrorKind::Validation, format!("malformed request: {e}")))
                    .await?;
            }
        }
    }

    Ok(())
}
