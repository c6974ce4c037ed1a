use kanal::AsyncReceiver;
use langcap_types::UiEvent;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

/// Write every reply as one JSON line. Stands in for a graphical front end.
pub async fn ui_loop<W>(
    app_to_ui_rx: AsyncReceiver<UiEvent>,
    mut writer: W,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }

    // Replies already queued still go out
    while let Ok(Some(event)) = app_to_ui_rx.try_recv() {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
    }
    writer.flush().await?;

    Ok(())
}
