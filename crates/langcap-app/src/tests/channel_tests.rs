use std::sync::Arc;
use std::time::Duration;

use langcap_config::AppConfig;
use langcap_core::WordStore;
use langcap_provider::HttpProviderFactory;
use langcap_types::{AppEvent, ErrorKind, UiEvent};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::controller::ChannelSet;
use crate::events::event_loop;
use crate::io::input_io;
use crate::state::AppState;
use crate::ui::ui_loop;

/// Feed `input` through the whole stdin -> event loop -> stdout path and
/// return the replies written out
async fn run_lines(input: &[u8]) -> Vec<UiEvent> {
    let state = Arc::new(AppState::new(
        AppConfig::default(),
        Arc::new(WordStore::in_memory()),
        Arc::new(HttpProviderFactory::new()),
        None,
    ));
    let channels = ChannelSet::new();
    let cancel = CancellationToken::new();
    let mut out = Vec::new();

    let (looped, read, written) = timeout(Duration::from_secs(2), async {
        tokio::join!(
            event_loop(
                state,
                channels.ui_to_app.1.clone(),
                channels.app_to_ui.0.clone(),
                cancel.clone(),
            ),
            input_io(
                input,
                cancel.clone(),
                channels.ui_to_app.0.clone(),
                channels.app_to_ui.0.clone(),
            ),
            ui_loop(channels.app_to_ui.1.clone(), &mut out, cancel.clone()),
        )
    })
    .await
    .expect("pipeline did not stop at end of input");
    looped.unwrap();
    read.unwrap();
    written.unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn group_requests_flow_through_backend() {
    let input = concat!(
        r#"{"type":"createGroup","data":{"name":"Travel"}}"#,
        "\n",
        r#"{"type":"listGroups"}"#,
        "\n",
    );
    let replies = run_lines(input.as_bytes()).await;

    assert_eq!(replies.len(), 4);
    assert_eq!(replies[0], UiEvent::BackendReady);
    assert!(matches!(replies[1], UiEvent::Group(ref g) if g.name == "Travel"));
    let UiEvent::Groups(ref groups) = replies[2] else {
        panic!("expected groups, got {:?}", replies[2]);
    };
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Travel");
    // Shutdown at end of input
    assert_eq!(replies[3], UiEvent::Ack);
}

#[tokio::test]
async fn region_selection_reaches_resolver() {
    let input = concat!(
        r#"{"type":"selectRegion","data":{"region":{"x":100,"y":200,"width":300,"height":400},"screenshot":"shot.png"}}"#,
        "\n",
        r#"{"type":"captureStatus"}"#,
        "\n",
    );
    let replies = run_lines(input.as_bytes()).await;

    assert_eq!(replies.len(), 4);
    assert_eq!(replies[1], UiEvent::Ack);
    let UiEvent::CaptureStatus(ref status) = replies[2] else {
        panic!("expected capture status, got {:?}", replies[2]);
    };
    assert_eq!(status.state, "region selected");
    assert!(!status.capturing);
}

#[tokio::test]
async fn input_lines_become_requests() {
    let (req_tx, req_rx) = kanal::unbounded_async::<AppEvent>();
    let (reply_tx, reply_rx) = kanal::unbounded_async::<UiEvent>();

    let input: &[u8] = b"{\"type\":\"listGroups\"}\n\nnot json\n{\"type\":\"stats\"}\n";
    input_io(input, CancellationToken::new(), req_tx, reply_tx)
        .await
        .unwrap();

    assert_eq!(req_rx.recv().await.unwrap(), AppEvent::ListGroups);
    assert_eq!(req_rx.recv().await.unwrap(), AppEvent::Stats);
    // End of input
    assert_eq!(req_rx.recv().await.unwrap(), AppEvent::Shutdown);

    match reply_rx.recv().await.unwrap() {
        UiEvent::Error { kind, .. } => assert_eq!(kind, ErrorKind::Validation),
        other => panic!("expected an error reply, got {other:?}"),
    }
}

#[tokio::test]
async fn replies_are_written_as_json_lines() {
    let (tx, rx) = kanal::unbounded_async::<UiEvent>();
    tx.send(UiEvent::BackendReady).await.unwrap();
    tx.send(UiEvent::Tags(vec!["food".to_string()])).await.unwrap();
    drop(tx);

    let mut out = Vec::new();
    ui_loop(rx, &mut out, CancellationToken::new()).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], r#"{"type":"backendReady"}"#);

    let tags: UiEvent = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(tags, UiEvent::Tags(vec!["food".to_string()]));
}
