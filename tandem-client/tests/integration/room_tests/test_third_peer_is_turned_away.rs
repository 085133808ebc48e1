use std::sync::Arc;
use tandem_client::{CallError, CallEvent, FixedRoom, NegotiationState};

use crate::integration::{connect, pair};
use crate::utils::{init_tracing, next_event, spawn_peer};

#[tokio::test]
async fn test_third_peer_is_turned_away() {
    init_tracing();
    let pair = pair();
    connect(&pair, "busy").await;

    let carol_conn = pair.relay.connector();
    let carol = spawn_peer(Arc::new(carol_conn.clone()), &pair.network);
    let mut events = carol.handle.subscribe();

    carol.handle.start(FixedRoom::new("busy")).await.unwrap();

    let notice = next_event(&mut events, "room unavailable notice", |e| {
        matches!(e, CallEvent::Notice(_))
    })
    .await;
    assert_eq!(notice, CallEvent::Notice(CallError::RoomUnavailable));

    // No call came of it: nothing is retained and carol is idle again.
    let status = carol
        .wait_for("carol released", |s| {
            !s.is_live() && s.state == NegotiationState::Idle
        })
        .await;
    assert_eq!(status.session, None);
    assert_eq!(status.room, None);
    assert_eq!(status.role, None);
    assert!(status.transcript.is_empty());
    while let Ok(event) = events.try_recv() {
        assert_ne!(event, CallEvent::ChannelClosed);
    }

    assert_eq!(carol.local_stream().stop_count(), 1);
    assert_eq!(carol.local_sink.attached(), None);
    assert_eq!(carol_conn.sent_count("bye"), 0);
    assert_eq!(pair.network.engines_created(), 2);

    // The call in the room is untouched.
    let alice = pair.alice.handle.status().await.unwrap();
    assert_eq!(alice.state, NegotiationState::Connected);
}
