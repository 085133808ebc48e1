use std::sync::Arc;
use tandem_client::{ChannelState, EngineEvent, FixedRoom, NegotiationState, Origin};
use tandem_core::utils::READY_MARKER;
use tandem_core::{RoomToken, SignalEvent};

use crate::integration::{connect, pair};
use crate::utils::{init_tracing, spawn_peer};

#[tokio::test]
async fn test_events_from_ended_call_are_ignored() {
    init_tracing();
    let pair = pair();
    connect(&pair, "first").await;
    pair.alice.handle.hang_up().await;
    pair.bob
        .wait_for("bob closed", |s| !s.is_live() && s.state == NegotiationState::Closed)
        .await;

    let carol_conn = pair.relay.connector();
    let carol = spawn_peer(Arc::new(carol_conn.clone()), &pair.network);
    pair.alice.handle.start(FixedRoom::new("second")).await.unwrap();
    carol.handle.start(FixedRoom::new("second")).await.unwrap();

    let before = pair
        .alice
        .wait_for("second call ready", |s| {
            s.state == NegotiationState::Connected
                && s.channel == ChannelState::Open
                && s.has_received(READY_MARKER)
        })
        .await;

    // Engine 1 and the first inbox still carry the first call's session.
    assert!(pair.network.emit(1, EngineEvent::DataChannelMessage("ghost".into())));
    assert!(pair.network.emit(1, EngineEvent::DataChannelOpen));
    let old_inbox = pair.alice_conn.inbox(0);
    assert!(old_inbox.deliver(SignalEvent::Bye(RoomToken::parse("first").unwrap())));
    assert!(old_inbox.deliver(SignalEvent::Bye(RoomToken::parse("second").unwrap())));

    // Carol's message is queued behind the stale events, so once it lands
    // they have all been handled.
    carol.handle.send_text("still here").await.unwrap();
    let after = pair
        .alice
        .wait_for("carol's message", |s| s.has_received("still here"))
        .await;

    assert_eq!(after.session, before.session);
    assert_eq!(after.state, NegotiationState::Connected);
    assert_eq!(after.channel, ChannelState::Open);
    assert!(after.transcript.iter().all(|e| e.text != "ghost"));
    let markers_sent = after
        .transcript
        .iter()
        .filter(|e| e.origin == Origin::Local && e.text == READY_MARKER)
        .count();
    assert_eq!(markers_sent, 1);
    assert_eq!(after.transcript.len(), before.transcript.len() + 1);

    assert_eq!(pair.alice_conn.sent_count("bye"), 1);
    let streams = pair.alice.media.streams();
    assert_eq!(streams[0].stop_count(), 1);
    assert_eq!(streams[1].stop_count(), 0);
    assert_eq!(pair.alice.local_sink.detach_count(), 1);

    let carol = carol.handle.status().await.unwrap();
    assert_eq!(carol.state, NegotiationState::Connected);
}
