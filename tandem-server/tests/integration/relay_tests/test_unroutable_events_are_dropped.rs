use tandem_core::{PeerId, SessionDescription, SignalEvent};
use tandem_server::RoomCommand;

use crate::integration::{create_test_manager, init_tracing, join};
use crate::utils::{assert_quiet, next_delivery};

#[tokio::test]
async fn test_relay_without_room_is_dropped() {
    init_tracing();
    let (cmd_tx, mut signal_rx, _) = create_test_manager();

    cmd_tx
        .send(RoomCommand::Relay {
            peer_id: PeerId::new(),
            event: SignalEvent::Offer(SessionDescription::offer("v=0")),
        })
        .await
        .unwrap();

    assert_quiet(&mut signal_rx).await;
}

#[tokio::test]
async fn test_relay_to_empty_seat_is_dropped() {
    init_tracing();
    let (cmd_tx, mut signal_rx, _) = create_test_manager();

    let alice = PeerId::new();
    join(&cmd_tx, alice, "lobby").await;
    next_delivery(&mut signal_rx).await;

    cmd_tx
        .send(RoomCommand::Relay {
            peer_id: alice,
            event: SignalEvent::Offer(SessionDescription::offer("v=0")),
        })
        .await
        .unwrap();

    assert_quiet(&mut signal_rx).await;
}

#[tokio::test]
async fn test_server_only_events_are_not_relayed() {
    init_tracing();
    let (cmd_tx, mut signal_rx, _) = create_test_manager();

    let (alice, bob) = (PeerId::new(), PeerId::new());
    join(&cmd_tx, alice, "lobby").await;
    join(&cmd_tx, bob, "lobby").await;
    for _ in 0..3 {
        next_delivery(&mut signal_rx).await;
    }

    cmd_tx
        .send(RoomCommand::Relay {
            peer_id: alice,
            event: SignalEvent::Full,
        })
        .await
        .unwrap();

    assert_quiet(&mut signal_rx).await;
}
