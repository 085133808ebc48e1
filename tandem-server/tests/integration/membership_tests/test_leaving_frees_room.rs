use tandem_core::{PeerId, SignalEvent};
use tandem_server::RoomCommand;

use crate::integration::{create_test_manager, init_tracing, join, room};
use crate::utils::next_delivery;

#[tokio::test]
async fn test_disconnect_frees_a_slot() {
    init_tracing();
    let (cmd_tx, mut signal_rx, _) = create_test_manager();

    let (alice, bob, carol) = (PeerId::new(), PeerId::new(), PeerId::new());
    join(&cmd_tx, alice, "lobby").await;
    join(&cmd_tx, bob, "lobby").await;
    for _ in 0..3 {
        next_delivery(&mut signal_rx).await;
    }

    cmd_tx
        .send(RoomCommand::Disconnect { peer_id: alice })
        .await
        .unwrap();
    join(&cmd_tx, carol, "lobby").await;

    let first = next_delivery(&mut signal_rx).await;
    let second = next_delivery(&mut signal_rx).await;
    assert_eq!((first.peer_id, first.event), (carol, SignalEvent::Joined));
    assert_eq!(
        (second.peer_id, second.event),
        (bob, SignalEvent::NewPeer(room("lobby")))
    );
}

#[tokio::test]
async fn test_empty_room_is_dropped() {
    init_tracing();
    let (cmd_tx, mut signal_rx, _) = create_test_manager();

    let (alice, bob) = (PeerId::new(), PeerId::new());
    join(&cmd_tx, alice, "lobby").await;
    next_delivery(&mut signal_rx).await;

    cmd_tx
        .send(RoomCommand::Relay {
            peer_id: alice,
            event: SignalEvent::Bye(room("lobby")),
        })
        .await
        .unwrap();

    // A fresh room again: the next peer is told it created it.
    join(&cmd_tx, bob, "lobby").await;
    let delivered = next_delivery(&mut signal_rx).await;
    assert_eq!((delivered.peer_id, delivered.event), (bob, SignalEvent::Created));
}

#[tokio::test]
async fn test_joining_another_room_leaves_the_first() {
    init_tracing();
    let (cmd_tx, mut signal_rx, _) = create_test_manager();

    let (alice, bob) = (PeerId::new(), PeerId::new());
    join(&cmd_tx, alice, "first").await;
    join(&cmd_tx, alice, "second").await;
    assert_eq!(next_delivery(&mut signal_rx).await.event, SignalEvent::Created);
    assert_eq!(next_delivery(&mut signal_rx).await.event, SignalEvent::Created);

    join(&cmd_tx, bob, "first").await;
    let delivered = next_delivery(&mut signal_rx).await;
    assert_eq!((delivered.peer_id, delivered.event), (bob, SignalEvent::Created));
}
