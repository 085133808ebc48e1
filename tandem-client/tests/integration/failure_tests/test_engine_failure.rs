use tandem_client::{CallError, CallEvent, FixedRoom, NegotiationState};

use crate::integration::pair;
use crate::utils::{init_tracing, next_event};

#[tokio::test]
async fn test_engine_failure_is_reported_without_teardown() {
    init_tracing();
    let pair = pair();
    pair.network.fail_next("create offer");
    let mut events = pair.alice.handle.subscribe();

    pair.alice.handle.start(FixedRoom::new("flaky")).await.unwrap();
    pair.bob.handle.start(FixedRoom::new("flaky")).await.unwrap();

    let notice = next_event(&mut events, "engine notice", |e| {
        matches!(e, CallEvent::Notice(CallError::Engine { .. }))
    })
    .await;
    let CallEvent::Notice(CallError::Engine { operation, .. }) = notice else {
        unreachable!()
    };
    assert_eq!(operation, "create offer");

    let alice = pair.alice.handle.status().await.unwrap();
    assert!(alice.is_live());
    assert_eq!(alice.state, NegotiationState::RoleAssigned);
    assert_eq!(pair.alice_conn.sent_count("invite"), 0);
    assert_eq!(pair.alice_conn.sent_count("bye"), 0);

    // The user can still end the call cleanly.
    pair.alice.handle.hang_up().await;
    assert_eq!(pair.alice_conn.sent_count("bye"), 1);
    pair.bob
        .wait_for("bob closed", |s| s.state == NegotiationState::Closed)
        .await;
}
