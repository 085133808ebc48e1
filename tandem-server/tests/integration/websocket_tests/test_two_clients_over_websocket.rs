use std::net::SocketAddr;
use tandem_core::{RoomToken, SessionDescription, SignalEvent};
use tandem_server::{Server, ServerConfig};

use crate::integration::init_tracing;
use crate::utils::{SIGNAL_TIMEOUT_MS, WsTestClient};

async fn start_server() -> SocketAddr {
    let config = ServerConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
    };
    let server = Server::bind(&config).await.expect("bind relay");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(server.run());
    addr
}

#[tokio::test]
async fn test_two_clients_over_websocket() {
    init_tracing();
    let addr = start_server().await;
    let room = RoomToken::parse("ws-room").unwrap();

    let mut alice = WsTestClient::connect(addr).await.unwrap();
    alice.send(&SignalEvent::Join(room.clone())).await.unwrap();
    assert_eq!(alice.recv(SIGNAL_TIMEOUT_MS).await.unwrap(), SignalEvent::Created);

    let mut bob = WsTestClient::connect(addr).await.unwrap();
    bob.send(&SignalEvent::Join(room.clone())).await.unwrap();
    assert_eq!(bob.recv(SIGNAL_TIMEOUT_MS).await.unwrap(), SignalEvent::Joined);
    assert_eq!(
        alice.recv(SIGNAL_TIMEOUT_MS).await.unwrap(),
        SignalEvent::NewPeer(room.clone())
    );

    let offer = SignalEvent::Offer(SessionDescription::offer("v=0 from alice"));
    alice.send(&offer).await.unwrap();
    assert_eq!(bob.recv(SIGNAL_TIMEOUT_MS).await.unwrap(), offer);

    // Garbage is skipped; the connection stays usable.
    bob.send_raw("{not json").await.unwrap();
    let answer = SignalEvent::Answer(SessionDescription::answer("v=0 from bob"));
    bob.send(&answer).await.unwrap();
    assert_eq!(alice.recv(SIGNAL_TIMEOUT_MS).await.unwrap(), answer);

    bob.close().await.unwrap();
    alice.close().await.unwrap();
}

#[tokio::test]
async fn test_disconnect_frees_the_seat() {
    init_tracing();
    let addr = start_server().await;
    let room = RoomToken::parse("seat").unwrap();

    let mut alice = WsTestClient::connect(addr).await.unwrap();
    alice.send(&SignalEvent::Join(room.clone())).await.unwrap();
    alice.recv(SIGNAL_TIMEOUT_MS).await.unwrap();
    alice.close().await.unwrap();

    // Poll until the server has processed the disconnect.
    let mut reply = None;
    for _ in 0..20 {
        let mut bob = WsTestClient::connect(addr).await.unwrap();
        bob.send(&SignalEvent::Join(room.clone())).await.unwrap();
        let event = bob.recv(SIGNAL_TIMEOUT_MS).await.unwrap();
        bob.close().await.unwrap();
        if event == SignalEvent::Created {
            reply = Some(event);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert_eq!(reply, Some(SignalEvent::Created));
}
