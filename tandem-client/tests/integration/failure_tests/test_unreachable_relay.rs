use tandem_client::{CallError, FixedRoom};

use crate::integration::pair;
use crate::utils::init_tracing;

#[tokio::test]
async fn test_unreachable_relay_releases_media() {
    init_tracing();
    let pair = pair();
    pair.alice_conn.set_unreachable(true);

    let result = pair.alice.handle.start(FixedRoom::new("room")).await;

    assert_eq!(result, Err(CallError::TransportClosed));
    assert_eq!(pair.alice.local_stream().stop_count(), 1);
    assert!(!pair.alice.handle.status().await.unwrap().is_live());
}
