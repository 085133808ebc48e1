use tandem_client::{CallError, FixedRoom};

use crate::integration::pair;
use crate::utils::init_tracing;

#[tokio::test]
async fn test_camera_failure_falls_back_to_display() {
    init_tracing();
    let pair = pair();
    pair.alice.media.fail_camera();

    pair.alice.handle.start(FixedRoom::new("room")).await.unwrap();

    assert_eq!(pair.alice.media.camera_calls(), 1);
    assert_eq!(pair.alice.media.display_calls(), 1);
    assert_eq!(pair.alice.local_sink.attached().as_deref(), Some("display-0"));
}

#[tokio::test]
async fn test_camera_is_preferred() {
    init_tracing();
    let pair = pair();

    pair.alice.handle.start(FixedRoom::new("room")).await.unwrap();

    assert_eq!(pair.alice.media.display_calls(), 0);
    assert_eq!(pair.alice.local_sink.attached().as_deref(), Some("camera-0"));
}

#[tokio::test]
async fn test_no_media_means_no_call() {
    init_tracing();
    let pair = pair();
    pair.alice.media.fail_camera();
    pair.alice.media.fail_display();

    let result = pair.alice.handle.start(FixedRoom::new("room")).await;

    assert_eq!(result, Err(CallError::MediaUnavailable));
    assert_eq!(pair.alice_conn.connects(), 0);
    assert!(pair.alice_conn.sent().is_empty());
    assert!(!pair.alice.handle.status().await.unwrap().is_live());
}
