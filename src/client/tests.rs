use std::time::Duration;

use tokio::time::timeout;

use super::{broadcast, endpoint, print_messages};
use crate::transport::Route;
use crate::transport::test_support::{listen, setup_server};

#[test]
fn test_endpoint_joins_route() {
    assert_eq!(
        endpoint("ws://127.0.0.1:14902/", &Route::Listen("test".to_string())),
        "ws://127.0.0.1:14902/listen/test"
    );
    assert_eq!(
        endpoint("ws://host", &Route::Broadcast("a".to_string())),
        "ws://host/broadcast/a"
    );
}

#[tokio::test]
async fn test_listen_prints_broadcasts_and_skips_probes() {
    let (url, hub) = setup_server().await;
    let ws = listen(&url, &hub, "test").await;

    let reader = tokio::spawn(async move {
        let mut out = Vec::new();
        print_messages(ws, Some(2), &mut out)
            .await
            .expect("listen failed");
        out
    });

    hub.sweep().await.unwrap();
    broadcast(&url, "test", "first").await.expect("broadcast failed");
    broadcast(&url, "test", "second").await.expect("broadcast failed");

    let out = timeout(Duration::from_secs(2), reader)
        .await
        .expect("listener did not finish")
        .unwrap();
    // separate publisher connections, so arrival order is not fixed
    let out = String::from_utf8(out).unwrap();
    let mut lines: Vec<_> = out.lines().collect();
    lines.sort();
    assert_eq!(lines, vec!["MSG: first", "MSG: second"]);
}
