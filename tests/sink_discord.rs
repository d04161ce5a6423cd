// tests/sink_discord.rs
//
// DiscordSink retry loop against an in-process webhook that fails a set
// number of times before accepting.

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use new_assets_poller::sink::discord::DiscordSink;
use new_assets_poller::{Asset, AssetSink, NewAssets};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Answers 500 until hit number `ok_from`, then 204. `None` never succeeds.
fn flaky_webhook(hits: Arc<AtomicUsize>, ok_from: Option<usize>) -> Router {
    Router::new().route(
        "/hook",
        post(move |Json(body): Json<Value>| {
            let hits = hits.clone();
            async move {
                assert!(body["embeds"][0]["title"].is_string());
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                match ok_from {
                    Some(k) if n >= k => StatusCode::NO_CONTENT,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
        }),
    )
}

fn batch() -> NewAssets {
    NewAssets::new(vec![Asset::new("4").with_field("title", "Arrival")])
}

#[tokio::test]
async fn transient_failures_are_retried_until_accepted() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(flaky_webhook(hits.clone(), Some(3))).await;

    let sink = DiscordSink::new(format!("{base}/hook"))
        .with_timeout(2)
        .with_retries(3)
        .with_backoff(Duration::from_millis(10));
    sink.deliver(&batch()).await.expect("third attempt accepted");

    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_the_configured_attempts() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = serve(flaky_webhook(hits.clone(), None)).await;

    let sink = DiscordSink::new(format!("{base}/hook"))
        .with_timeout(2)
        .with_retries(2)
        .with_backoff(Duration::from_millis(10));
    let err = sink.deliver(&batch()).await.unwrap_err();

    assert!(format!("{err:#}").contains("HTTP error"), "{err:#}");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_webhook_fails_without_hanging() {
    let sink = DiscordSink::new("http://127.0.0.1:9/hook".into())
        .with_timeout(1)
        .with_retries(2)
        .with_backoff(Duration::from_millis(10));
    let res = tokio::time::timeout(Duration::from_secs(10), sink.deliver(&batch())).await;

    let err = res.expect("bounded by timeout and retries").unwrap_err();
    assert!(format!("{err:#}").contains("request failed"), "{err:#}");
}
