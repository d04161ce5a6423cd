//! Demo that runs the poll loop against an in-memory catalog which gains a
//! movie every tick and loses one on the third. Delivered batches go to stdout.

use std::sync::Arc;
use std::time::Duration;

use new_assets_poller::catalog::fixture::FixtureCatalog;
use new_assets_poller::catalog::query::ContentType;
use new_assets_poller::sink::ChannelSink;
use new_assets_poller::{Asset, AreaSelection, ContentSelection, Poller};

const FIXTURE: &str = r#"{
  "movies": [{"id": 1, "title": "Arrival"}, {"id": 2, "title": "Sicario"}],
  "seasons": [{"id": "s-10", "title": "Dark S1"}]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let catalog = Arc::new(FixtureCatalog::from_fixture(FIXTURE)?);
    let (sink, mut rx) = ChannelSink::channel(8);

    let poller = Poller::new(catalog.clone(), Arc::new(sink))
        .with_selection(ContentSelection::All, AreaSelection::All);
    let handle = poller.spawn(Duration::from_millis(400));

    for tick in 3..=6u64 {
        tokio::time::sleep(Duration::from_millis(400)).await;
        catalog.publish(
            ContentType::Movies,
            Asset::new(tick).with_field("title", format!("Demo movie {tick}")),
        );
        if tick == 5 {
            catalog.unlist("1");
        }
    }

    tokio::time::sleep(Duration::from_millis(600)).await;
    let poller = handle.shutdown().await?;

    while let Ok(batch) = rx.try_recv() {
        println!("{} new:\n{}", batch.len(), batch.summary(10));
    }
    println!(
        "poll-demo done, {} assets in the last snapshot",
        poller.tracker().len()
    );
    Ok(())
}
