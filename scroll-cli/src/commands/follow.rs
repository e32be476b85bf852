//! Follow the live edge while new entries arrive.

use anyhow::Result;
use scroll_client::{WindowConfig, WindowEvent, WindowStore};
use std::time::Duration;

use super::{generated_entry, generated_store, next_event};

/// Run the follow command.
pub async fn run(generate: u64, live: u64, interval_ms: u64, config: WindowConfig) -> Result<()> {
    let store = generated_store(generate);
    let initial_load = config.paging.initial_load;
    let (window, mut listener) = WindowStore::new(store.clone(), config);

    window.load_older(initial_load).await?;
    if let WindowEvent::OlderLoaded(loaded) = next_event(&mut listener).await? {
        println!(
            "older: +{} (window {})",
            loaded.inserted_count,
            loaded.original_count + loaded.inserted_count
        );
    }

    for n in (generate + 1)..=(generate + live) {
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        store.insert(generated_entry(n));

        // Echoes never reach the listener; the next event is this append
        loop {
            if let WindowEvent::NewerLoaded(loaded) = next_event(&mut listener).await? {
                let entry = window.get(loaded.original_count).await?;
                println!("newer: {} (window {})", entry.key, loaded.original_count + 1);
                break;
            }
        }
    }

    let count = window.count().await;
    tracing::info!(
        count,
        subscriptions = store.active_subscriptions(),
        "follow finished"
    );
    window.dispose().await;
    Ok(())
}
