//! Page backward through the whole store.

use anyhow::Result;
use scroll_client::{MemoryStore, WindowConfig, WindowEvent, WindowStore};

use super::next_event;

/// Run the history command.
pub async fn run(store: MemoryStore, config: WindowConfig) -> Result<()> {
    let (window, mut listener) = WindowStore::new(store, config);

    // Keep the view pinned to the top so every page triggers the next
    while window.prefetch(0).await? {
        if let WindowEvent::OlderLoaded(loaded) = next_event(&mut listener).await? {
            println!(
                "older: +{} (window {})",
                loaded.inserted_count,
                loaded.original_count + loaded.inserted_count
            );
        }
    }

    let count = window.count().await;
    if count == 0 {
        println!("window: 0 entries");
    } else {
        let first = window.get(0).await?;
        let last = window.get(count - 1).await?;
        println!("window: {} entries, {}..{}", count, first.key, last.key);
    }

    window.dispose().await;
    Ok(())
}
