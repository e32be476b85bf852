//! CLI command implementations.

pub mod follow;
pub mod history;

use anyhow::{Context, Result};
use scroll_client::{MemoryStore, WindowConfig, WindowEvent, WindowListener};
use scroll_types::{entries_from_json, Entry, Key};
use std::path::Path;

/// Load the window configuration, or defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<WindowConfig> {
    match path {
        Some(path) => WindowConfig::from_file(path).context("Failed to load config"),
        None => Ok(WindowConfig::default()),
    }
}

/// Store holding entries read from a JSON seed file.
pub async fn seeded_store(path: &Path) -> Result<MemoryStore> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let entries = entries_from_json(&json).context("Invalid seed file")?;
    tracing::info!(entries = entries.len(), "seeded store");
    Ok(MemoryStore::with_entries(entries))
}

/// Store holding `count` sequential entries.
pub fn generated_store(count: u64) -> MemoryStore {
    MemoryStore::with_entries((1..=count).map(generated_entry))
}

/// The `n`th generated entry.
pub fn generated_entry(n: u64) -> Entry {
    Entry::new(Key::sequence(n), serde_json::json!({ "n": n }))
}

/// Wait for the next window notification, turning failures into errors.
pub async fn next_event(listener: &mut WindowListener) -> Result<WindowEvent> {
    match listener.recv().await {
        Some(WindowEvent::Failed(error)) => Err(error).context("Window reported a failure"),
        Some(event) => Ok(event),
        None => anyhow::bail!("Window closed unexpectedly"),
    }
}
