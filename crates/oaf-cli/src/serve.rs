//! Stdio protocol host
//!
//! Speaks the extension's message protocol over stdin/stdout, one JSON
//! object per line in each direction. This is the shape a native-messaging
//! bridge wants, minus the browser's length-prefix framing, and it makes the
//! whole request/response surface scriptable from the shell.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use oaf_service::coordinator::{Coordinator, FileSource};
use oaf_service::{Response, StorageArea};

use crate::state::StateAreas;

pub struct ServeOptions {
    pub input: String,
    pub state: PathBuf,
}

/// Build a coordinator over a dataset file. With no state directory the
/// stores are volatile, which is what one-shot commands want.
pub fn build_coordinator(input: &str, state: Option<&Path>) -> Result<Coordinator, String> {
    // Fail fast on an unreadable dataset instead of on the first request
    if !Path::new(input).exists() {
        return Err(format!("Failed to read '{}': no such file", input));
    }

    let (sync_area, local_area): (Arc<dyn StorageArea>, Arc<dyn StorageArea>) = match state {
        Some(dir) => {
            let areas = StateAreas::open(dir);
            (areas.sync, areas.local)
        }
        None => (
            Arc::new(oaf_service::MemoryArea::new()),
            Arc::new(oaf_service::MemoryArea::new()),
        ),
    };

    Ok(Coordinator::new(
        Box::new(FileSource::new(input)),
        sync_area,
        local_area,
    ))
}

pub fn run_serve(opts: ServeOptions) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
    runtime.block_on(run_serve_async(opts))
}

async fn run_serve_async(opts: ServeOptions) -> Result<(), String> {
    let coordinator = build_coordinator(&opts.input, Some(&opts.state))?;
    coordinator.on_installed();
    log::info!(
        "serving protocol on stdio (dataset: {}, state: {})",
        opts.input,
        opts.state.display()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("Failed to read stdin: {}", e))?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<serde_json::Value>(line) {
            Ok(message) => coordinator.handle_value(message),
            Err(e) => Response::failure(format!("Malformed JSON: {e}")),
        };

        let mut encoded = serde_json::to_string(&response)
            .map_err(|e| format!("Failed to encode response: {}", e))?;
        encoded.push('\n');

        stdout
            .write_all(encoded.as_bytes())
            .await
            .map_err(|e| format!("Failed to write stdout: {}", e))?;
        stdout
            .flush()
            .await
            .map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_coordinator_with_state_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dataset_path = dir.path().join("mappings.json");
        std::fs::write(
            &dataset_path,
            br#"{"example.com": {"name": "Example", "alternatives": []}}"#,
        )
        .unwrap();

        let state_dir = dir.path().join("state");
        let coordinator =
            build_coordinator(dataset_path.to_str().unwrap(), Some(&state_dir)).unwrap();
        coordinator.on_installed();

        let response = coordinator.handle_value(json!({
            "type": "GET_ALTERNATIVES_FOR_HOST",
            "hostname": "sub.example.com"
        }));
        let v = serde_json::to_value(response).unwrap();
        assert_eq!(v["found"]["key"], json!("example.com"));

        // Settings were seeded to disk
        let seeded = std::fs::read_to_string(state_dir.join("settings.json")).unwrap();
        assert!(seeded.contains("bannerEnabled"));
    }

    #[test]
    fn test_build_coordinator_missing_dataset() {
        let err = build_coordinator("/no/such/mappings.json", None)
            .err()
            .unwrap();
        assert!(err.contains("Failed to read"));
    }
}
