//! Background download of resolved audio streams.

use std::io::Read;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use log::debug;

use super::thread::Msg;

/// Download `url` on a short-lived thread and post the bytes back to the
/// audio thread as `Msg::Buffered`.
pub(super) fn spawn_loader(
    agent: ureq::Agent,
    url: String,
    generation: u64,
    max_bytes: u64,
    tx: Sender<Msg>,
) {
    let spawned = thread::Builder::new()
        .name(format!("stream-loader-{generation}"))
        .spawn({
            let tx = tx.clone();
            move || {
                let data = fetch_stream(&agent, &url, max_bytes);
                // The audio thread may be gone by the time we finish.
                let _ = tx.send(Msg::Buffered { generation, data });
            }
        });

    if let Err(e) = spawned {
        let _ = tx.send(Msg::Buffered {
            generation,
            data: Err(format!("could not start stream download: {e}")),
        });
    }
}

pub(super) fn fetch_stream(agent: &ureq::Agent, url: &str, max_bytes: u64) -> Result<Arc<[u8]>, String> {
    let response = agent
        .get(url)
        .call()
        .map_err(|e| format!("stream request failed: {e}"))?;

    let mut data = Vec::new();
    response
        .into_reader()
        .take(max_bytes)
        .read_to_end(&mut data)
        .map_err(|e| format!("stream download failed: {e}"))?;

    if data.is_empty() {
        return Err("stream was empty".to_string());
    }
    debug!("downloaded {} bytes from stream", data.len());
    Ok(Arc::from(data))
}
