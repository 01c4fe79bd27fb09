//! Creating `rodio` sinks from downloaded stream bytes.

use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, Sink};

/// Create a paused `Sink` playing `data` from the start.
///
/// The bytes are shared, so restarting a track rebuilds the sink from the
/// same buffer instead of downloading it again.
pub(super) fn create_sink(
    handle: &OutputStream,
    data: &Arc<[u8]>,
    volume: f32,
) -> Result<Sink, String> {
    let source = Decoder::new(Cursor::new(data.clone()))
        .map_err(|e| format!("could not decode stream: {e}"))?;

    let sink = Sink::connect_new(handle.mixer());
    sink.set_volume(volume);
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Volume for `step` of a linear fade-out over `steps` steps.
pub(super) fn fade_out_volume(step: u64, steps: u64) -> f32 {
    if steps == 0 {
        return 0.0;
    }
    let t = step.min(steps) as f32 / steps as f32;
    1.0 - t
}
