use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::debug;

use crate::app::Event;

use super::types::{Backend, BackendJob, run_job};

/// Runs backend jobs off the engine thread.
///
/// Two lanes: one for playback authorization, one for everything else.
/// Each lane handles its jobs in order and posts replies as `Event::Backend`.
pub struct BackendWorker {
    catalog: Sender<BackendJob>,
    playback: Sender<BackendJob>,
}

impl BackendWorker {
    pub fn spawn<B: Backend + 'static>(backend: B, events: Sender<Event>) -> io::Result<Self> {
        let backend: Arc<dyn Backend> = Arc::new(backend);
        let (catalog_tx, catalog_rx) = mpsc::channel::<BackendJob>();
        let (playback_tx, playback_rx) = mpsc::channel::<BackendJob>();

        spawn_lane("backend-catalog", backend.clone(), catalog_rx, events.clone())?;
        spawn_lane("backend-playback", backend, playback_rx, events)?;

        Ok(Self {
            catalog: catalog_tx,
            playback: playback_tx,
        })
    }

    pub fn send(&self, job: BackendJob) -> Result<(), mpsc::SendError<BackendJob>> {
        if job.is_playback() {
            self.playback.send(job)
        } else {
            self.catalog.send(job)
        }
    }
}

fn spawn_lane(
    name: &str,
    backend: Arc<dyn Backend>,
    jobs: Receiver<BackendJob>,
    events: Sender<Event>,
) -> io::Result<()> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // Exits once the worker (and with it the job sender) is dropped.
            for job in jobs {
                debug!("backend job: {job:?}");
                let reply = run_job(backend.as_ref(), job);
                if events.send(Event::Backend(reply)).is_err() {
                    break;
                }
            }
        })
        .map(|_| ())
}
