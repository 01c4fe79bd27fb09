use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, bail};

use crate::app::Event;
use crate::config::AudioSettings;

use super::thread::{AudioThread, Msg, spawn_audio_thread};
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo};

pub struct AudioPlayer {
    tx: Sender<Msg>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Open the default output device and start the audio thread.
    ///
    /// Sink events are posted to `events`; `agent` is used to download
    /// resolved streams.
    pub fn new(
        audio_settings: AudioSettings,
        agent: ureq::Agent,
        max_stream_bytes: u64,
        events: Sender<Event>,
    ) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::channel::<Msg>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(AudioThread {
            rx,
            tx: tx.clone(),
            playback_info: playback_info.clone(),
            events,
            agent,
            settings: audio_settings,
            max_stream_bytes,
            ready: ready_tx,
        })
        .context("failed to spawn audio thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => bail!("no audio output device: {e}"),
            Err(_) => bail!("audio thread exited during startup"),
        }

        Ok(Self {
            tx,
            playback: playback_info,
            join: Mutex::new(Some(audio_handle)),
        })
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<()>> {
        self.tx.send(Msg::Cmd(cmd)).map_err(|_| mpsc::SendError(()))
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
