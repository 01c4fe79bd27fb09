use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::app::Event;
use crate::config::AudioSettings;

use super::fetch::spawn_loader;
use super::sink::{create_sink, fade_out_volume};
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo, SinkEvent};

const TICK: Duration = Duration::from_millis(200);

/// Messages handled by the audio thread: engine commands plus finished
/// downloads from loader threads.
pub(super) enum Msg {
    Cmd(AudioCmd),
    Buffered {
        generation: u64,
        data: Result<Arc<[u8]>, String>,
    },
}

/// Tracks which load the thread is waiting for and which one is audible.
#[derive(Debug, Default)]
pub(super) struct LoadSlot {
    wanted: Option<u64>,
    loaded: Option<u64>,
}

impl LoadSlot {
    pub(super) fn request(&mut self, generation: u64) {
        self.wanted = Some(generation);
        self.loaded = None;
    }

    /// Accept a finished download only if it is the one last requested.
    pub(super) fn accept(&mut self, generation: u64) -> bool {
        if self.wanted == Some(generation) {
            self.wanted = None;
            self.loaded = Some(generation);
            true
        } else {
            false
        }
    }

    pub(super) fn clear(&mut self) {
        self.wanted = None;
        self.loaded = None;
    }

    pub(super) fn loaded(&self) -> Option<u64> {
        self.loaded
    }
}

pub(super) struct AudioThread {
    pub rx: Receiver<Msg>,
    /// Handed to loader threads so they can post `Msg::Buffered`.
    pub tx: Sender<Msg>,
    pub playback_info: PlaybackHandle,
    pub events: Sender<Event>,
    pub agent: ureq::Agent,
    pub settings: AudioSettings,
    pub max_stream_bytes: u64,
    pub ready: SyncSender<Result<(), String>>,
}

struct Output {
    stream: OutputStream,
    sink: Option<Sink>,
    data: Option<Arc<[u8]>>,
    slot: LoadSlot,
    paused: bool,
    volume: f32,
    playback_info: PlaybackHandle,
    events: Sender<Event>,
}

pub(super) fn spawn_audio_thread(ctx: AudioThread) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("audio".to_string()).spawn(move || {
        let AudioThread {
            rx,
            tx,
            playback_info,
            events,
            agent,
            settings,
            max_stream_bytes,
            ready,
        } = ctx;

        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        // rodio logs to stderr when the OutputStream is dropped; keep the console clean.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut out = Output {
            stream,
            sink: None,
            data: None,
            slot: LoadSlot::default(),
            paused: true,
            volume: settings.volume,
            playback_info,
            events,
        };

        loop {
            match rx.recv_timeout(TICK) {
                Ok(Msg::Cmd(cmd)) => match cmd {
                    AudioCmd::Load { generation, url } => {
                        out.drop_sink();
                        out.slot.request(generation);
                        spawn_loader(agent.clone(), url, generation, max_stream_bytes, tx.clone());
                    }
                    AudioCmd::TogglePause => out.toggle_pause(),
                    AudioCmd::Restart => out.restart(),
                    AudioCmd::Stop => {
                        out.drop_sink();
                        out.slot.clear();
                    }
                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(ref s) = out.sink {
                            if !out.paused {
                                fade_out_sink(s, out.volume, fade_out_ms);
                            }
                            s.stop();
                        }
                        out.publish(None);
                        break;
                    }
                },
                Ok(Msg::Buffered { generation, data }) => out.buffered(generation, data),
                Err(RecvTimeoutError::Timeout) => out.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

impl Output {
    fn emit(&self, event: SinkEvent) {
        let _ = self.events.send(Event::Sink(event));
    }

    fn publish(&self, generation: Option<u64>) {
        if let Ok(mut info) = self.playback_info.lock() {
            *info = PlaybackInfo {
                generation,
                elapsed: Duration::ZERO,
            };
        }
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        self.data = None;
        self.paused = true;
        self.publish(None);
    }

    fn buffered(&mut self, generation: u64, data: Result<Arc<[u8]>, String>) {
        if !self.slot.accept(generation) {
            debug!("dropping stale stream for generation {generation}");
            return;
        }

        let started = data.and_then(|bytes| {
            let sink = create_sink(&self.stream, &bytes, self.volume)?;
            Ok((sink, bytes))
        });

        match started {
            Ok((sink, bytes)) => {
                sink.play();
                self.sink = Some(sink);
                self.data = Some(bytes);
                self.paused = false;
                self.publish(Some(generation));
                self.emit(SinkEvent::Started { generation });
            }
            Err(reason) => {
                warn!("stream for generation {generation} failed: {reason}");
                self.slot.clear();
                self.emit(SinkEvent::Error { generation, reason });
            }
        }
    }

    fn toggle_pause(&mut self) {
        let Some(ref s) = self.sink else {
            return;
        };
        if self.paused {
            s.play();
        } else {
            s.pause();
        }
        self.paused = !self.paused;
    }

    fn restart(&mut self) {
        let (Some(generation), Some(bytes)) = (self.slot.loaded(), self.data.clone()) else {
            return;
        };
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        match create_sink(&self.stream, &bytes, self.volume) {
            Ok(sink) => {
                sink.play();
                self.sink = Some(sink);
                self.paused = false;
                self.publish(Some(generation));
            }
            Err(reason) => {
                self.data = None;
                self.slot.clear();
                self.publish(None);
                self.emit(SinkEvent::Error { generation, reason });
            }
        }
    }

    /// Periodic check: publish elapsed time and detect the end of the track.
    fn tick(&mut self) {
        if self.paused {
            return;
        }
        let (empty, pos) = match self.sink {
            Some(ref s) => (s.empty(), s.get_pos()),
            None => return,
        };
        if empty {
            let generation = self.slot.loaded();
            self.drop_sink();
            self.slot.clear();
            if let Some(generation) = generation {
                self.emit(SinkEvent::Ended { generation });
            }
            return;
        }
        if let Ok(mut info) = self.playback_info.lock() {
            info.elapsed = pos;
        }
    }
}

fn fade_out_sink(sink: &Sink, volume: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        sink.set_volume(volume * fade_out_volume(step, steps));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
