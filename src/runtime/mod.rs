use std::env;
use std::sync::mpsc;

use anyhow::Context;
use log::{info, warn};

use crate::app::{App, Event};
use crate::audio::AudioPlayer;
use crate::backend::{BackendWorker, HttpBackend, stream_agent};

mod console;
mod event_loop;
mod settings;

pub fn run() -> anyhow::Result<()> {
    let settings = settings::load_settings();

    if env::args().skip(1).any(|a| a == "--dump-config") {
        let text = toml::to_string_pretty(&settings).context("failed to serialize settings")?;
        print!("{text}");
        return Ok(());
    }

    if settings.backend.session_cookie.is_none() {
        warn!("no session cookie configured; the server will refuse most requests");
    }
    info!("using server {}", settings.backend.base_url);

    let (events_tx, events_rx) = mpsc::channel::<Event>();

    let backend = BackendWorker::spawn(HttpBackend::new(&settings.backend), events_tx.clone())
        .context("failed to start backend worker")?;
    let audio_player = AudioPlayer::new(
        settings.audio.clone(),
        stream_agent(&settings.backend),
        settings.backend.max_stream_bytes,
        events_tx.clone(),
    )?;

    let mut app = App::new(
        settings.playback.start_section.into(),
        settings.playback.restart_threshold(),
    );
    app.set_playback_handle(audio_player.playback_handle());

    console::spawn_reader(events_tx).context("failed to start console reader")?;
    println!("betawave: type `help` for commands");

    let mut state = event_loop::EventLoopState::default();
    event_loop::run(
        &settings,
        &mut app,
        &events_rx,
        &backend,
        &audio_player,
        &mut state,
    )
}
