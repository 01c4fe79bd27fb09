use std::sync::mpsc::Receiver;
use std::time::Duration;

use log::{debug, warn};

use crate::app::{App, Effect, Event, NowPlaying, Phase};
use crate::audio::AudioPlayer;
use crate::backend::BackendWorker;
use crate::config;

use super::console;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Last now-playing line printed, to avoid repeating it.
    last_now_playing: Option<NowPlaying>,
    last_phase: Phase,
}

/// Whether the loop should keep going after applying a batch of effects.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Main engine loop: feeds events to `app` and carries out the effects it
/// returns. Returns once the user quits.
pub fn run(
    settings: &config::Settings,
    app: &mut App,
    events: &Receiver<Event>,
    backend: &BackendWorker,
    audio_player: &AudioPlayer,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    let startup = app.start();
    let mut flow = apply(settings, app, startup, backend, audio_player);

    while flow == Flow::Continue {
        let Ok(event) = events.recv() else {
            debug!("all event producers are gone");
            break;
        };
        let effects = app.handle(event);
        flow = apply(settings, app, effects, backend, audio_player);
        report_playback(app, state);
    }

    audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    Ok(())
}

fn apply(
    settings: &config::Settings,
    app: &App,
    effects: Vec<Effect>,
    backend: &BackendWorker,
    audio_player: &AudioPlayer,
) -> Flow {
    for effect in effects {
        match effect {
            Effect::Backend(job) => {
                if let Err(e) = backend.send(job) {
                    warn!("backend worker is gone, dropping {:?}", e.0);
                }
            }
            Effect::Audio(cmd) => {
                if audio_player.send(cmd).is_err() {
                    warn!("audio thread is gone");
                }
            }
            Effect::Notify(notice) => console::print_notice(&notice),
            Effect::Reauthenticate => console::print_reauth_hint(&settings.backend.base_url),
            Effect::ShowPlaylist => print!("{}", console::render_playlist(app)),
            Effect::Quit => return Flow::Quit,
        }
    }
    Flow::Continue
}

/// Print the now-playing line whenever the track, its display fields or the
/// transport phase change.
fn report_playback(app: &App, state: &mut EventLoopState) {
    let now = app.now_playing().cloned();
    let phase = app.phase();
    if now == state.last_now_playing && phase == state.last_phase {
        return;
    }
    if let Some(np) = &now {
        if phase != Phase::Transitioning {
            println!("{}", console::now_playing_line(np, phase));
        }
    }
    state.last_now_playing = now;
    state.last_phase = phase;
}
