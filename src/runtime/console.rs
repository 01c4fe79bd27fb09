//! Line-based console front end: parses commands from stdin and renders
//! the playlist, notices and the now-playing line.

use std::fmt::Write as _;
use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread;

use log::debug;

use crate::app::{App, Command, Event, Notice, NoticeLevel, NowPlaying, Phase};
use crate::library::{Section, TrackId};

pub const HELP: &str = "\
commands:
  lib | fav            show the library or the favorites
  / <text>             filter the list (`/` alone clears)
  <id> | play <id>     play a track
  n | next             next track
  b | prev             previous track (restarts if just started)
  p | pause            pause / resume
  f [id]               toggle favorite (current track by default)
  rm <id>              delete a track
  r | refresh          reload both lists
  ls                   show the current list
  q | quit             quit
";

/// Parse one input line. `Ok(None)` means nothing to do.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(query) = line.strip_prefix('/') {
        return Ok(Some(Command::SetQuery(query.trim().to_string())));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let cmd = match word {
        "lib" | "library" => Command::SelectSection(Section::Library),
        "fav" | "favs" | "favorites" => Command::SelectSection(Section::Favorites),
        "search" => Command::SetQuery(rest.to_string()),
        "play" => Command::Play(parse_id(rest)?),
        "n" | "next" => Command::Next,
        "b" | "prev" | "previous" => Command::Previous,
        "p" | "pause" => Command::TogglePause,
        "f" | "heart" => {
            if rest.is_empty() {
                Command::ToggleFavorite(None)
            } else {
                Command::ToggleFavorite(Some(parse_id(rest)?))
            }
        }
        "rm" | "delete" => Command::Delete(parse_id(rest)?),
        "r" | "refresh" => Command::Refresh,
        "ls" | "list" => Command::List,
        "q" | "quit" | "exit" => Command::Quit,
        _ => match word.parse::<TrackId>() {
            Ok(id) if rest.is_empty() => Command::Play(id),
            _ => return Err(format!("unknown command `{word}` (try `help`)")),
        },
    };
    Ok(Some(cmd))
}

fn parse_id(s: &str) -> Result<TrackId, String> {
    if s.is_empty() {
        return Err("missing track id".to_string());
    }
    s.parse()
        .map_err(|_| format!("`{s}` is not a track id"))
}

/// Read commands from stdin on a background thread. End of input quits.
pub fn spawn_reader(events: Sender<Event>) -> io::Result<()> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if matches!(line.trim(), "help" | "h" | "?") {
                    print!("{HELP}");
                    continue;
                }
                match parse_command(&line) {
                    Ok(Some(cmd)) => {
                        if events.send(Event::User(cmd)).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => eprintln!("{msg}"),
                }
            }
            debug!("stdin closed");
            let _ = events.send(Event::User(Command::Quit));
        })
        .map(|_| ())
}

pub fn render_playlist(app: &App) -> String {
    let active = app.active();
    let current = app.playback_state().current_track_id;
    let mut out = String::new();

    let _ = write!(out, "[{}] {} tracks", app.section(), active.len());
    if !app.query().is_empty() {
        let _ = write!(out, " matching \"{}\"", app.query());
    }
    out.push('\n');

    if active.is_empty() {
        out.push_str("  (empty)\n");
    }
    for track in active.tracks() {
        let marker = if Some(track.id) == current { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:>5}  {} - {}",
            track.id, track.title, track.artist
        );
    }
    out
}

pub fn now_playing_line(np: &NowPlaying, phase: Phase) -> String {
    let state = match phase {
        Phase::Paused => "paused",
        Phase::Idle => "stopped",
        Phase::Playing | Phase::Transitioning => "playing",
    };
    let heart = match np.favorite {
        Some(true) => " [fav]",
        _ => "",
    };
    format!("{state}: {} - {}{heart}", np.title, np.artist)
}

pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Info => println!("{}", notice.message),
        NoticeLevel::Error => eprintln!("error: {}", notice.message),
    }
}

pub fn print_reauth_hint(base_url: &str) {
    eprintln!(
        "log in at {}/login and set BETAWAVE__BACKEND__SESSION_COOKIE (or backend.session_cookie in the config file)",
        base_url.trim_end_matches('/')
    );
}
