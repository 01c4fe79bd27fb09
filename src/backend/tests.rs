use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::http::{CallKind, classify_status};
use super::wire::{ErrorPayload, PlayPayload, SongPayload};
use super::*;
use crate::app::Event;
use crate::config::BackendSettings;
use crate::library::{Track, TrackId};

fn t(id: i64, title: &str) -> Track {
    Track {
        id: TrackId(id),
        title: title.into(),
        artist: "ana".into(),
        cover: "ph".into(),
    }
}

#[derive(Default)]
struct FakeBackend {
    library: Vec<Track>,
    favorites: Mutex<Vec<TrackId>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Backend for FakeBackend {
    fn fetch_library(&self) -> Result<Vec<Track>, BackendError> {
        self.log("library".into());
        Ok(self.library.clone())
    }

    fn fetch_favorites(&self) -> Result<Vec<Track>, BackendError> {
        self.log("favorites".into());
        let favs = self.favorites.lock().unwrap();
        Ok(self
            .library
            .iter()
            .filter(|t| favs.contains(&t.id))
            .cloned()
            .collect())
    }

    fn is_favorite(&self, id: TrackId) -> Result<bool, BackendError> {
        Ok(self.favorites.lock().unwrap().contains(&id))
    }

    fn toggle_favorite(&self, id: TrackId) -> Result<bool, BackendError> {
        let mut favs = self.favorites.lock().unwrap();
        if let Some(pos) = favs.iter().position(|f| *f == id) {
            favs.remove(pos);
            Ok(false)
        } else {
            favs.push(id);
            Ok(true)
        }
    }

    fn request_playback(&self, id: TrackId) -> Result<PlaybackGrant, BackendError> {
        self.log(format!("play {id}"));
        match self.library.iter().find(|t| t.id == id) {
            Some(t) => Ok(PlaybackGrant {
                stream_url: format!("http://stream/{id}"),
                title: Some(t.title.clone()),
                artist: None,
                cover: None,
            }),
            None => Err(BackendError::NotFound),
        }
    }

    fn delete_track(&self, _id: TrackId) -> Result<(), BackendError> {
        Err(BackendError::Unauthorized)
    }
}

#[test]
fn song_payload_becomes_track_with_configured_artist() {
    let songs: Vec<SongPayload> = serde_json::from_str(
        r#"[{"id": 1, "name": "Song1", "url": "https://youtu.be/abc"}, {"id": 2, "name": "Song2"}]"#,
    )
    .unwrap();
    let tracks: Vec<Track> = songs.into_iter().map(|s| s.into_track("ana", "ph")).collect();

    assert_eq!(tracks[0].id, TrackId(1));
    assert_eq!(tracks[0].title, "Song1");
    assert_eq!(tracks[0].artist, "ana");
    assert_eq!(tracks[0].cover, "https://img.youtube.com/vi/abc/mqdefault.jpg");
    assert_eq!(tracks[1].cover, "ph");
}

#[test]
fn play_payload_without_stream_is_unplayable() {
    let ok: PlayPayload =
        serde_json::from_str(r#"{"audio_stream_url": "http://s/1", "song_id": 1, "name": "Song1"}"#)
            .unwrap();
    let grant = ok.into_grant().unwrap();
    assert_eq!(grant.stream_url, "http://s/1");
    assert_eq!(grant.title.as_deref(), Some("Song1"));
    assert_eq!(grant.artist, None);

    let missing: PlayPayload =
        serde_json::from_str(r#"{"error": "boom", "fallback_url": "https://youtu.be/x"}"#).unwrap();
    assert_eq!(
        missing.into_grant(),
        Err(BackendError::Unplayable("boom".into()))
    );
}

#[test]
fn status_classification() {
    assert_eq!(classify_status(401, None, CallKind::Plain), BackendError::Unauthorized);
    assert_eq!(classify_status(302, None, CallKind::Playback), BackendError::Unauthorized);
    assert_eq!(classify_status(404, None, CallKind::Playback), BackendError::NotFound);
    assert_eq!(
        classify_status(500, Some("no stream".into()), CallKind::Playback),
        BackendError::Unplayable("no stream".into())
    );
    assert_eq!(
        classify_status(500, Some("db".into()), CallKind::Plain),
        BackendError::Status(500, "db".into())
    );
    assert_eq!(
        classify_status(400, None, CallKind::Plain),
        BackendError::Status(400, String::new())
    );
}

#[test]
fn play_error_message_keeps_the_source_link() {
    let payload: ErrorPayload =
        serde_json::from_str(r#"{"error": "boom", "fallback_url": "https://youtu.be/x"}"#).unwrap();
    assert_eq!(
        payload.into_message().as_deref(),
        Some("boom (source: https://youtu.be/x)")
    );

    let plain: ErrorPayload = serde_json::from_str(r#"{"error": "db down"}"#).unwrap();
    assert_eq!(plain.into_message().as_deref(), Some("db down"));
    let empty: ErrorPayload = serde_json::from_str("{}").unwrap();
    assert_eq!(empty.into_message(), None);
}

#[test]
fn error_display_is_readable() {
    assert_eq!(BackendError::Status(418, String::new()).to_string(), "server returned HTTP 418");
    assert_eq!(
        BackendError::Unplayable("gone".into()).to_string(),
        "track cannot be played: gone"
    );
}

#[test]
fn run_job_tags_replies() {
    let backend = FakeBackend {
        library: vec![t(1, "Song1"), t(2, "Song2")],
        ..Default::default()
    };

    match run_job(&backend, BackendJob::RequestPlayback { generation: 7, id: TrackId(2) }) {
        BackendReply::Playback { generation, id, result } => {
            assert_eq!(generation, 7);
            assert_eq!(id, TrackId(2));
            assert_eq!(result.unwrap().stream_url, "http://stream/2");
        }
        other => panic!("unexpected reply {other:?}"),
    }

    assert_eq!(
        run_job(&backend, BackendJob::ToggleFavorite { id: TrackId(1) }),
        BackendReply::FavoriteToggled { id: TrackId(1), result: Ok(true) }
    );
    assert_eq!(
        run_job(&backend, BackendJob::FetchFavorites { seq: 3 }),
        BackendReply::Favorites { seq: 3, result: Ok(vec![t(1, "Song1")]) }
    );
}

#[test]
fn worker_posts_replies_as_events() {
    let backend = FakeBackend {
        library: vec![t(1, "Song1")],
        ..Default::default()
    };
    let (tx, rx) = mpsc::channel::<Event>();
    let worker = BackendWorker::spawn(backend, tx).unwrap();

    worker.send(BackendJob::FetchLibrary { seq: 1 }).unwrap();
    worker
        .send(BackendJob::RequestPlayback { generation: 1, id: TrackId(9) })
        .unwrap();

    let mut got = Vec::new();
    for _ in 0..2 {
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            Event::Backend(reply) => got.push(reply),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert!(got.contains(&BackendReply::Library { seq: 1, result: Ok(vec![t(1, "Song1")]) }));
    assert!(got.contains(&BackendReply::Playback {
        generation: 1,
        id: TrackId(9),
        result: Err(BackendError::NotFound),
    }));
}

/// Serve exactly one canned HTTP response and hand back the raw request head.
fn one_shot_server(response: String) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = v.trim().parse().unwrap_or(0);
            }
            if line == "\r\n" || line.is_empty() {
                break;
            }
            head.push_str(&line);
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();
        head.push_str(&String::from_utf8_lossy(&body));

        let mut stream = stream;
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        head
    });
    (format!("http://{addr}"), handle)
}

fn settings_for(base_url: String) -> BackendSettings {
    BackendSettings {
        base_url,
        session_cookie: Some("tok".into()),
        request_timeout_ms: 2_000,
        play_timeout_ms: 2_000,
        ..BackendSettings::default()
    }
}

#[test]
fn http_play_sends_cookie_and_parses_grant() {
    let body = r#"{"audio_stream_url": "http://cdn/1", "song_id": 1}"#;
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let (base, server) = one_shot_server(response);
    let backend = HttpBackend::new(&settings_for(base));

    let grant = backend.request_playback(TrackId(1)).unwrap();
    assert_eq!(grant.stream_url, "http://cdn/1");

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /api/play "));
    assert!(request.to_ascii_lowercase().contains("cookie: session=tok"));
    assert!(request.contains(r#""song_id":1"#));
}

#[test]
fn http_login_redirect_maps_to_unauthorized() {
    let (base, server) = one_shot_server(
        "HTTP/1.1 302 FOUND\r\nLocation: /login\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            .to_string(),
    );
    let backend = HttpBackend::new(&settings_for(base));

    assert_eq!(backend.fetch_library(), Err(BackendError::Unauthorized));
    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/songs "));
}

#[test]
fn http_play_server_error_is_unplayable_with_source_link() {
    let body = r#"{"error": "extractor failed", "fallback_url": "https://youtu.be/abc"}"#;
    let response = format!(
        "HTTP/1.1 500 INTERNAL SERVER ERROR\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let (base, server) = one_shot_server(response);
    let backend = HttpBackend::new(&settings_for(base));

    match backend.request_playback(TrackId(4)) {
        Err(BackendError::Unplayable(msg)) => {
            assert!(msg.contains("extractor failed"));
            assert!(msg.contains("https://youtu.be/abc"));
        }
        other => panic!("unexpected result {other:?}"),
    }
    server.join().unwrap();
}

#[test]
fn http_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        // Hold the connection open without answering.
        thread::sleep(Duration::from_millis(1_500));
        drop(stream);
    });

    let settings = BackendSettings {
        request_timeout_ms: 200,
        ..settings_for(format!("http://{addr}"))
    };
    let backend = HttpBackend::new(&settings);
    assert_eq!(backend.fetch_library(), Err(BackendError::Timeout));
    server.join().unwrap();
}

#[test]
fn http_refused_connection_is_a_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let backend = HttpBackend::new(&settings_for(format!("http://{addr}")));
    assert!(matches!(backend.fetch_favorites(), Err(BackendError::Network(_))));
}
