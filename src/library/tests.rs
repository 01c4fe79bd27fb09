use super::*;

fn t(id: i64, title: &str, artist: &str) -> Track {
    Track {
        id: TrackId(id),
        title: title.into(),
        artist: artist.into(),
        cover: String::new(),
    }
}

fn ids(tracks: &[Track]) -> Vec<i64> {
    tracks.iter().map(|t| t.id.0).collect()
}

#[test]
fn empty_query_is_identity() {
    let tracks = vec![t(1, "Alpha", "x"), t(2, "Beta", "y"), t(3, "Gamma", "z")];
    assert_eq!(filter(&tracks, ""), tracks);
}

#[test]
fn whitespace_in_query_is_part_of_the_match() {
    let tracks = vec![t(1, "Rock", "x"), t(2, "Hard Rock", "y")];
    assert_eq!(ids(&filter(&tracks, " rock")), vec![2]);
    assert_eq!(ids(&filter(&tracks, "rock")), vec![1, 2]);
    assert!(filter(&tracks, "   ").is_empty());
}

#[test]
fn substring_match_keeps_source_order() {
    let tracks = vec![t(3, "Gamma", "x"), t(1, "Alphabet", "y"), t(2, "Beta", "z")];
    assert_eq!(ids(&filter(&tracks, "bet")), vec![1, 2]);
    assert_eq!(ids(&filter(&tracks, "eta")), vec![2]);
}

#[test]
fn match_is_case_insensitive_on_title_or_artist() {
    let tracks = vec![
        t(1, "Paranoid", "Black Sabbath"),
        t(2, "Blackened", "Metallica"),
        t(3, "Ace of Spades", "Motörhead"),
    ];
    assert_eq!(ids(&filter(&tracks, "BLACK")), vec![1, 2]);
    assert_eq!(ids(&filter(&tracks, "sabbath")), vec![1]);
    assert_eq!(ids(&filter(&tracks, "MOTÖR")), vec![3]);
}

#[test]
fn substring_not_subsequence() {
    let tracks = vec![t(1, "Metallica - Blackened", "")];
    assert!(filter(&tracks, "mtbk").is_empty());
}

#[test]
fn track_id_parses_and_displays() {
    assert_eq!(" 42 ".parse::<TrackId>().unwrap(), TrackId(42));
    assert!("abc".parse::<TrackId>().is_err());
    assert_eq!(TrackId(7).to_string(), "7");
}

#[test]
fn cover_uses_youtube_video_id() {
    let ph = "placeholder";
    assert_eq!(
        cover_from_url(Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10"), ph),
        "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
    );
    assert_eq!(
        cover_from_url(Some("https://youtu.be/dQw4w9WgXcQ"), ph),
        "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
    );
}

#[test]
fn cover_decodes_query_parameters() {
    assert_eq!(
        cover_from_url(Some("https://www.youtube.com/watch?v=ab%2Dcd"), "ph"),
        "https://img.youtube.com/vi/ab-cd/mqdefault.jpg"
    );
    // An empty `v` falls through to the path.
    assert_eq!(
        cover_from_url(Some("https://youtu.be/xyz?v="), "ph"),
        "https://img.youtube.com/vi/xyz/mqdefault.jpg"
    );
}

#[test]
fn cover_falls_back_to_placeholder() {
    let ph = "placeholder";
    assert_eq!(cover_from_url(None, ph), ph);
    assert_eq!(cover_from_url(Some("not a url"), ph), ph);
    assert_eq!(cover_from_url(Some("https://example.com"), ph), ph);
    assert_eq!(cover_from_url(Some("https://example.com/"), ph), ph);
}
