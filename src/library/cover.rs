use url::Url;

/// Build a cover image reference for a track from its source `url`.
///
/// YouTube links map to the video's medium-quality thumbnail. The video id is
/// the `v` query parameter, or the last path segment for short links. Anything
/// that does not parse as an absolute URL gets `placeholder`.
pub fn cover_from_url(url: Option<&str>, placeholder: &str) -> String {
    match url.and_then(video_id) {
        Some(id) => format!("https://img.youtube.com/vi/{id}/mqdefault.jpg"),
        None => placeholder.to_string(),
    }
}

fn video_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;

    let from_query = parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty());
    if from_query.is_some() {
        return from_query;
    }

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
