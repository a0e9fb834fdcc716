//! Audio playback page

use axum::{extract::Path, response::Html};

/// Minimal HTML page embedding an audio player for a generated file.
///
/// No check that the file exists; a missing asset surfaces as a client-side
/// playback error, not a server error.
pub async fn audio_player(Path(filename): Path<String>) -> Html<String> {
    Html(render_player(&filename))
}

/// Render the player page. The media subtype is the text after the last `.`
/// in the filename, falling back to wav.
fn render_player(filename: &str) -> String {
    // Drop any path components a client may have smuggled in.
    let filename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let subtype = media_subtype(filename);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Ngoma Player</title>
</head>
<body>
    <h1>Now Playing: {filename}</h1>
    <audio controls autoplay>
        <source src="/static/{filename}" type="audio/{subtype}">
        Your browser does not support the audio element.
    </audio>
</body>
</html>
"#
    )
}

fn media_subtype(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => "wav",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_embeds_static_source() {
        let html = render_player("track_0001.wav");
        assert!(html.contains(r#"src="/static/track_0001.wav""#));
        assert!(html.contains(r#"type="audio/wav""#));
        assert!(html.contains("<audio controls"));
    }

    #[test]
    fn subtype_follows_last_extension() {
        let html = render_player("song.final.mp3");
        assert!(html.contains(r#"type="audio/mp3""#));
    }

    #[test]
    fn missing_extension_falls_back_to_wav() {
        assert_eq!(media_subtype("track"), "wav");
        assert_eq!(media_subtype("track."), "wav");
    }

    #[test]
    fn path_components_are_stripped() {
        let html = render_player("../../etc/passwd");
        assert!(html.contains(r#"src="/static/passwd""#));
        assert!(!html.contains(".."));
    }
}
