use crate::model::{SessionState, Track};
use crate::proxy::FETCH_FAILURE_MESSAGE;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write;

const PAGE_TITLE: &str = "SYSTEM_DATA // XLS";

const STYLE: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Share+Tech+Mono&display=swap');
body { margin: 0; background: #000; color: #0f0; font-family: 'Share Tech Mono', monospace; }
a { color: #0f0; text-decoration: none; }
a:hover { color: #fff; text-decoration: underline; }
.file-icon-container { position: absolute; top: 50vh; left: 50vw; transform: translate(-50%, -50%); text-align: center; }
.file-icon { display: block; font-size: 80px; border: 2px dashed #0f0; padding: 40px; background: rgba(0, 255, 0, 0.05); transition: 0.3s; }
.file-icon:hover { background: #0f0; color: #000; text-decoration: none; box-shadow: 0 0 50px rgba(0, 255, 0, 0.5); }
.file-label { display: block; margin-top: 15px; font-size: 0.2em; letter-spacing: 2px; }
.top-bar { display: flex; gap: 2rem; align-items: center; padding: 2rem 2rem 0; }
.controls { display: flex; gap: 1rem; }
.now-playing { flex: 1; }
.error { color: #f33; }
audio { width: 100%; margin-top: 0.5rem; }
.sheet-container { border: 2px solid #0f0; margin: 20px 2rem; }
.sheet-header, .sheet-row { display: flex; align-items: center; }
.sheet-header { border-bottom: 2px double #0f0; background: rgba(0, 255, 0, 0.1); padding: 10px 0; font-weight: bold; text-transform: uppercase; }
.sheet-row { border-bottom: 1px dashed #0f0; transition: background 0.2s; }
.sheet-row:hover { background: rgba(0, 255, 0, 0.05); }
.active-row { background: rgba(0, 255, 0, 0.2); }
.col-a { width: 10%; padding: 10px; text-align: center; border-right: 1px dashed #0f0; }
.col-b { width: 45%; padding: 10px; border-right: 1px dashed #0f0; text-transform: uppercase; }
.col-c { width: 30%; padding: 10px; border-right: 1px dashed #0f0; }
.col-d { width: 15%; padding: 10px; text-align: center; }
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSlot {
    Empty,
    Stream { index: usize },
    Inline { bytes: bytes::Bytes },
    Failed,
}

pub struct PlayerView<'a> {
    pub playlist: &'a [Track],
    pub session: SessionState,
    pub audio: AudioSlot,
}

pub fn landing_page() -> String {
    page(
        r#"<div class="file-icon-container">
  <a href="/?launched=true" class="file-icon">[XLS]<span class="file-label">ACCESS_WORKBOOK</span></a>
</div>"#,
    )
}

pub fn player_page(view: &PlayerView<'_>) -> String {
    let current = view.session.playback.current_index;
    let mut body = String::new();

    body.push_str("<div class=\"top-bar\">\n");
    body.push_str("  <a href=\"/?close_file=true\">&lt;&lt; CLOSE_FILE</a>\n");
    body.push_str("  <div class=\"now-playing\">\n");
    if let Some(track) = current.and_then(|idx| view.playlist.get(idx)) {
        let _ = writeln!(
            body,
            "    <div><strong>NOW_PROCESSING:</strong> {} // {}</div>",
            escape_html(&track.title),
            escape_html(&track.artist)
        );
        body.push_str(&audio_markup(&view.audio));
    }
    body.push_str("  </div>\n");
    let _ = writeln!(
        body,
        "  <div class=\"controls\"><a href=\"/?prev_song=true\">&lt;&lt; PREV</a><a href=\"/?next_song=true\">NEXT &gt;&gt;</a><a href=\"/?toggle_shuffle=true\">SHUFFLE: {}</a></div>",
        if view.session.playback.shuffle_enabled { "ON" } else { "OFF" }
    );
    body.push_str("</div>\n");

    body.push_str("<div class=\"sheet-container\">\n");
    body.push_str(
        "  <div class=\"sheet-header\"><div class=\"col-a\">ID</div><div class=\"col-b\">TRACK_TITLE (CLICK_TO_LOAD)</div><div class=\"col-c\">ARTIST_REF</div><div class=\"col-d\">STATUS</div></div>\n",
    );
    for (idx, track) in view.playlist.iter().enumerate() {
        let playing = current == Some(idx);
        let _ = writeln!(
            body,
            "  <div class=\"sheet-row{}\"><div class=\"col-a\">{:03}</div><div class=\"col-b\"><a href=\"/?play_index={idx}\">{}</a></div><div class=\"col-c\">{}</div><div class=\"col-d\">{}</div></div>",
            if playing { " active-row" } else { "" },
            idx + 1,
            escape_html(&track.title),
            escape_html(&track.artist),
            if playing { "[[ PLAYING ]]" } else { "READY" },
        );
    }
    body.push_str("</div>\n");

    page(&body)
}

fn audio_markup(slot: &AudioSlot) -> String {
    const ON_ENDED: &str = "window.location.href='/?track_ended=true'";
    match slot {
        AudioSlot::Empty => String::new(),
        AudioSlot::Stream { index } => format!(
            "    <audio controls autoplay src=\"/audio/{index}\" onended=\"{ON_ENDED}\"></audio>\n"
        ),
        AudioSlot::Inline { bytes } => format!(
            "    <audio controls autoplay src=\"data:audio/mpeg;base64,{}\" onended=\"{ON_ENDED}\"></audio>\n",
            STANDARD.encode(bytes)
        ),
        AudioSlot::Failed => format!("    <div class=\"error\">{FETCH_FAILURE_MESSAGE}</div>\n"),
    }
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n<title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlaybackState;

    fn playlist() -> Vec<Track> {
        vec![
            Track {
                title: String::from("Signal"),
                artist: String::from("Ghost"),
                url: Some(String::from("https://x/1.mp3")),
            },
            Track {
                title: String::from("<Noise>"),
                artist: String::from("R&D"),
                url: None,
            },
        ]
    }

    fn playing(index: Option<usize>) -> SessionState {
        SessionState {
            launched: true,
            playback: PlaybackState {
                current_index: index,
                shuffle_enabled: false,
            },
        }
    }

    #[test]
    fn landing_links_to_launch() {
        let html = landing_page();
        assert!(html.contains("href=\"/?launched=true\""));
        assert!(html.contains("ACCESS_WORKBOOK"));
    }

    #[test]
    fn rows_are_numbered_and_escaped() {
        let tracks = playlist();
        let html = player_page(&PlayerView {
            playlist: &tracks,
            session: playing(None),
            audio: AudioSlot::Empty,
        });
        assert!(html.contains(">001<"));
        assert!(html.contains(">002<"));
        assert!(html.contains("&lt;Noise&gt;"));
        assert!(html.contains("R&amp;D"));
        assert!(!html.contains("NOW_PROCESSING"));
        assert!(!html.contains("[[ PLAYING ]]"));
    }

    #[test]
    fn current_row_is_highlighted_with_stream() {
        let tracks = playlist();
        let html = player_page(&PlayerView {
            playlist: &tracks,
            session: playing(Some(0)),
            audio: AudioSlot::Stream { index: 0 },
        });
        assert!(html.contains("sheet-row active-row"));
        assert!(html.contains("[[ PLAYING ]]"));
        assert!(html.contains("src=\"/audio/0\""));
        assert!(html.contains("track_ended=true"));
        assert!(html.contains("NOW_PROCESSING:</strong> Signal // Ghost"));
    }

    #[test]
    fn inline_audio_is_base64_encoded() {
        let tracks = playlist();
        let html = player_page(&PlayerView {
            playlist: &tracks,
            session: playing(Some(0)),
            audio: AudioSlot::Inline {
                bytes: bytes::Bytes::from_static(b"ID3"),
            },
        });
        assert!(html.contains("data:audio/mpeg;base64,SUQz"));
    }

    #[test]
    fn failed_fetch_shows_error_message() {
        let tracks = playlist();
        let html = player_page(&PlayerView {
            playlist: &tracks,
            session: playing(Some(0)),
            audio: AudioSlot::Failed,
        });
        assert!(html.contains(FETCH_FAILURE_MESSAGE));
        assert!(!html.contains("<audio"));
    }
}
