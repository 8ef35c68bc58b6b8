use std::fmt::Display;

use crate::status::{NowPlaying, PlaybackState};

const TITLE_MAX_CHARS: usize = 30;
const ELLIPSIS: char = '…';

const QUEUE_COLOR: &str = "#afd";
const ARTIST_COLOR: &str = "#adf";
const TITLE_COLOR: &str = "#fad";
const TIME_COLOR: &str = "#dfa";
const ALBUM_COLOR: &str = "#fda";

/// Text for both sinks. `notification` is `None` when no popup should be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub status: String,
    pub notification: Option<String>,
}

pub fn render(now_playing: &NowPlaying, include_notification: bool) -> Rendering {
    if now_playing.playback_state == PlaybackState::Stopped {
        return Rendering {
            status: " [stopped] ".to_string(),
            notification: include_notification.then(|| {
                format!(
                    "<b>[stopped]</b>\n{} tracks in queue",
                    now_playing.queue_total
                )
            }),
        };
    }

    let paused = now_playing.playback_state == PlaybackState::Paused;
    let position = queue_position(now_playing);

    let mut status = String::new();
    if paused {
        status.push_str(" <b>[p]</b>");
    }
    status.push_str(&format!(
        " [<b>{}:</b> {} / {}]",
        span(QUEUE_COLOR, &position),
        span(ARTIST_COLOR, escape_quoted(&now_playing.artist)),
        span(TITLE_COLOR, escape_quoted(&short_title(&now_playing.title))),
    ));
    status.push_str(&format!(
        " [<b>{}</b>/{}]",
        span(TIME_COLOR, escape_quoted(&now_playing.position)),
        span(TIME_COLOR, escape_quoted(&now_playing.duration)),
    ));

    let notification = include_notification.then(|| {
        let mut text = String::new();
        if paused {
            text.push_str("<b>[paused]</b>\n");
        }
        text.push_str(&format!(
            "\nNow playing track <b>{}</b>/{}:\n\n",
            span(QUEUE_COLOR, &position),
            span(QUEUE_COLOR, now_playing.queue_total),
        ));
        text.push_str(&format!(
            "\t<b>{}</b>\nby\t<b>{}</b>\n",
            span(TITLE_COLOR, escape_markup(&now_playing.title)),
            span(ARTIST_COLOR, escape_markup(&now_playing.artist)),
        ));
        text.push_str(&format!(
            "from\t{}",
            span(ALBUM_COLOR, escape_markup(&now_playing.album))
        ));
        text
    });

    Rendering {
        status,
        notification,
    }
}

fn queue_position(now_playing: &NowPlaying) -> String {
    if now_playing.queue_total == 0 {
        "-".to_string()
    } else {
        now_playing.queue_position.to_string()
    }
}

fn short_title(title: &str) -> String {
    if title.chars().count() < TITLE_MAX_CHARS {
        return title.to_string();
    }
    let mut short: String = title.chars().take(TITLE_MAX_CHARS).collect();
    short.push(ELLIPSIS);
    short
}

fn span(color: &str, value: impl Display) -> String {
    format!("<span foreground=\"{color}\">{value}</span>")
}

fn escape_markup(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The status bar text ends up inside a quoted expression, so quotes coming
/// from the daemon must not survive as literal characters.
fn escape_quoted(value: &str) -> String {
    escape_markup(value).replace('"', "&quot;")
}
