//! Turns a [`NormalizedPresence`] into the fields pushed to the chat client.

use serde::Serialize;

use crate::error::JellyrpcError;
use crate::models::{ActivityKind, ExternalUrl, MediaKind, NormalizedPresence};

/// Jellyfin ticks per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Rich presence accepts at most two buttons.
pub const MAX_BUTTONS: usize = 2;

/// Discord rejects text fields shorter than this.
const MIN_TEXT_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceButton {
    pub label: String,
    pub url: String,
}

/// Everything one rich-presence update carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresencePayload {
    pub activity: ActivityKind,
    pub details: String,
    pub state: String,
    /// Epoch seconds.
    pub start: i64,
    /// Epoch seconds.
    pub end: i64,
    pub large_image: Option<String>,
    pub large_text: String,
    pub small_text: String,
    pub buttons: Vec<PresenceButton>,
}

/// `m:ss` for a tick count. Minutes are not wrapped into hours.
pub fn format_time(ticks: i64) -> String {
    let seconds = ticks.max(0) / TICKS_PER_SECOND;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Start and end epoch seconds so the client counts down on its own.
pub fn timestamps(now: i64, position_ticks: i64, run_time_ticks: i64) -> (i64, i64) {
    let start = now - position_ticks.max(0) / TICKS_PER_SECOND;
    let end = start + run_time_ticks.max(0) / TICKS_PER_SECOND;
    (start, end)
}

/// Optional facts, pause/mute flags and the client name, one per line.
pub fn status_lines(presence: &NormalizedPresence) -> Vec<String> {
    let mut lines = Vec::new();

    match &presence.kind {
        MediaKind::Audio {
            track: Some(track), ..
        } => lines.push(format!("Track: {track}")),
        MediaKind::Movie {
            year: Some(year), ..
        } => lines.push(format!("Released: {year}")),
        MediaKind::Episode { series, .. } => lines.push(format!("Series: {series}")),
        MediaKind::Audio { .. } | MediaKind::Movie { .. } | MediaKind::Other { .. } => {}
    }

    if presence.is_paused {
        lines.push("⏸️ Paused".into());
    }
    if presence.is_muted {
        lines.push("🔇 Muted".into());
    }
    lines.push(format!("via {}", presence.client_name));
    lines
}

/// Link buttons in their original order. Links without a name or URL are
/// skipped, anything past [`MAX_BUTTONS`] is dropped.
pub fn buttons(links: &[ExternalUrl]) -> Vec<PresenceButton> {
    links
        .iter()
        .filter(|link| !link.name.is_empty() && !link.url.is_empty())
        .take(MAX_BUTTONS)
        .map(|link| PresenceButton {
            label: link.name.clone(),
            url: link.url.clone(),
        })
        .collect()
}

/// Build the update for `presence` as seen at `now` (epoch seconds).
pub fn compose(presence: &NormalizedPresence, now: i64) -> Result<PresencePayload, JellyrpcError> {
    let run_time = presence
        .run_time_ticks
        .ok_or_else(|| JellyrpcError::MissingTiming(presence.title.clone()))?;

    let (start, end) = timestamps(now, presence.position_ticks, run_time);

    let mut small = status_lines(presence);
    small.push(format!(
        "{} / {}",
        format_time(presence.position_ticks),
        format_time(run_time)
    ));

    Ok(PresencePayload {
        activity: presence.activity,
        details: pad(&presence.details),
        state: pad(&presence.state),
        start,
        end,
        large_image: presence.image_url.clone(),
        large_text: pad(presence.caption()),
        small_text: small.join("\n"),
        buttons: buttons(&presence.links),
    })
}

fn pad(text: &str) -> String {
    let len = text.chars().count();
    if len >= MIN_TEXT_LEN {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(MIN_TEXT_LEN - len))
    }
}
