//! Now-playing track info and the controller interface consumed by the
//! toolbar presenter.

use serde::{Deserialize, Serialize};

use crate::mode::ControllerMode;

/// Separator between artist and track in display strings.
pub const ARTIST_TRACK_SEPARATOR: &str = " \u{2014} ";

/// A track as recognized by a connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub artist: String,
    pub track: String,
    #[serde(default)]
    pub album: Option<String>,
}

impl Song {
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            track: track.into(),
            album: None,
        }
    }

    /// "Artist — Track", or whichever half is present.
    pub fn artist_track_string(&self) -> String {
        let artist = self.artist.trim();
        let track = self.track.trim();
        match (artist.is_empty(), track.is_empty()) {
            (false, false) => format!("{}{}{}", artist, ARTIST_TRACK_SEPARATOR, track),
            (false, true) => artist.to_string(),
            (true, false) => track.to_string(),
            (true, true) => String::new(),
        }
    }
}

/// Per-tab playback/scrobbling state machine, as seen by the toolbar.
pub trait Controller {
    fn mode(&self) -> ControllerMode;
    fn current_song(&self) -> Option<&Song>;
}

/// Plain snapshot of a controller, handy for hosts that forward state
/// changes as messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub mode: ControllerMode,
    #[serde(default)]
    pub song: Option<Song>,
}

impl ControllerSnapshot {
    pub fn new(mode: ControllerMode, song: Option<Song>) -> Self {
        Self { mode, song }
    }
}

impl Controller for ControllerSnapshot {
    fn mode(&self) -> ControllerMode {
        self.mode
    }

    fn current_song(&self) -> Option<&Song> {
        self.song.as_ref()
    }
}
