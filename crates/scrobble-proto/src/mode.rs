//! Controller modes and the toolbar descriptor table.
//!
//! Every mode the controller can report maps to exactly one
//! [`ModeDescriptor`] through an exhaustive `match`, so a missing entry is a
//! compile error rather than a lookup failure at runtime.

use serde::{Deserialize, Serialize};

/// Discrete playback/scrobbling state reported by a tab's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerMode {
    /// Connector injected, nothing playing yet.
    Base,
    /// Track info is being resolved.
    Loading,
    /// Track recognized and now playing.
    Playing,
    /// Track has been scrobbled.
    Scrobbled,
    /// Track was skipped by the user.
    Skipped,
    /// Track is ignored by the scrobbling service.
    Ignored,
    /// Connector disabled in options.
    Disabled,
    /// Track could not be recognized.
    Unknown,
    /// Scrobbling failed.
    Err,
}

impl ControllerMode {
    pub const ALL: [ControllerMode; 9] = [
        ControllerMode::Base,
        ControllerMode::Loading,
        ControllerMode::Playing,
        ControllerMode::Scrobbled,
        ControllerMode::Skipped,
        ControllerMode::Ignored,
        ControllerMode::Disabled,
        ControllerMode::Unknown,
        ControllerMode::Err,
    ];
}

/// Everything the toolbar can show: one entry per controller mode plus the
/// three states that are only reachable through explicit calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionMode {
    Controller(ControllerMode),
    Loved,
    Unloved,
    Unsupported,
}

impl From<ControllerMode> for ActionMode {
    fn from(mode: ControllerMode) -> Self {
        ActionMode::Controller(mode)
    }
}

/// Static toolbar assets for one [`ActionMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    /// Icon base name, expanded into per-size asset paths.
    pub icon: &'static str,
    /// Popup document; empty disables the popup.
    pub popup: &'static str,
    /// Localization key of the toolbar title.
    pub title_key: &'static str,
}

const POPUP_INFO: &str = "/ui/popups/info.html";

impl ActionMode {
    pub fn descriptor(self) -> ModeDescriptor {
        let (icon, popup, title_key) = match self {
            ActionMode::Controller(mode) => match mode {
                ControllerMode::Base => ("base", "/ui/popups/go-play-music.html", "pageActionBase"),
                ControllerMode::Loading => ("loading", "", "pageActionLoading"),
                ControllerMode::Playing => ("note", POPUP_INFO, "pageActionRecognized"),
                ControllerMode::Scrobbled => ("tick", POPUP_INFO, "pageActionScrobbled"),
                ControllerMode::Skipped => ("skipped", POPUP_INFO, "pageActionSkipped"),
                ControllerMode::Ignored => ("ignored", "", "pageActionIgnored"),
                ControllerMode::Disabled => {
                    ("disabled", "/ui/popups/disabled.html", "pageActionDisabled")
                }
                ControllerMode::Unknown => ("unknown", POPUP_INFO, "pageActionUnknown"),
                ControllerMode::Err => ("error", "/ui/popups/error.html", "pageActionError"),
            },
            ActionMode::Loved => ("loved", POPUP_INFO, "pageActionLoved"),
            ActionMode::Unloved => ("unloved", POPUP_INFO, "pageActionUnloved"),
            ActionMode::Unsupported => (
                "unsupported",
                "/ui/popups/unsupported.html",
                "pageActionUnsupported",
            ),
        };
        ModeDescriptor {
            icon,
            popup,
            title_key,
        }
    }

    /// Mode shown for a love toggle acknowledgement.
    pub fn for_love(is_loved: bool) -> Self {
        if is_loved {
            ActionMode::Loved
        } else {
            ActionMode::Unloved
        }
    }
}
