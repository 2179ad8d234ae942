//! Toolbar payloads: what the host is asked to show for one mode.

use std::collections::BTreeMap;
use std::sync::Arc;

use scrobble_proto::config::ActionConfig;
use scrobble_proto::i18n::Localize;
use scrobble_proto::mode::ActionMode;

/// Pixel sizes every toolbar icon is provided in.
pub const ICON_SIZES: [u32; 2] = [19, 38];

/// Icon, title and popup for the toolbar button of one tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserActionPayload {
    /// Asset path keyed by pixel size.
    pub icon_paths: BTreeMap<u32, String>,
    pub title: String,
    /// Popup document; empty disables the popup.
    pub popup: String,
}

/// Resolves modes into payloads using the icon layout and a localizer.
pub struct PayloadBuilder<L> {
    action: ActionConfig,
    localizer: Arc<L>,
}

impl<L: Localize> PayloadBuilder<L> {
    pub fn new(action: ActionConfig, localizer: Arc<L>) -> Self {
        Self { action, localizer }
    }

    pub fn build(&self, mode: ActionMode, placeholder: Option<&str>) -> BrowserActionPayload {
        let descriptor = mode.descriptor();
        let icon_paths = ICON_SIZES
            .iter()
            .map(|size| (*size, self.action.icon_path(descriptor.icon, *size)))
            .collect();

        BrowserActionPayload {
            icon_paths,
            title: self.localizer.message(descriptor.title_key, placeholder),
            popup: descriptor.popup.to_string(),
        }
    }
}
