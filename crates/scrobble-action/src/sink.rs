//! Pushes payloads to the host toolbar.
//!
//! Icon, title and popup are separate host requests. A rejected request is
//! logged and the remaining ones are still issued, so a partially updated
//! toolbar is possible and accepted.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::payload::BrowserActionPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolbarError {
    /// The host refused the request (tab closed, invalid path, ...).
    #[error("request rejected: {0}")]
    Rejected(String),
    /// The toolbar API is not available in this context.
    #[error("toolbar API unavailable")]
    Unavailable,
}

/// Toolbar setters exposed by the host environment.
pub trait ToolbarHost: Send + Sync + 'static {
    fn set_icon(
        &self,
        paths: &BTreeMap<u32, String>,
    ) -> impl Future<Output = Result<(), ToolbarError>> + Send;

    fn set_title(&self, title: &str) -> impl Future<Output = Result<(), ToolbarError>> + Send;

    /// An empty `popup` disables the popup.
    fn set_popup(&self, popup: &str) -> impl Future<Output = Result<(), ToolbarError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPart {
    Icon,
    Title,
    Popup,
}

impl fmt::Display for ActionPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionPart::Icon => "icon",
            ActionPart::Title => "title",
            ActionPart::Popup => "popup",
        };
        f.write_str(name)
    }
}

/// Which parts of a payload the host rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub failed: Vec<(ActionPart, ToolbarError)>,
}

impl ApplyOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct BrowserActionSink<H> {
    host: Arc<H>,
}

impl<H: ToolbarHost> BrowserActionSink<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// Request icon, title and popup in that order. Never fails; rejected
    /// parts are reported in the outcome and logged as one warning.
    pub async fn apply(&self, payload: &BrowserActionPayload) -> ApplyOutcome {
        let mut outcome = ApplyOutcome::default();

        if let Err(e) = self.host.set_icon(&payload.icon_paths).await {
            outcome.failed.push((ActionPart::Icon, e));
        }
        if let Err(e) = self.host.set_title(&payload.title).await {
            outcome.failed.push((ActionPart::Title, e));
        }
        if let Err(e) = self.host.set_popup(&payload.popup).await {
            outcome.failed.push((ActionPart::Popup, e));
        }

        if outcome.is_complete() {
            debug!("Browser action set: {:?}", payload.title);
        } else {
            let details: Vec<String> = outcome
                .failed
                .iter()
                .map(|(part, e)| format!("{}: {}", part, e))
                .collect();
            warn!("Unable to set browser action ({})", details.join(", "));
        }
        outcome
    }
}
