//! Toolbar ("browser action") presentation for the scrobbler: turns
//! controller state into icon/title/popup payloads and pushes them to the
//! host toolbar, with timed temporary icons for love/unlove feedback.

pub mod payload;
pub mod presenter;
pub mod sink;
pub mod tabs;

pub use payload::{BrowserActionPayload, PayloadBuilder, ICON_SIZES};
pub use presenter::{ActionContext, BrowserActionPresenter, TEMP_ICON_DISPLAY_DURATION};
pub use sink::{ActionPart, ApplyOutcome, BrowserActionSink, ToolbarError, ToolbarHost};
pub use tabs::{TabId, TabPresenters};
