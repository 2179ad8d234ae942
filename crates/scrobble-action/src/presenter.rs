//! Per-tab toolbar presenter.
//!
//! Maps controller state to a toolbar payload. Love/unlove acknowledgements
//! are shown as a *temporary* payload for a fixed delay, after which the last
//! permanent payload comes back.
//!
//! # States
//! ```text
//!  Idle                   : the toolbar shows the permanent payload
//!  Overriding { restore } : a temporary payload is visible and a restore
//!                           timer runs; permanent updates only replace `restore`
//! ```
//!
//! Re-triggering a temporary payload while overriding cancels the running
//! timer and keeps the original restore target.

use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;

use scrobble_proto::config::{ActionConfig, Config};
use scrobble_proto::i18n::{Localize, MessageCatalog};
use scrobble_proto::mode::ActionMode;
use scrobble_proto::song::{Controller, Song};
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::payload::{BrowserActionPayload, PayloadBuilder};
use crate::sink::{BrowserActionSink, ToolbarHost};

/// Default lifetime of a temporary toolbar payload.
pub const TEMP_ICON_DISPLAY_DURATION: Duration = Duration::from_millis(5000);

/// Everything presenters of different tabs may share: the host toolbar, the
/// payload builder and the temporary-icon delay. Holds no per-tab state.
pub struct ActionContext<H, L> {
    sink: BrowserActionSink<H>,
    builder: PayloadBuilder<L>,
    temp_duration: Duration,
}

impl<H: ToolbarHost, L: Localize + Send + Sync + 'static> ActionContext<H, L> {
    pub fn new(host: Arc<H>, localizer: Arc<L>) -> Self {
        Self::from_config(host, localizer, &ActionConfig::default())
    }

    pub fn from_config(host: Arc<H>, localizer: Arc<L>, config: &ActionConfig) -> Self {
        Self {
            sink: BrowserActionSink::new(host),
            builder: PayloadBuilder::new(config.clone(), localizer),
            temp_duration: config.temp_icon_duration(),
        }
    }

    pub fn builder(&self) -> &PayloadBuilder<L> {
        &self.builder
    }
}

impl<H: ToolbarHost> ActionContext<H, MessageCatalog> {
    /// Context with the configured icon layout, delay and locale.
    pub fn from_app_config(host: Arc<H>, config: &Config) -> Self {
        let catalog = Arc::new(MessageCatalog::from_config(&config.i18n));
        Self::from_config(host, catalog, &config.action)
    }
}

enum OverrideState {
    Idle,
    Overriding {
        /// Distinguishes this override from earlier, cancelled ones.
        generation: u64,
        /// Permanent payload to show once the timer fires.
        restore: Option<BrowserActionPayload>,
    },
}

struct PresenterState {
    /// What the toolbar currently shows (temporary payload while overriding).
    current: Option<BrowserActionPayload>,
    overriding: OverrideState,
    generation: u64,
}

pub struct BrowserActionPresenter<H, L> {
    ctx: Arc<ActionContext<H, L>>,
    state: Arc<Mutex<PresenterState>>,
    /// Restore timer of the active override. Kept outside `state` so it can
    /// be aborted while the timer task holds the state lock.
    timer: std::sync::Mutex<Option<AbortHandle>>,
}

impl<H: ToolbarHost, L: Localize + Send + Sync + 'static> BrowserActionPresenter<H, L> {
    pub fn new(ctx: Arc<ActionContext<H, L>>) -> Self {
        Self {
            ctx,
            state: Arc::new(Mutex::new(PresenterState {
                current: None,
                overriding: OverrideState::Idle,
                generation: 0,
            })),
            timer: std::sync::Mutex::new(None),
        }
    }

    /// Show the payload for the controller's current mode and track.
    pub async fn update<C: Controller + ?Sized>(&self, controller: &C) {
        let placeholder = controller.current_song().map(Song::artist_track_string);
        let payload = self
            .ctx
            .builder
            .build(controller.mode().into(), placeholder.as_deref());
        self.set_permanent(payload).await;
    }

    /// Briefly acknowledge a love/unlove toggle.
    pub async fn set_song_loved(&self, is_loved: bool, song: &Song) {
        let display = song.artist_track_string();
        let payload = self
            .ctx
            .builder
            .build(ActionMode::for_love(is_loved), Some(display.as_str()));
        self.set_temporary(payload).await;
    }

    /// Mark the tab as not supported by any connector.
    pub async fn reset(&self) {
        let payload = self.ctx.builder.build(ActionMode::Unsupported, None);
        self.set_permanent(payload).await;
    }

    /// Payload the toolbar is showing, if any was applied yet.
    pub async fn current_payload(&self) -> Option<BrowserActionPayload> {
        self.state.lock().await.current.clone()
    }

    /// Payload that will come back when the temporary one expires.
    pub async fn restore_payload(&self) -> Option<BrowserActionPayload> {
        match &self.state.lock().await.overriding {
            OverrideState::Idle => None,
            OverrideState::Overriding { restore, .. } => restore.clone(),
        }
    }

    pub async fn is_overriding(&self) -> bool {
        matches!(
            self.state.lock().await.overriding,
            OverrideState::Overriding { .. }
        )
    }

    async fn set_permanent(&self, payload: BrowserActionPayload) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if let OverrideState::Overriding { restore, .. } = &mut state.overriding {
            debug!("Temporary icon visible, deferring {:?}", payload.title);
            *restore = Some(payload);
            return;
        }
        self.ctx.sink.apply(&payload).await;
        state.current = Some(payload);
    }

    async fn set_temporary(&self, payload: BrowserActionPayload) {
        let mut state = self.state.lock().await;

        self.replace_timer(None);
        let restore = match std::mem::replace(&mut state.overriding, OverrideState::Idle) {
            OverrideState::Overriding { restore, .. } => restore,
            OverrideState::Idle => state.current.clone(),
        };

        self.ctx.sink.apply(&payload).await;
        state.current = Some(payload);

        state.generation += 1;
        let generation = state.generation;
        let timer = spawn_restore(
            Arc::downgrade(&self.state),
            self.ctx.clone(),
            generation,
        );
        self.replace_timer(Some(timer.abort_handle()));
        state.overriding = OverrideState::Overriding {
            generation,
            restore,
        };
    }
}

/// Wait out the temporary payload, then put the restore target back.
fn spawn_restore<H, L>(
    state: Weak<Mutex<PresenterState>>,
    ctx: Arc<ActionContext<H, L>>,
    generation: u64,
) -> JoinHandle<()>
where
    H: ToolbarHost,
    L: Localize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(ctx.temp_duration).await;

        // Presenter dropped while we slept.
        let Some(shared) = state.upgrade() else {
            return;
        };
        let mut state = shared.lock().await;

        let restore = match std::mem::replace(&mut state.overriding, OverrideState::Idle) {
            OverrideState::Overriding {
                generation: g,
                restore,
                ..
            } if g == generation => restore,
            other => {
                // Superseded by a newer override.
                state.overriding = other;
                return;
            }
        };

        // Nothing permanent was shown before the override; leave it visible.
        let Some(payload) = restore else {
            return;
        };
        debug!("Temporary icon expired, restoring {:?}", payload.title);
        ctx.sink.apply(&payload).await;
        state.current = Some(payload);
    })
}

impl<H, L> BrowserActionPresenter<H, L> {
    /// Swap in a new restore timer, aborting the previous one.
    fn replace_timer(&self, next: Option<AbortHandle>) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = std::mem::replace(&mut *timer, next) {
            prev.abort();
        }
    }
}

impl<H, L> Drop for BrowserActionPresenter<H, L> {
    fn drop(&mut self) {
        self.replace_timer(None);
    }
}
