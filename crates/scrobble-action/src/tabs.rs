//! One presenter per browser tab.

use std::collections::HashMap;
use std::sync::Arc;

use scrobble_proto::i18n::Localize;
use tracing::debug;

use crate::presenter::{ActionContext, BrowserActionPresenter};
use crate::sink::ToolbarHost;

pub type TabId = u32;

pub struct TabPresenters<H, L> {
    ctx: Arc<ActionContext<H, L>>,
    presenters: HashMap<TabId, BrowserActionPresenter<H, L>>,
}

impl<H: ToolbarHost, L: Localize + Send + Sync + 'static> TabPresenters<H, L> {
    pub fn new(ctx: Arc<ActionContext<H, L>>) -> Self {
        Self {
            ctx,
            presenters: HashMap::new(),
        }
    }

    /// Presenter for `tab`, created on first use.
    pub fn attach(&mut self, tab: TabId) -> &BrowserActionPresenter<H, L> {
        let ctx = &self.ctx;
        self.presenters.entry(tab).or_insert_with(|| {
            debug!("Attaching browser action to tab {}", tab);
            BrowserActionPresenter::new(ctx.clone())
        })
    }

    pub fn get(&self, tab: TabId) -> Option<&BrowserActionPresenter<H, L>> {
        self.presenters.get(&tab)
    }

    /// Drop the tab's presenter, cancelling any pending icon restore.
    pub fn detach(&mut self, tab: TabId) -> bool {
        let removed = self.presenters.remove(&tab).is_some();
        if removed {
            debug!("Detached browser action from tab {}", tab);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.presenters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presenters.is_empty()
    }
}
