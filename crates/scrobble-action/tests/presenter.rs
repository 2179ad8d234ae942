use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scrobble_action::{
    ActionContext, BrowserActionPayload, BrowserActionPresenter, TabPresenters, ToolbarError,
    ToolbarHost, TEMP_ICON_DISPLAY_DURATION,
};
use scrobble_proto::config::{ActionConfig, Config, I18nConfig};
use scrobble_proto::i18n::{Localize, MessageCatalog};
use scrobble_proto::mode::{ActionMode, ControllerMode};
use scrobble_proto::song::{ControllerSnapshot, Song};

#[derive(Debug, Clone, PartialEq)]
enum HostCall {
    Icon(BTreeMap<u32, String>),
    Title(String),
    Popup(String),
}

#[derive(Default)]
struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    reject_title: AtomicBool,
    /// Simulated host latency of the icon request.
    icon_delay_ms: AtomicU64,
}

impl RecordingHost {
    fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    fn titles(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Title(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn icon_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, HostCall::Icon(_)))
            .count()
    }
}

impl ToolbarHost for RecordingHost {
    async fn set_icon(&self, paths: &BTreeMap<u32, String>) -> Result<(), ToolbarError> {
        self.calls.lock().unwrap().push(HostCall::Icon(paths.clone()));
        let delay = self.icon_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(())
    }

    async fn set_title(&self, title: &str) -> Result<(), ToolbarError> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Title(title.to_string()));
        if self.reject_title.load(Ordering::SeqCst) {
            return Err(ToolbarError::Rejected("tab closed".into()));
        }
        Ok(())
    }

    async fn set_popup(&self, popup: &str) -> Result<(), ToolbarError> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Popup(popup.to_string()));
        Ok(())
    }
}

type Presenter = BrowserActionPresenter<RecordingHost, MessageCatalog>;

fn setup() -> (Arc<RecordingHost>, Arc<ActionContext<RecordingHost, MessageCatalog>>) {
    let host = Arc::new(RecordingHost::default());
    let ctx = ActionContext::new(host.clone(), Arc::new(MessageCatalog::builtin()));
    (host, Arc::new(ctx))
}

fn playing(artist: &str, track: &str) -> ControllerSnapshot {
    ControllerSnapshot::new(ControllerMode::Playing, Some(Song::new(artist, track)))
}

fn expected(
    ctx: &ActionContext<RecordingHost, MessageCatalog>,
    mode: ActionMode,
    placeholder: Option<&str>,
) -> BrowserActionPayload {
    ctx.builder().build(mode, placeholder)
}

#[tokio::test(start_paused = true)]
async fn update_playing_sets_note_icon_and_title() {
    let (host, ctx) = setup();
    let presenter = Presenter::new(ctx);

    presenter
        .update(&playing("Daft Punk", "Harder, Better, Faster, Stronger"))
        .await;

    assert_eq!(
        host.calls(),
        vec![
            HostCall::Icon(BTreeMap::from([
                (19, "/icons/page_action_note_19.png".to_string()),
                (38, "/icons/page_action_note_38.png".to_string()),
            ])),
            HostCall::Title(
                "Now playing: Daft Punk \u{2014} Harder, Better, Faster, Stronger".to_string()
            ),
            HostCall::Popup("/ui/popups/info.html".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn update_selects_descriptor_for_every_mode() {
    let (host, ctx) = setup();
    let presenter = Presenter::new(ctx);

    for mode in ControllerMode::ALL {
        presenter.update(&ControllerSnapshot::new(mode, None)).await;
        let descriptor = ActionMode::from(mode).descriptor();
        let payload = presenter.current_payload().await.unwrap();

        assert_eq!(
            payload.icon_paths[&19],
            format!("/icons/page_action_{}_19.png", descriptor.icon)
        );
        assert_eq!(payload.popup, descriptor.popup);
        assert_eq!(
            payload.title,
            MessageCatalog::builtin().message(descriptor.title_key, None)
        );
    }
    assert_eq!(host.icon_count(), ControllerMode::ALL.len());
}

#[tokio::test(start_paused = true)]
async fn reset_twice_is_idempotent() {
    let (host, ctx) = setup();
    let presenter = Presenter::new(ctx.clone());

    presenter.reset().await;
    let once = presenter.current_payload().await;
    presenter.reset().await;

    assert_eq!(presenter.current_payload().await, once);
    assert_eq!(once, Some(expected(&ctx, ActionMode::Unsupported, None)));
    assert!(!presenter.is_overriding().await);

    let calls = host.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[..3], calls[3..]);

    tokio::time::sleep(TEMP_ICON_DISPLAY_DURATION * 2).await;
    assert_eq!(host.calls().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn permanent_update_during_override_is_restored_after_delay() {
    let (host, ctx) = setup();
    let presenter = Presenter::new(ctx.clone());
    let song = Song::new("Massive Attack", "Teardrop");

    presenter.update(&playing("Massive Attack", "Teardrop")).await;
    presenter.set_song_loved(true, &song).await;
    let loved = expected(&ctx, ActionMode::Loved, Some("Massive Attack \u{2014} Teardrop"));

    tokio::time::sleep(Duration::from_millis(1000)).await;
    let p2 = ControllerSnapshot::new(ControllerMode::Scrobbled, Some(song.clone()));
    presenter.update(&p2).await;

    // Still showing the loved payload; the host saw nothing new.
    assert_eq!(presenter.current_payload().await, Some(loved));
    assert_eq!(host.icon_count(), 2);

    tokio::time::sleep(TEMP_ICON_DISPLAY_DURATION).await;

    let scrobbled = expected(
        &ctx,
        ControllerMode::Scrobbled.into(),
        Some("Massive Attack \u{2014} Teardrop"),
    );
    assert!(!presenter.is_overriding().await);
    assert_eq!(presenter.current_payload().await, Some(scrobbled.clone()));
    assert_eq!(host.icon_count(), 3);
    assert_eq!(host.titles().last(), Some(&scrobbled.title));
}

#[tokio::test(start_paused = true)]
async fn retriggered_override_restores_once_to_first_target() {
    let (host, ctx) = setup();
    let presenter = Presenter::new(ctx.clone());
    let song = Song::new("Portishead", "Roads");

    presenter.update(&playing("Portishead", "Roads")).await;
    let p1 = presenter.current_payload().await;

    presenter.set_song_loved(true, &song).await;
    tokio::time::sleep(Duration::from_millis(3000)).await;
    presenter.set_song_loved(false, &song).await;
    assert_eq!(presenter.restore_payload().await, p1);

    // Past the first timer's deadline: the second override is still visible.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(presenter.is_overriding().await);
    assert_eq!(
        presenter.current_payload().await.map(|p| p.title),
        Some("Unloved: Portishead \u{2014} Roads".to_string())
    );
    assert_eq!(host.icon_count(), 3);

    tokio::time::sleep(Duration::from_millis(2501)).await;
    assert!(!presenter.is_overriding().await);
    assert_eq!(presenter.current_payload().await, p1);
    assert_eq!(host.icon_count(), 4);

    tokio::time::sleep(TEMP_ICON_DISPLAY_DURATION * 2).await;
    assert_eq!(host.icon_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn rejected_title_never_escapes() {
    let (host, ctx) = setup();
    host.reject_title.store(true, Ordering::SeqCst);
    let presenter = Presenter::new(ctx);
    let song = Song::new("Burial", "Archangel");

    presenter.update(&playing("Burial", "Archangel")).await;
    presenter.set_song_loved(true, &song).await;
    presenter.reset().await;
    tokio::time::sleep(TEMP_ICON_DISPLAY_DURATION * 2).await;

    // update, loved, restore of the deferred reset: icon and popup went out each time.
    assert_eq!(host.icon_count(), 3);
    let popups = host
        .calls()
        .iter()
        .filter(|c| matches!(c, HostCall::Popup(_)))
        .count();
    assert_eq!(popups, 3);
    assert_eq!(
        host.calls().last(),
        Some(&HostCall::Popup("/ui/popups/unsupported.html".to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_presenter_cancels_restore() {
    let (host, ctx) = setup();
    let mut tabs = TabPresenters::new(ctx);

    tabs.attach(7).update(&playing("Bonobo", "Kerala")).await;
    tabs.attach(7)
        .set_song_loved(true, &Song::new("Bonobo", "Kerala"))
        .await;
    tabs.attach(9).reset().await;
    assert_eq!(tabs.len(), 2);

    assert!(tabs.detach(7));
    assert!(!tabs.detach(7));
    tokio::time::sleep(TEMP_ICON_DISPLAY_DURATION * 2).await;

    // update + loved for tab 7, reset for tab 9; no restore for the detached tab.
    assert_eq!(host.icon_count(), 3);
    assert!(tabs.get(7).is_none());
    assert!(!tabs.get(9).unwrap().is_overriding().await);
}

#[tokio::test(start_paused = true)]
async fn temporary_duration_follows_config() {
    let host = Arc::new(RecordingHost::default());
    let config = ActionConfig {
        temp_icon_duration_ms: 250,
        ..ActionConfig::default()
    };
    let ctx = ActionContext::from_config(
        host.clone(),
        Arc::new(MessageCatalog::builtin()),
        &config,
    );
    let presenter = Presenter::new(Arc::new(ctx));

    presenter.reset().await;
    presenter
        .set_song_loved(true, &Song::new("Caribou", "Sun"))
        .await;
    tokio::time::sleep(Duration::from_millis(251)).await;

    assert!(!presenter.is_overriding().await);
    assert_eq!(host.icon_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn dropping_presenter_mid_restore_stops_the_restore() {
    let (host, ctx) = setup();
    host.icon_delay_ms.store(100, Ordering::SeqCst);
    let presenter = Presenter::new(ctx);

    presenter.reset().await;
    presenter
        .set_song_loved(true, &Song::new("Four Tet", "Baby"))
        .await;
    // Restore starts at 5200 ms and waits 100 ms on the icon request.
    tokio::time::sleep(Duration::from_millis(5050)).await;
    assert_eq!(host.icon_count(), 3);

    drop(presenter);
    tokio::time::sleep(TEMP_ICON_DISPLAY_DURATION).await;

    // The interrupted restore never reached the title or popup setters.
    assert_eq!(host.icon_count(), 3);
    assert_eq!(host.titles().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn context_from_app_config_uses_locale_and_delay() {
    let dir = tempfile::tempdir().unwrap();
    let de = dir.path().join("de");
    std::fs::create_dir_all(&de).unwrap();
    std::fs::write(
        de.join("messages.json"),
        r#"{ "pageActionLoved": { "message": "Geliebt: $1" } }"#,
    )
    .unwrap();

    let config = Config {
        action: ActionConfig {
            temp_icon_duration_ms: 1000,
            ..ActionConfig::default()
        },
        i18n: I18nConfig {
            locale: "de".to_string(),
            messages_dir: Some(dir.path().to_path_buf()),
        },
        ..Config::default()
    };
    let host = Arc::new(RecordingHost::default());
    let presenter = Presenter::new(Arc::new(ActionContext::from_app_config(
        host.clone(),
        &config,
    )));

    presenter.reset().await;
    presenter
        .set_song_loved(true, &Song::new("Moderat", "Bad Kingdom"))
        .await;
    assert_eq!(
        host.titles().last().map(String::as_str),
        Some("Geliebt: Moderat \u{2014} Bad Kingdom")
    );

    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert!(!presenter.is_overriding().await);
}
