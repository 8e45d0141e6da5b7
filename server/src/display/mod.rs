use std::sync::Arc;

use lumen_display_shared::{DisplayUpdate, ItemMap};
use tokio::sync::{broadcast, Mutex};

use crate::pages;

/// What a client connecting right now must be sent to converge with the
/// live screen: the current page plus the item values shown on it since the
/// page was pushed.
struct Replay {
    html: String,
    items: ItemMap,
}

/// Handle the control side drives and the socket handlers subscribe to.
/// All connected browsers see the same screen.
#[derive(Clone)]
pub(crate) struct Display {
    updates: broadcast::Sender<DisplayUpdate>,
    replay: Arc<Mutex<Replay>>,
}

impl Display {
    pub(crate) fn new() -> Self {
        let (updates, _) = broadcast::channel(100);
        Self {
            updates,
            replay: Arc::new(Mutex::new(Replay {
                html: pages::page_html(pages::START_PAGE).to_string(),
                items: ItemMap::new(),
            })),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<DisplayUpdate> {
        self.updates.subscribe()
    }

    /// Replace the visible document on every client. Sticky items belong to
    /// the replaced page and are dropped with it.
    pub(crate) async fn show_page(&self, name: &str) {
        let html = pages::page_html(name);
        let mut replay = self.replay.lock().await;
        replay.html = html.to_string();
        replay.items.clear();
        let _ = self.updates.send(DisplayUpdate::Page(html.to_string()));
    }

    /// Patch single elements in place on every client.
    pub(crate) async fn show_items(&self, items: ItemMap) {
        if items.is_empty() {
            return;
        }
        let mut replay = self.replay.lock().await;
        replay.items.extend(items.clone());
        let _ = self.updates.send(DisplayUpdate::Items(items));
    }

    pub(crate) async fn replay(&self) -> Vec<DisplayUpdate> {
        let replay = self.replay.lock().await;
        let mut updates = vec![DisplayUpdate::Page(replay.html.clone())];
        if !replay.items.is_empty() {
            updates.push(DisplayUpdate::Items(replay.items.clone()));
        }
        updates
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    pub fn replay_starts_on_home_page() {
        let display = Display::new();
        let replay = futures::executor::block_on(display.replay());
        match &replay[..] {
            [DisplayUpdate::Page(html)] => assert!(html.contains("data-page=\"home\"")),
            other => panic!("unexpected replay {:?}", other),
        }
    }

    #[tokio::test]
    pub async fn items_merge_into_replay() {
        let display = Display::new();
        display
            .show_items(ItemMap::from([("percent".to_string(), json!("5%"))]))
            .await;
        display
            .show_items(ItemMap::from([
                ("percent".to_string(), json!("10%")),
                ("timeremain".to_string(), json!("01:30")),
            ]))
            .await;

        let replay = display.replay().await;
        assert_eq!(replay.len(), 2);
        match &replay[1] {
            DisplayUpdate::Items(items) => {
                assert_eq!(items["percent"], json!("10%"));
                assert_eq!(items["timeremain"], json!("01:30"));
            }
            other => panic!("unexpected replay entry {:?}", other),
        }
    }

    #[tokio::test]
    pub async fn page_change_drops_sticky_items() {
        let display = Display::new();
        display
            .show_items(ItemMap::from([("percent".to_string(), json!("99%"))]))
            .await;
        display.show_page("control").await;

        let replay = display.replay().await;
        match &replay[..] {
            [DisplayUpdate::Page(html)] => assert!(html.contains("data-page=\"control\"")),
            other => panic!("unexpected replay {:?}", other),
        }
    }

    #[tokio::test]
    pub async fn subscribers_observe_updates() {
        let display = Display::new();
        let mut updates = display.subscribe();
        display.show_page("sysinfo").await;

        match updates.try_recv() {
            Ok(DisplayUpdate::Page(html)) => assert!(html.contains("data-page=\"sysinfo\"")),
            other => panic!("expected page push, got {:?}", other),
        }
    }

    #[tokio::test]
    pub async fn empty_item_updates_are_not_broadcast() {
        let display = Display::new();
        let mut updates = display.subscribe();
        display.show_items(ItemMap::new()).await;
        assert!(updates.try_recv().is_err());
    }
}
