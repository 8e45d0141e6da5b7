use chrono::Utc;
use lumen_display_shared::{ControlEvent, ItemMap};
use serde_json::json;
use tokio::sync::mpsc::Receiver;
use tokio::time::{sleep, Duration};

use crate::display::Display;

const LAYER_COUNT: u32 = 100;
const LAYER_TIME_MS: u64 = 250;

/// Stands in for the printer control firmware, which is not part of this
/// repository: reacts to control events and drives the display so the whole
/// subsystem runs end to end on a desk.
pub(crate) struct VirtualPrinter {
    display: Display,
    events: Receiver<ControlEvent>,
    exposure: String,
    tower_sync: bool,
    tilt_sync: bool,
}

impl VirtualPrinter {
    pub(crate) fn new(display: Display, events: Receiver<ControlEvent>) -> Self {
        Self {
            display,
            events,
            exposure: "8.0".to_string(),
            tower_sync: false,
            tilt_sync: false,
        }
    }

    pub(crate) async fn run(mut self) {
        self.display.show_page("home").await;
        while let Some(event) = self.events.recv().await {
            tracing::debug!(
                "control event on page '{}': '{}' pressed={}",
                event.page,
                event.id,
                event.pressed
            );
            self.handle(event).await;
        }
    }

    async fn handle(&mut self, event: ControlEvent) {
        // Buttons act on the release edge; the press edge only carries field
        // values gathered by the client.
        if event.pressed {
            if event.id == "exposure" {
                let value = event
                    .data
                    .as_ref()
                    .and_then(|data| data.get("exposure"))
                    .cloned();
                if let Some(value) = value {
                    self.set_exposure(value).await;
                }
            }
            return;
        }

        match event.id.as_str() {
            "control" => self.show_control().await,
            "print" => self.run_print().await,
            "sysinfo" => self.show_sysinfo().await,
            "logs" => self.display.show_page("logs").await,
            "back" => self.display.show_page("home").await,
            "tower_sync" => {
                self.tower_sync = !self.tower_sync;
                self.show_logic("tower_sync", self.tower_sync).await;
            }
            "tilt_sync" => {
                self.tilt_sync = !self.tilt_sync;
                self.show_logic("tilt_sync", self.tilt_sync).await;
            }
            other => tracing::debug!("unhandled control '{}'", other),
        }
    }

    async fn set_exposure(&mut self, value: String) {
        self.exposure = value;
        self.display
            .show_items(ItemMap::from([(
                "exposure_now".to_string(),
                json!(format!("{} s", self.exposure)),
            )]))
            .await;
    }

    async fn show_logic(&self, id: &str, on: bool) {
        self.display
            .show_items(ItemMap::from([(
                id.to_string(),
                json!(if on { 1 } else { 0 }),
            )]))
            .await;
    }

    async fn show_control(&self) {
        self.display.show_page("control").await;
        self.display
            .show_items(ItemMap::from([
                (
                    "tower_sync".to_string(),
                    json!(if self.tower_sync { 1 } else { 0 }),
                ),
                (
                    "tilt_sync".to_string(),
                    json!(if self.tilt_sync { 1 } else { 0 }),
                ),
                (
                    "exposure_now".to_string(),
                    json!(format!("{} s", self.exposure)),
                ),
            ]))
            .await;
    }

    async fn show_sysinfo(&self) {
        self.display.show_page("sysinfo").await;
        self.display
            .show_items(ItemMap::from([
                (
                    "time".to_string(),
                    json!(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()),
                ),
                ("version".to_string(), json!(env!("CARGO_PKG_VERSION"))),
            ]))
            .await;
    }

    async fn run_print(&mut self) {
        self.display.show_page("print").await;
        self.display
            .show_items(ItemMap::from([(
                "line2".to_string(),
                json!(format!("Exposure: {} s", self.exposure)),
            )]))
            .await;

        for layer in 0..=LAYER_COUNT {
            let seconds = (u64::from(LAYER_COUNT - layer) * LAYER_TIME_MS) / 1000;
            self.display
                .show_items(ItemMap::from([
                    ("percent".to_string(), json!(format!("{}%", layer))),
                    (
                        "timeremain".to_string(),
                        json!(format!("{:02}:{:02}", seconds / 60, seconds % 60)),
                    ),
                    (
                        "line1".to_string(),
                        json!(format!("Layer: {}/{}", layer, LAYER_COUNT)),
                    ),
                ]))
                .await;

            if self.wait_or_cancel(Duration::from_millis(LAYER_TIME_MS)).await {
                break;
            }
        }
        self.display.show_page("home").await;
    }

    /// True when the operator cancelled while the layer was curing.
    async fn wait_or_cancel(&mut self, pause: Duration) -> bool {
        let timeout = sleep(pause);
        tokio::pin!(timeout);
        loop {
            tokio::select! {
                _ = &mut timeout => return false,
                event = self.events.recv() => match event {
                    Some(event) if event.id == "back" && !event.pressed => return true,
                    Some(_) => continue,
                    None => return true,
                },
            }
        }
    }
}

#[cfg(test)]
mod test {
    use lumen_display_shared::DisplayUpdate;
    use std::collections::HashMap;
    use tokio::sync::mpsc;

    use super::*;

    async fn next_page(updates: &mut tokio::sync::broadcast::Receiver<DisplayUpdate>) -> String {
        loop {
            match updates.recv().await.unwrap() {
                DisplayUpdate::Page(html) => return html,
                DisplayUpdate::Items(_) => continue,
            }
        }
    }

    #[tokio::test]
    pub async fn navigates_on_release_edge_only() {
        let display = Display::new();
        let mut updates = display.subscribe();
        let (tx, rx) = mpsc::channel(10);
        tokio::spawn(VirtualPrinter::new(display, rx).run());

        // A press edge alone must not navigate.
        tx.send(ControlEvent::new("home", "sysinfo", true))
            .await
            .unwrap();
        tx.send(ControlEvent::new("home", "control", false))
            .await
            .unwrap();

        assert!(next_page(&mut updates).await.contains("data-page=\"home\""));
        assert!(next_page(&mut updates)
            .await
            .contains("data-page=\"control\""));
    }

    #[tokio::test]
    pub async fn control_page_reflects_printer_state() {
        let display = Display::new();
        let mut updates = display.subscribe();
        let (tx, rx) = mpsc::channel(10);
        tokio::spawn(VirtualPrinter::new(display, rx).run());

        tx.send(ControlEvent::new("home", "control", false))
            .await
            .unwrap();

        assert!(next_page(&mut updates).await.contains("data-page=\"home\""));
        assert!(next_page(&mut updates)
            .await
            .contains("data-page=\"control\""));
        match updates.recv().await.unwrap() {
            DisplayUpdate::Items(items) => {
                assert_eq!(items["tower_sync"], serde_json::json!(0));
                assert_eq!(items["exposure_now"], serde_json::json!("8.0 s"));
            }
            other => panic!("expected control state items, got {:?}", other),
        }
    }

    #[tokio::test]
    pub async fn exposure_change_is_echoed() {
        let display = Display::new();
        let mut updates = display.subscribe();
        let (tx, rx) = mpsc::channel(10);
        tokio::spawn(VirtualPrinter::new(display, rx).run());

        let mut event = ControlEvent::new("control", "exposure", true);
        event.data = Some(HashMap::from([(
            "exposure".to_string(),
            "12.5".to_string(),
        )]));
        tx.send(event).await.unwrap();

        assert!(next_page(&mut updates).await.contains("data-page=\"home\""));
        match updates.recv().await.unwrap() {
            DisplayUpdate::Items(items) => {
                assert_eq!(items["exposure_now"], serde_json::json!("12.5 s"));
            }
            other => panic!("expected exposure echo, got {:?}", other),
        }
    }

    #[tokio::test]
    pub async fn print_job_can_be_cancelled() {
        let display = Display::new();
        let mut updates = display.subscribe();
        let (tx, rx) = mpsc::channel(10);
        tokio::spawn(VirtualPrinter::new(display, rx).run());

        tx.send(ControlEvent::new("home", "print", false))
            .await
            .unwrap();

        assert!(next_page(&mut updates).await.contains("data-page=\"home\""));
        assert!(next_page(&mut updates).await.contains("data-page=\"print\""));

        tx.send(ControlEvent::new("print", "back", false))
            .await
            .unwrap();

        assert!(next_page(&mut updates).await.contains("data-page=\"home\""));
    }
}
