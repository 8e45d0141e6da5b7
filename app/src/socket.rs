use gloo::events::EventListener;
use lumen_display_shared::{ControlEvent, DisplayUpdate};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, WebSocket};
use yew::Callback;

pub(crate) struct DisplaySocket {
    socket: WebSocket,
    _handlers: Vec<EventListener>,
}

impl DisplaySocket {
    pub(crate) fn open(path: &str, on_update: Callback<DisplayUpdate>) -> Result<Self, JsValue> {
        let href = gloo::utils::window().location().href()?;
        let url = socket_url(&href, path)
            .ok_or_else(|| JsValue::from_str("unable to derive socket url"))?;
        let socket = WebSocket::new(&url)?;

        let mut handlers = Vec::new();

        handlers.push(EventListener::new(&socket, "message", move |event| {
            let Some(message) = event.dyn_ref::<MessageEvent>() else {
                return;
            };
            let Some(text) = message.data().as_string() else {
                return;
            };
            match serde_json::from_str::<DisplayUpdate>(&text) {
                Ok(update) => on_update.emit(update),
                Err(e) => log::warn!("invalid display frame: {}", e),
            }
        }));

        // The device going away mid-session has no client-side recovery, the
        // page is reloaded and the server replays the current screen.
        handlers.push(EventListener::new(&socket, "close", |_| {
            gloo::dialogs::alert("Connection closed");
            let _ = gloo::utils::window().location().reload();
        }));

        handlers.push(EventListener::new(&socket, "error", |event| {
            log::error!("display socket error: {:?}", event);
            gloo::dialogs::alert("Connection error");
        }));

        Ok(Self {
            socket,
            _handlers: handlers,
        })
    }

    pub(crate) fn send(&self, event: &ControlEvent) {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("unable to encode control event: {}", e);
                return;
            }
        };
        if let Err(e) = self.socket.send_with_str(&frame) {
            log::error!("unable to send control event: {:?}", e);
        }
    }
}

/// ws(s) endpoint derived from the document location, so the frontend works
/// from whatever host and port the device serves it on.
pub(crate) fn socket_url(href: &str, path: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme).ok()?;
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}
