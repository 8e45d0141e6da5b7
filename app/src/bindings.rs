use std::collections::HashMap;
use std::rc::Rc;

use gloo::events::EventListener;
use lumen_display_shared::ControlEvent;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, HtmlSelectElement};

use crate::logview;
use crate::socket::DisplaySocket;

/// Wire up a freshly rendered page.
///
/// Controls carry marker classes in the server markup: `.click` elements emit
/// a press/release edge pair, `.toggle` checkboxes emit their new state,
/// `.data` fields emit a single edge on change and contribute to the gathered
/// data of every event.
pub(crate) fn bind_page(socket: Rc<DisplaySocket>) -> Vec<EventListener> {
    let document = gloo::utils::document();
    let page = page_name(&document);
    let mut listeners = Vec::new();

    for element in elements(&document, ".click") {
        let id = element.id();
        {
            let socket = socket.clone();
            let page = page.clone();
            let id = id.clone();
            listeners.push(EventListener::new(&element, "mousedown", move |_| {
                send(&socket, &page, &id, true);
            }));
        }
        let socket = socket.clone();
        let page = page.clone();
        listeners.push(EventListener::new(&element, "mouseup", move |_| {
            send(&socket, &page, &id, false);
        }));
    }

    for element in elements(&document, "input.toggle") {
        let Ok(input) = element.dyn_into::<HtmlInputElement>() else {
            continue;
        };
        let socket = socket.clone();
        let page = page.clone();
        let target = input.clone();
        listeners.push(EventListener::new(&input, "change", move |_| {
            send(&socket, &page, &target.id(), target.checked());
        }));
    }

    for element in elements(&document, ".data:not(.toggle)") {
        let socket = socket.clone();
        let page = page.clone();
        let id = element.id();
        listeners.push(EventListener::new(&element, "change", move |_| {
            send(&socket, &page, &id, true);
        }));
    }

    listeners.extend(logview::bind(&document));
    listeners
}

fn send(socket: &DisplaySocket, page: &str, id: &str, pressed: bool) {
    let mut event = ControlEvent::new(page, id, pressed);
    event.data = gather_data(&gloo::utils::document());
    socket.send(&event);
}

/// Current values of all data-bearing elements, keyed by element id.
fn gather_data(document: &Document) -> Option<HashMap<String, String>> {
    let mut data = HashMap::new();
    for element in elements(document, ".data") {
        let id = element.id();
        if id.is_empty() {
            continue;
        }
        data.insert(id, field_value(&element));
    }
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}

fn field_value(element: &Element) -> String {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        if input.type_() == "checkbox" {
            return if input.checked() { "1" } else { "0" }.to_string();
        }
        return input.value();
    }
    if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        return select.value();
    }
    element.text_content().unwrap_or_default()
}

/// The server markup names its own screen; events echo it back.
fn page_name(document: &Document) -> String {
    document
        .query_selector(".page")
        .ok()
        .flatten()
        .and_then(|root| root.get_attribute("data-page"))
        .unwrap_or_default()
}

fn elements(document: &Document, selector: &str) -> Vec<Element> {
    let mut found = Vec::new();
    if let Ok(nodes) = document.query_selector_all(selector) {
        for index in 0..nodes.length() {
            if let Some(element) = nodes
                .get(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                found.push(element);
            }
        }
    }
    found
}
