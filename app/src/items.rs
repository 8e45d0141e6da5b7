use lumen_display_shared::ItemMap;
use serde_json::Value;
use web_sys::Document;

/// Splice incoming item updates into the current page.
///
/// A value lands in one of three places, mirroring what the device can
/// address: a logic button's active state, a value sub-element's text, or
/// the whole element as HTML.
pub(crate) fn apply_items(items: &ItemMap) {
    let document = gloo::utils::document();
    for (id, value) in items {
        update_item(&document, id, value);
    }
}

fn update_item(document: &Document, id: &str, value: &Value) {
    let Some(element) = document.get_element_by_id(id) else {
        // The device may address items the current page does not carry.
        log::warn!("item update for unknown element '{}'", id);
        return;
    };
    if let Ok(Some(button)) = element.query_selector(".btn.logic") {
        let _ = button.class_list().toggle_with_force("active", is_on(value));
    } else if let Ok(Some(target)) = element.query_selector(".value") {
        target.set_text_content(Some(&item_text(value)));
    } else {
        element.set_inner_html(&item_text(value));
    }
}

fn is_on(value: &Value) -> bool {
    match value {
        Value::Bool(on) => *on,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0).unwrap_or(false),
        _ => false,
    }
}

fn item_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
