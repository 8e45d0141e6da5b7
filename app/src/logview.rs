use gloo::events::EventListener;
use js_sys::RegExp;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlInputElement, Request, RequestInit, RequestMode, Response};

const LOG_ENDPOINT: &str = "/logf";
const TAIL_LINES: usize = 256;

/// Hook the device log viewer if the current page carries one: a `.logview`
/// refresh control, a `#filter` field and a `#log` output element. Filtering
/// runs in the browser, the device only serves the raw file.
pub(crate) fn bind(document: &Document) -> Vec<EventListener> {
    let mut listeners = Vec::new();
    let Ok(Some(refresh)) = document.query_selector(".logview") else {
        return listeners;
    };
    listeners.push(EventListener::new(&refresh, "click", |_| refresh_log()));
    refresh_log();
    listeners
}

fn refresh_log() {
    spawn_local(async move {
        let document = gloo::utils::document();
        let Some(log) = document.get_element_by_id("log") else {
            return;
        };
        let pattern = document
            .get_element_by_id("filter")
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default();

        let text = match fetch_log().await {
            Ok(text) => text,
            Err(e) => {
                log::error!("unable to fetch device log: {:?}", e);
                return;
            }
        };
        let lines = filter_lines(&text, &pattern);
        log.set_text_content(Some(&tail(&lines, TAIL_LINES).join("\n")));
    });
}

async fn fetch_log() -> Result<String, JsValue> {
    let mut opts = RequestInit::new();
    opts.method("GET");
    opts.mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(LOG_ENDPOINT, &opts)?;

    let window = gloo::utils::window();
    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;
    Ok(text.as_string().unwrap_or_default())
}

/// The filter is an operator-supplied JS regular expression, matched per
/// line without flags.
fn filter_lines(text: &str, pattern: &str) -> Vec<String> {
    if pattern.is_empty() {
        return text.lines().map(|line| line.to_string()).collect();
    }
    let regex = RegExp::new(pattern, "");
    text.lines()
        .filter(|line| regex.test(line))
        .map(|line| line.to_string())
        .collect()
}

fn tail(lines: &[String], limit: usize) -> &[String] {
    let start = lines.len().saturating_sub(limit);
    &lines[start..]
}
