use std::rc::Rc;

use gloo::events::EventListener;
use lumen_display_shared::DisplayUpdate;
use yew::prelude::*;

use crate::bindings::bind_page;
use crate::items::apply_items;
use crate::socket::DisplaySocket;

/// Path of the display endpoint on the device, relative to wherever the
/// frontend was served from.
const DISPLAY_PATH: &str = "display";

/// The whole visible document is server-rendered; this component only owns
/// the socket and splices whatever the device pushes.
#[function_component(Application)]
pub fn app() -> Html {
    let page_html = use_state_eq(|| Option::<AttrValue>::None);
    let socket = use_mut_ref(|| Option::<Rc<DisplaySocket>>::None);
    let page_listeners = use_mut_ref(Vec::<EventListener>::new);

    {
        let page_html = page_html.clone();
        let socket = socket.clone();
        use_effect_with((), move |_| {
            let on_update = Callback::from(move |update: DisplayUpdate| match update {
                DisplayUpdate::Page(html) => page_html.set(Some(AttrValue::from(html))),
                DisplayUpdate::Items(items) => apply_items(&items),
            });
            match DisplaySocket::open(DISPLAY_PATH, on_update) {
                Ok(opened) => *socket.borrow_mut() = Some(Rc::new(opened)),
                Err(e) => log::error!("unable to open display socket: {:?}", e),
            }
            || ()
        });
    }

    // Listeners of the replaced page die with their elements; the binding
    // pass runs again over the fresh markup.
    {
        let socket = socket.clone();
        let page_listeners = page_listeners.clone();
        use_effect_with(page_html.clone(), move |page| {
            let mut listeners = page_listeners.borrow_mut();
            listeners.clear();
            if page.is_some() {
                if let Some(socket) = &*socket.borrow() {
                    *listeners = bind_page(socket.clone());
                }
            }
            || ()
        });
    }

    match &*page_html {
        Some(html) => Html::from_html_unchecked(html.clone()),
        None => html! { {"LOADING..."} },
    }
}
