//! WebAssembly entry point: binds the page's dialogs to the browser DOM.

use dialogkit_core::{
    Completion, DialogHost, Dom, LifecycleEvent, LifecycleKind, WebDom, DIALOG_ATTR,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CustomEvent, CustomEventInit, Document, Element, Event, KeyboardEvent};

type SharedHost = Rc<RefCell<DialogHost<WebDom>>>;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Re-emit a lifecycle notification as a DOM `CustomEvent` on the dialog
/// element so page scripts can observe (and cancel) it.
/// Returns `false` when a page listener canceled it.
fn redispatch(document: &Document, event: &LifecycleEvent) -> bool {
    let selector = format!("[{}=\"{}\"]", dialogkit_core::dom::NODE_ID_ATTR, event.target());
    let Some(element) = document.query_selector(&selector).ok().flatten() else {
        return true;
    };

    let init = CustomEventInit::new();
    init.set_bubbles(event.bubbles());
    init.set_cancelable(event.cancelable());
    let detail = match event.launcher() {
        Some(launcher) => JsValue::from_str(&launcher.to_string()),
        None => JsValue::NULL,
    };
    init.set_detail(&detail);

    match CustomEvent::new_with_event_init_dict(event.name(), &init) {
        Ok(custom) => element.dispatch_event(&custom).unwrap_or(true),
        Err(err) => {
            log::warn!("Failed to create {}: {:?}", event.name(), err);
            true
        }
    }
}

fn forward_lifecycle(host: &mut DialogHost<WebDom>, document: &Document) {
    let root = host.dom().document_element();
    let names = host.defaults().events.clone();
    for kind in [
        LifecycleKind::BeforeShown,
        LifecycleKind::AfterShown,
        LifecycleKind::BeforeHidden,
        LifecycleKind::AfterHidden,
    ] {
        let document = document.clone();
        host.add_listener(root, names.name(kind), move |event: &mut LifecycleEvent| {
            if !redispatch(&document, event) {
                event.prevent_default();
            }
        });
    }
}

/// Log how each started request settles.
fn watch(completions: Vec<Completion>) {
    for completion in completions {
        wasm_bindgen_futures::spawn_local(async move {
            let dialog = completion.dialog();
            match completion.await {
                Ok(outcome) => log::debug!("Dialog {}: {:?}", dialog, outcome),
                Err(err) if err.is_canceled() => log::info!("{}", err),
                Err(err) => log::warn!("{}", err),
            }
        });
    }
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn listen<F>(document: &Document, name: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    document.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    // Page-lifetime listener
    closure.forget();
    Ok(())
}

/// Route browser input into the host. A handler that fires while the host
/// is busy (a page script reacting synchronously to a lifecycle event) is
/// dropped.
fn install_listeners(document: &Document, host: &SharedHost) -> Result<(), JsValue> {
    let click_host = host.clone();
    listen(document, "click", move |event: Event| {
        let Ok(mut host) = click_host.try_borrow_mut() else {
            log::warn!("Click ignored: dialog host busy");
            return;
        };
        let Some(element) = target_element(&event) else {
            return;
        };
        let target = host.dom().id_of(&element);
        match host.click(target) {
            Ok(completions) => watch(completions),
            Err(err) => log::error!("{}", err),
        }
    })?;

    let key_host = host.clone();
    listen(document, "keydown", move |event: Event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        let Ok(mut host) = key_host.try_borrow_mut() else {
            log::warn!("Key ignored: dialog host busy");
            return;
        };
        watch(host.key_down(&key));
    })?;

    let transition_host = host.clone();
    listen(document, "transitionend", move |event: Event| {
        let Ok(mut host) = transition_host.try_borrow_mut() else {
            log::warn!("Transition end ignored: dialog host busy");
            return;
        };
        let Some(element) = target_element(&event) else {
            return;
        };
        let target = host.dom().id_of(&element);
        host.transition_end(target);
    })?;

    Ok(())
}

/// Initialize logging and bind every dialog on the page.
#[wasm_bindgen(start)]
pub fn run_wasm() -> Result<(), JsValue> {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    console_log::init_with_level(log::Level::Info).map_err(to_js)?;
    log::info!("Starting DialogKit (WASM)");

    let dom = WebDom::new().map_err(to_js)?;
    let document = dom.document().clone();
    let mut host = DialogHost::new(dom);
    forward_lifecycle(&mut host, &document);

    let root = host.dom().document_element();
    let dialogs = host
        .dom()
        .query_all(root, &format!("[{}]", DIALOG_ATTR))
        .map_err(to_js)?;
    for dialog in &dialogs {
        host.discover(*dialog).map_err(to_js)?;
    }

    let body = host.dom().body().ok_or_else(|| to_js("document has no body"))?;
    let discovery = host.discover(body).map_err(to_js)?;
    log::info!(
        "Bound {} dialogs, launcher discovery on {}",
        dialogs.len(),
        discovery.root()
    );

    install_listeners(&document, &Rc::new(RefCell::new(host)))
}
