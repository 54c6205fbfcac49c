/// Timers usable from every extension context, and a coalescing debounce
///
/// `setTimeout`/`setInterval` are bound as globals so the same code runs in
/// a page (content script, popup) and in the service worker, which has no
/// `window`.
use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout(handler: &js_sys::Function, timeout: i32) -> JsValue;

    #[wasm_bindgen(js_name = setInterval)]
    fn set_interval(handler: &js_sys::Function, timeout: i32) -> JsValue;
}

/// Run `f` once after `ms` milliseconds
pub fn run_after(ms: i32, f: impl FnOnce() + 'static) {
    let callback = Closure::once_into_js(f);
    set_timeout(callback.unchecked_ref(), ms);
}

/// Run `f` every `ms` milliseconds for the lifetime of the context
pub fn run_every(ms: i32, f: impl FnMut() + 'static) {
    let callback = Closure::<dyn FnMut()>::new(f);
    set_interval(callback.as_ref().unchecked_ref(), ms);
    callback.forget();
}

/// A promise that resolves with `value` after `ms` milliseconds
pub fn resolve_after(ms: i32, value: JsValue) -> js_sys::Promise {
    js_sys::Promise::new(&mut |resolve, _reject| {
        let value = value.clone();
        run_after(ms, move || {
            let _ = resolve.call1(&JsValue::NULL, &value);
        });
    })
}

/// Generation counter behind [`Debounced`]: each trigger arms a new
/// ticket, and only the newest ticket may fire.
#[derive(Debug, Default)]
pub struct Coalescer {
    generation: Cell<u64>,
}

impl Coalescer {
    pub fn new() -> Self {
        Coalescer {
            generation: Cell::new(0),
        }
    }

    pub fn arm(&self) -> u64 {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        next
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.generation.get() == ticket
    }
}

struct DebounceInner {
    coalescer: Coalescer,
    wait_ms: i32,
    action: Box<dyn Fn()>,
}

/// Collapses bursts of triggers into one call of `action`, made once no
/// trigger has arrived for `wait_ms`.
#[derive(Clone)]
pub struct Debounced {
    inner: Rc<DebounceInner>,
}

impl Debounced {
    pub fn new(wait_ms: i32, action: impl Fn() + 'static) -> Self {
        Debounced {
            inner: Rc::new(DebounceInner {
                coalescer: Coalescer::new(),
                wait_ms,
                action: Box::new(action),
            }),
        }
    }

    pub fn trigger(&self) {
        let ticket = self.inner.coalescer.arm();
        let inner = Rc::clone(&self.inner);
        run_after(self.inner.wait_ms, move || {
            if inner.coalescer.is_current(ticket) {
                (inner.action)();
            }
        });
    }
}
