use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::dom::DomError;
use crate::scheduler::{FiringGuard, IntervalId, IntervalSlots, Scheduler};

/// `window.setInterval` with the Rust closures kept alive while scheduled.
pub struct BrowserScheduler {
    window: Window,
    slots: IntervalSlots<Closure<dyn FnMut()>>,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            slots: IntervalSlots::new(),
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_interval(&self, period_ms: u32, callback: Rc<dyn Fn()>) -> Result<IntervalId, DomError> {
        let firing = self.slots.firing();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let _running = FiringGuard::enter(&firing);
            callback();
        });
        let handle = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            )
            .map_err(|e| DomError::new(format!("setInterval failed: {:?}", e)))?;
        let id = IntervalId::new(handle);
        self.slots.insert(id, closure);
        Ok(id)
    }

    fn clear_interval(&self, id: IntervalId) {
        self.window.clear_interval_with_handle(id.raw());
        self.slots.remove(id);
    }
}
