// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-level pointer sampling into a [`PointerTrail`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Point;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, MouseEvent};

use tuel_core::host::Host;
use tuel_core::trail::PointerTrail;

use crate::host::WebHost;

const EVENT: &str = "mousemove";

/// A `mousemove` listener on a document that feeds a shared trail.
///
/// The listener is removed when this value is dropped. Each listener is
/// independent: attaching several to the same document samples every move
/// once per listener.
pub struct PointerTrailListener {
    target: EventTarget,
    trail: Rc<RefCell<PointerTrail>>,
    closure: Closure<dyn FnMut(MouseEvent)>,
}

impl PointerTrailListener {
    /// Starts sampling client coordinates from `document` into `trail`,
    /// timestamped with `host`'s clock.
    ///
    /// # Errors
    ///
    /// Returns the JS exception if the listener could not be registered.
    pub fn new(
        document: &web_sys::Document,
        trail: Rc<RefCell<PointerTrail>>,
        host: WebHost,
    ) -> Result<Self, JsValue> {
        let sink = Rc::clone(&trail);
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let position = Point::new(f64::from(event.client_x()), f64::from(event.client_y()));
            match sink.try_borrow_mut() {
                Ok(mut trail) => trail.push(position, host.now()),
                Err(_) => tracing::debug!("pointer trail is borrowed; sample dropped"),
            }
        }) as Box<dyn FnMut(MouseEvent)>);

        let target: &EventTarget = document.as_ref();
        target.add_event_listener_with_callback(EVENT, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            trail,
            closure,
        })
    }

    /// The trail this listener feeds.
    #[must_use]
    pub fn trail(&self) -> &Rc<RefCell<PointerTrail>> {
        &self.trail
    }
}

impl Drop for PointerTrailListener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(EVENT, self.closure.as_ref().unchecked_ref())
        {
            tracing::debug!(?err, "failed to remove pointer listener");
        }
    }
}

impl core::fmt::Debug for PointerTrailListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PointerTrailListener")
            .field("points", &self.trail.try_borrow().map(|t| t.len()).ok())
            .finish_non_exhaustive()
    }
}
