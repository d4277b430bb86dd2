// Copyright 2026 the TUEL Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser [`Host`] implementation.
//!
//! [`WebHost`] multiplexes every frame request made through it onto a single
//! `requestAnimationFrame` registration, and every timer onto `setTimeout`
//! with the wake id passed as the handler argument. Both JS closures are
//! created once per host and hold only a weak reference back to it.
//!
//! Components are driven by attaching them with [`WebHost::attach`]; each
//! browser callback delivers a [`Wake`] to every attached component that is
//! still alive.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use tuel_core::host::{Capabilities, Host, Wake, WakeId, WakeKind, Wakeable};
use tuel_core::time::{Duration, HostTime};

use crate::{detect_capabilities, host_time_from_millis};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(handle: i32);

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout_with_id(handler: &JsValue, timeout_ms: i32, id: f64) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(handle: i32);
}

type JsCallback = Closure<dyn FnMut(f64)>;

/// A [`Host`] backed by browser APIs.
///
/// Cloning is cheap; clones share the same pending requests and attached
/// components. Construct with [`WebHost::detect`] in a page, or
/// [`WebHost::new`] to force a capability set (e.g. to exercise the timer
/// fallback).
#[derive(Clone)]
pub struct WebHost {
    inner: Rc<WebInner>,
}

struct WebInner {
    capabilities: Capabilities,
    next_id: Cell<u64>,
    /// Frame requests waiting for the next `requestAnimationFrame` callback.
    frames: RefCell<Vec<WakeId>>,
    /// Handle of the outstanding `requestAnimationFrame` registration.
    raf_handle: Cell<Option<i32>>,
    /// Outstanding `setTimeout` handles by wake id.
    timers: RefCell<BTreeMap<WakeId, (i32, WakeKind)>>,
    targets: RefCell<Vec<Weak<RefCell<dyn Wakeable>>>>,
    on_frame: JsCallback,
    on_timer: JsCallback,
}

impl WebHost {
    /// Creates a host with the given capabilities.
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<WebInner>| {
            let frame_ref = weak.clone();
            let on_frame = Closure::wrap(Box::new(move |timestamp_ms: f64| {
                if let Some(inner) = frame_ref.upgrade() {
                    inner.fire_frames(host_time_from_millis(timestamp_ms));
                }
            }) as Box<dyn FnMut(f64)>);

            let timer_ref = weak.clone();
            let on_timer = Closure::wrap(Box::new(move |id: f64| {
                if let Some(inner) = timer_ref.upgrade() {
                    inner.fire_timer(wake_id_from_js(id));
                }
            }) as Box<dyn FnMut(f64)>);

            WebInner {
                capabilities,
                next_id: Cell::new(0),
                frames: RefCell::new(Vec::new()),
                raf_handle: Cell::new(None),
                timers: RefCell::new(BTreeMap::new()),
                targets: RefCell::new(Vec::new()),
                on_frame,
                on_timer,
            }
        });
        if capabilities.is_degraded() {
            tracing::info!(
                repaint_signal = capabilities.repaint_signal,
                monotonic_clock = capabilities.monotonic_clock,
                "browser host is missing capabilities; using fallbacks"
            );
        }
        Self { inner }
    }

    /// Creates a host with capabilities detected from the global object.
    #[must_use]
    pub fn detect() -> Self {
        Self::new(detect_capabilities())
    }

    /// Delivers this host's wakes to `target` for as long as it is alive.
    ///
    /// The host keeps only a weak reference; dropping the last `Rc` detaches
    /// the component.
    pub fn attach<T: Wakeable + 'static>(&self, target: &Rc<RefCell<T>>) {
        self.inner.targets.borrow_mut().push(weak_target(target));
    }

    /// Number of frame and timer requests not yet fired or cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.frames.borrow().len() + self.inner.timers.borrow().len()
    }

    fn next_id(&self) -> WakeId {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        WakeId(id)
    }

    fn arm_timer(&self, id: WakeId, kind: WakeKind, delay: Duration) {
        let timeout_ms = i32::try_from(delay.ticks().div_ceil(1_000)).unwrap_or(i32::MAX);
        let handle = set_timeout_with_id(
            self.inner.on_timer.as_ref().unchecked_ref(),
            timeout_ms,
            wake_id_to_js(id),
        );
        self.inner.timers.borrow_mut().insert(id, (handle, kind));
    }
}

impl Host for WebHost {
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    fn now(&self) -> HostTime {
        self.inner.now()
    }

    fn request_frame(&mut self) -> WakeId {
        let id = self.next_id();
        if !self.inner.capabilities.repaint_signal {
            self.arm_timer(id, WakeKind::Frame, tuel_core::host::FALLBACK_FRAME_INTERVAL);
            return id;
        }
        self.inner.frames.borrow_mut().push(id);
        if self.inner.raf_handle.get().is_none() {
            let handle = request_animation_frame(self.inner.on_frame.as_ref().unchecked_ref());
            self.inner.raf_handle.set(Some(handle));
        }
        id
    }

    fn set_timeout(&mut self, delay: Duration) -> WakeId {
        let id = self.next_id();
        self.arm_timer(id, WakeKind::Timer, delay);
        id
    }

    fn cancel(&mut self, id: WakeId) {
        if let Some((handle, _)) = self.inner.timers.borrow_mut().remove(&id) {
            clear_timeout(handle);
            return;
        }
        let mut frames = self.inner.frames.borrow_mut();
        frames.retain(|pending| *pending != id);
        if frames.is_empty()
            && let Some(handle) = self.inner.raf_handle.take()
        {
            cancel_animation_frame(handle);
        }
    }
}

impl WebInner {
    fn now(&self) -> HostTime {
        let ms = if self.capabilities.monotonic_clock {
            performance_now()
        } else {
            js_sys::Date::now()
        };
        host_time_from_millis(ms)
    }

    fn fire_frames(&self, at: HostTime) {
        self.raf_handle.set(None);
        // Requests made while delivering wait for the next repaint.
        let ids = core::mem::take(&mut *self.frames.borrow_mut());
        for id in ids {
            self.deliver(Wake {
                id,
                kind: WakeKind::Frame,
                at,
            });
        }
    }

    fn fire_timer(&self, id: WakeId) {
        let Some((_, kind)) = self.timers.borrow_mut().remove(&id) else {
            return;
        };
        self.deliver(Wake {
            id,
            kind,
            at: self.now(),
        });
    }

    fn deliver(&self, wake: Wake) {
        let targets = self.targets.borrow().clone();
        for target in targets.iter().filter_map(Weak::upgrade) {
            match target.try_borrow_mut() {
                Ok(mut component) => component.wake(wake),
                Err(_) => tracing::warn!(id = wake.id.0, "wake target is busy; wake dropped"),
            }
        }
        self.targets.borrow_mut().retain(|t| t.strong_count() > 0);
    }
}

impl Drop for WebInner {
    fn drop(&mut self) {
        // The closures die with us; nothing may call them afterwards.
        if let Some(handle) = self.raf_handle.take() {
            cancel_animation_frame(handle);
        }
        for (handle, _) in self.timers.borrow().values() {
            clear_timeout(*handle);
        }
    }
}

impl core::fmt::Debug for WebHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebHost")
            .field("capabilities", &self.inner.capabilities)
            .field("frames", &self.inner.frames.borrow().len())
            .field("timers", &self.inner.timers.borrow().len())
            .field("targets", &self.inner.targets.borrow().len())
            .finish_non_exhaustive()
    }
}

fn weak_target<T: Wakeable + 'static>(target: &Rc<RefCell<T>>) -> Weak<RefCell<dyn Wakeable>> {
    let target: Rc<RefCell<dyn Wakeable>> = Rc::<RefCell<T>>::clone(target);
    Rc::downgrade(&target)
}

// Wake ids cross into JS as numbers; ids stay far below 2^53.
fn wake_id_to_js(id: WakeId) -> f64 {
    id.0 as f64
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ids were produced by wake_id_to_js and are exact integers"
)]
fn wake_id_from_js(id: f64) -> WakeId {
    WakeId(id as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Count(u32);

    impl Wakeable for Count {
        fn wake(&mut self, _wake: Wake) {
            self.0 += 1;
        }
    }

    #[test]
    fn attached_targets_are_weak_and_wakeable() {
        let component = Rc::new(RefCell::new(Count::default()));
        let weak = weak_target(&component);

        let target = weak.upgrade().expect("component still alive");
        target.borrow_mut().wake(Wake {
            id: WakeId(1),
            kind: WakeKind::Frame,
            at: HostTime::ZERO,
        });
        drop(target);
        assert_eq!(component.borrow().0, 1, "wake reached the component");

        drop(component);
        assert!(weak.upgrade().is_none(), "host does not keep it alive");
    }

    #[test]
    fn wake_ids_survive_the_js_boundary() {
        for raw in [1, 42, 1 << 40] {
            let id = WakeId(raw);
            assert_eq!(wake_id_from_js(wake_id_to_js(id)), id, "id {raw}");
        }
    }
}
