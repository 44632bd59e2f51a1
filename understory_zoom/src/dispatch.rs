// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform change notifications.
//!
//! Listeners receive the new [`TransformState`] after every notifying update,
//! and once more whenever the engine settles into idle:
//!
//! ```
//! use understory_zoom::{TransformState, ZoomListener};
//!
//! #[derive(Default)]
//! struct Redraw {
//!     frames: usize,
//!     settled: bool,
//! }
//!
//! impl ZoomListener for Redraw {
//!     fn on_update(&mut self, _: &TransformState) {
//!         self.frames += 1;
//!     }
//!     fn on_idle(&mut self, _: &TransformState) {
//!         self.settled = true;
//!     }
//! }
//! ```
//!
//! Plain closures over `&TransformState` are listeners that ignore idle
//! notifications.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::matrix::TransformState;

/// Receives transform updates.
pub trait ZoomListener {
    /// The transform changed.
    fn on_update(&mut self, transform: &TransformState);

    /// The engine became idle.
    fn on_idle(&mut self, transform: &TransformState) {
        let _ = transform;
    }
}

impl<F> ZoomListener for F
where
    F: FnMut(&TransformState),
{
    fn on_update(&mut self, transform: &TransformState) {
        self(transform);
    }
}

/// Handle returned by [`ZoomEngine::add_listener`](crate::ZoomEngine::add_listener).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub(crate) struct UpdatesDispatcher {
    listeners: Vec<(ListenerId, Box<dyn ZoomListener>)>,
    next_id: u64,
}

impl fmt::Debug for UpdatesDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdatesDispatcher")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl UpdatesDispatcher {
    pub(crate) fn add(&mut self, listener: Box<dyn ZoomListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    pub(crate) fn dispatch_update(&mut self, transform: &TransformState) {
        for (_, listener) in &mut self.listeners {
            listener.on_update(transform);
        }
    }

    pub(crate) fn dispatch_idle(&mut self, transform: &TransformState) {
        for (_, listener) in &mut self.listeners {
            listener.on_idle(transform);
        }
    }
}
