// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture and animation arbitration.
//!
//! Exactly one of pinching, scrolling, flinging or animating owns the
//! transform at any time. Owners change only through
//! [`StateController::try_set_state`], which applies fixed tie-break rules:
//!
//! - animations cannot be interrupted by touch gestures,
//! - a pinch preempts a scroll,
//! - everything else replaces whatever was running.
//!
//! The controller does not know how to cancel an animation or a fling; it
//! delegates side effects to a [`StateCallback`] passed into each call.
//!
//! ```
//! use understory_zoom::{StateCallback, StateController, ZoomState};
//!
//! struct Always;
//! impl StateCallback for Always {
//!     fn is_state_allowed(&self, _: ZoomState) -> bool { true }
//!     fn on_state_idle(&mut self) {}
//!     fn cleanup_state(&mut self, _: ZoomState) {}
//! }
//!
//! let mut state = StateController::default();
//! assert!(state.try_set_state(ZoomState::Scrolling, &mut Always));
//! assert!(state.try_set_state(ZoomState::Pinching, &mut Always));
//! // A pinch cannot be downgraded to a scroll.
//! assert!(!state.try_set_state(ZoomState::Scrolling, &mut Always));
//! assert_eq!(state.state(), ZoomState::Pinching);
//! ```

use crate::event::{TouchAction, TouchEvent};

/// Who currently owns the transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ZoomState {
    /// Nothing is happening.
    #[default]
    Idle,
    /// A one-or-more finger scroll is panning.
    Scrolling,
    /// A two-finger pinch is zooming.
    Pinching,
    /// An animation is running.
    Animating,
    /// A fling is decelerating.
    Flinging,
}

/// Interest in a touch event stream, in increasing order of commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TouchResult {
    /// No recognizer cares about this stream.
    NoInterest,
    /// A recognizer is tracking the stream but no gesture has started.
    Listen,
    /// A gesture or animation owns the stream; ancestors should not see it.
    Steal,
}

/// Side effects of state transitions.
pub trait StateCallback {
    /// Whether `new_state` may be entered at all.
    fn is_state_allowed(&self, new_state: ZoomState) -> bool;
    /// The state machine is about to become idle.
    fn on_state_idle(&mut self);
    /// `old_state` is being left and should release its resources.
    fn cleanup_state(&mut self, old_state: ZoomState);
}

/// Gesture recognizers fed by [`StateController::process_touch_event`].
pub trait TouchCallback: StateCallback {
    /// Offers `event` to the pinch recognizer. Returns `true` if it is
    /// interested in the stream.
    fn maybe_start_pinch_gesture(
        &mut self,
        state: &mut StateController,
        event: &TouchEvent,
    ) -> bool;
    /// Offers `event` to the scroll and fling recognizer. Returns `true` if
    /// it is interested in the stream.
    fn maybe_start_scroll_fling_gesture(
        &mut self,
        state: &mut StateController,
        event: &TouchEvent,
    ) -> bool;
    /// The pointers of a scroll went up. The callback decides whether to
    /// animate back into bounds or become idle.
    fn end_scroll_gesture(&mut self, state: &mut StateController);
}

/// The arbitration state machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct StateController {
    state: ZoomState,
}

impl StateController {
    /// The current state.
    #[must_use]
    pub fn state(&self) -> ZoomState {
        self.state
    }

    /// Returns `true` when idle.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == ZoomState::Idle
    }

    /// Returns `true` while scrolling.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.state == ZoomState::Scrolling
    }

    /// Returns `true` while pinching.
    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.state == ZoomState::Pinching
    }

    /// Returns `true` while animating.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state == ZoomState::Animating
    }

    /// Returns `true` while flinging.
    #[must_use]
    pub fn is_flinging(&self) -> bool {
        self.state == ZoomState::Flinging
    }

    /// Attempts to move to `new_state`. Returns whether the state machine is
    /// now in `new_state`.
    ///
    /// Re-entering the current state is a successful no-op, except for
    /// [`ZoomState::Animating`], which always cleans up the previous
    /// animation.
    pub fn try_set_state(&mut self, new_state: ZoomState, cx: &mut impl StateCallback) -> bool {
        log::trace!("try_set_state: {new_state:?}");
        if !cx.is_state_allowed(new_state) {
            return false;
        }
        if new_state == self.state && new_state != ZoomState::Animating {
            return true;
        }
        let old_state = self.state;
        match new_state {
            ZoomState::Scrolling
                if matches!(old_state, ZoomState::Pinching | ZoomState::Animating) =>
            {
                return false;
            }
            ZoomState::Flinging | ZoomState::Pinching if old_state == ZoomState::Animating => {
                return false;
            }
            ZoomState::Idle => cx.on_state_idle(),
            _ => {}
        }
        cx.cleanup_state(old_state);
        log::info!("state: {old_state:?} -> {new_state:?}");
        self.state = new_state;
        true
    }

    /// Shorthand for `try_set_state(ZoomState::Scrolling, cx)`.
    pub fn set_scrolling(&mut self, cx: &mut impl StateCallback) -> bool {
        self.try_set_state(ZoomState::Scrolling, cx)
    }

    /// Shorthand for `try_set_state(ZoomState::Pinching, cx)`.
    pub fn set_pinching(&mut self, cx: &mut impl StateCallback) -> bool {
        self.try_set_state(ZoomState::Pinching, cx)
    }

    /// Shorthand for `try_set_state(ZoomState::Animating, cx)`.
    pub fn set_animating(&mut self, cx: &mut impl StateCallback) -> bool {
        self.try_set_state(ZoomState::Animating, cx)
    }

    /// Shorthand for `try_set_state(ZoomState::Flinging, cx)`.
    pub fn set_flinging(&mut self, cx: &mut impl StateCallback) -> bool {
        self.try_set_state(ZoomState::Flinging, cx)
    }

    /// Shorthand for `try_set_state(ZoomState::Idle, cx)`.
    pub fn make_idle(&mut self, cx: &mut impl StateCallback) -> bool {
        self.try_set_state(ZoomState::Idle, cx)
    }

    /// Routes a touch event to the recognizers.
    ///
    /// The pinch recognizer sees every event first; the scroll and fling
    /// recognizer only sees it if no pinch is in progress afterwards. While
    /// animating, events are stolen without being looked at. When nobody is
    /// interested, the state machine is forced back to idle.
    pub fn process_touch_event(
        &mut self,
        event: &TouchEvent,
        cx: &mut impl TouchCallback,
    ) -> TouchResult {
        if self.is_animating() {
            return TouchResult::Steal;
        }

        let mut interested = cx.maybe_start_pinch_gesture(self, event);
        if !self.is_pinching() {
            interested |= cx.maybe_start_scroll_fling_gesture(self, event);
        }

        if self.is_scrolling() && matches!(event.action, TouchAction::Up | TouchAction::Cancel) {
            log::trace!("pointers up while scrolling, ending scroll gesture");
            cx.end_scroll_gesture(self);
        }

        if interested && !self.is_idle() {
            TouchResult::Steal
        } else if interested {
            TouchResult::Listen
        } else {
            self.make_idle(cx);
            TouchResult::NoInterest
        }
    }
}
