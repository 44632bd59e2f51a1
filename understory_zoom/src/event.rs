// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-touch input records.
//!
//! A [`TouchEvent`] is a snapshot of every pointer currently on the surface,
//! plus the action that produced it. Pointer-up events still list the
//! pointer that is going away; recognizers skip it through
//! [`TouchEvent::active_pointers`].

use kurbo::Point;
use smallvec::SmallVec;

/// One pointer on the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPointer {
    /// Stable identifier for the lifetime of this pointer.
    pub id: u64,
    /// Position in container coordinates.
    pub position: Point,
}

impl TouchPointer {
    /// Creates a pointer record.
    #[must_use]
    pub const fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

/// What happened to produce a [`TouchEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TouchAction {
    /// The first pointer went down.
    Down,
    /// An additional pointer went down, at the given index.
    PointerDown(usize),
    /// One or more pointers moved.
    Move,
    /// A non-final pointer went up, at the given index.
    PointerUp(usize),
    /// The final pointer went up.
    Up,
    /// The stream was taken away.
    Cancel,
}

/// A multi-touch input event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    /// The action that produced this event.
    pub action: TouchAction,
    /// Every pointer on the surface, including one that is being lifted.
    pub pointers: SmallVec<[TouchPointer; 4]>,
    /// Event time in milliseconds, on the same clock as frame times.
    pub time_ms: u64,
}

impl TouchEvent {
    /// Creates an event.
    pub fn new(
        action: TouchAction,
        pointers: impl IntoIterator<Item = TouchPointer>,
        time_ms: u64,
    ) -> Self {
        Self {
            action,
            pointers: pointers.into_iter().collect(),
            time_ms,
        }
    }

    /// Creates a single-pointer event with pointer id `0`.
    #[must_use]
    pub fn single(action: TouchAction, position: Point, time_ms: u64) -> Self {
        Self::new(action, [TouchPointer::new(0, position)], time_ms)
    }

    /// Number of pointers listed in this event.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Index of the pointer being lifted by this event, if any.
    #[must_use]
    pub fn lifted_index(&self) -> Option<usize> {
        match self.action {
            TouchAction::PointerUp(index) => Some(index),
            _ => None,
        }
    }

    /// Pointers that remain on the surface after this event.
    pub fn active_pointers(&self) -> impl Iterator<Item = &TouchPointer> + '_ {
        let lifted = self.lifted_index();
        self.pointers
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != lifted)
            .map(|(_, pointer)| pointer)
    }

    /// Number of pointers that remain on the surface after this event.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_pointers().count()
    }

    /// Average position of the remaining pointers.
    #[must_use]
    pub fn focus(&self) -> Option<Point> {
        let mut count = 0_u32;
        let mut sum = kurbo::Vec2::ZERO;
        for pointer in self.active_pointers() {
            sum += pointer.position.to_vec2();
            count += 1;
        }
        (count > 0).then(|| (sum / f64::from(count)).to_point())
    }

    /// Returns `true` for `Up` and `Cancel`.
    #[must_use]
    pub fn is_stream_end(&self) -> bool {
        matches!(self.action, TouchAction::Up | TouchAction::Cancel)
    }
}
