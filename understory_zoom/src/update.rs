// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform change requests.

use kurbo::Point;

use crate::point::{AbsolutePoint, ScaledPoint};

/// Pan part of a [`MatrixUpdate`].
///
/// Absolute pans act in content coordinates and are applied before the
/// current scale; scaled pans act in container pixels and are applied after
/// it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanChange {
    /// Pan to the given absolute position.
    AbsoluteTo(AbsolutePoint),
    /// Pan by the given absolute delta.
    AbsoluteBy(AbsolutePoint),
    /// Pan to the given scaled position.
    ScaledTo(ScaledPoint),
    /// Pan by the given scaled delta.
    ScaledBy(ScaledPoint),
}

/// Zoom part of a [`MatrixUpdate`], in real zoom units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomChange {
    /// Zoom to the given real zoom.
    To(f64),
    /// Multiply the current real zoom by the given factor.
    By(f64),
}

/// A requested transform change.
///
/// Updates are plain values composed with the `with_*` methods:
///
/// ```
/// use kurbo::Point;
/// use understory_zoom::{MatrixUpdate, PanChange, ScaledPoint, ZoomChange};
///
/// let update = MatrixUpdate::new()
///     .with_zoom(ZoomChange::By(1.5), true)
///     .with_pan(PanChange::ScaledBy(ScaledPoint::new(4.0, 0.0)), true)
///     .with_pivot(Point::new(100.0, 100.0));
/// assert!(update.can_over_zoom);
/// assert!(update.notify);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatrixUpdate {
    /// Optional pan.
    pub pan: Option<PanChange>,
    /// Optional zoom.
    pub zoom: Option<ZoomChange>,
    /// Container point held fixed while zooming.
    ///
    /// Defaults to `(0, 0)` when a pan is present and to the container center
    /// otherwise.
    pub pivot: Option<Point>,
    /// The pan may end up in the over-pan range.
    pub can_over_pan: bool,
    /// The zoom may end up in the over-zoom range.
    pub can_over_zoom: bool,
    /// Listeners are notified once the update is applied.
    pub notify: bool,
}

impl Default for MatrixUpdate {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixUpdate {
    /// An empty, notifying update.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pan: None,
            zoom: None,
            pivot: None,
            can_over_pan: false,
            can_over_zoom: false,
            notify: true,
        }
    }

    /// Sets the pan part.
    #[must_use]
    pub const fn with_pan(mut self, pan: PanChange, can_over_pan: bool) -> Self {
        self.pan = Some(pan);
        self.can_over_pan = can_over_pan;
        self
    }

    /// Sets the zoom part.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: ZoomChange, can_over_zoom: bool) -> Self {
        self.zoom = Some(zoom);
        self.can_over_zoom = can_over_zoom;
        self
    }

    /// Sets the zoom pivot, in container coordinates.
    #[must_use]
    pub const fn with_pivot(mut self, pivot: Point) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// Sets the zoom pivot if one is given, otherwise keeps the default.
    #[must_use]
    pub const fn with_maybe_pivot(mut self, pivot: Option<Point>) -> Self {
        self.pivot = pivot;
        self
    }

    /// Sets whether listeners are notified.
    #[must_use]
    pub const fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}
