// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable over-pan and over-zoom ranges.
//!
//! During a gesture the transform may temporarily leave its legal range by a
//! bounded amount; the engine animates it back once the gesture ends. How far
//! it may go is decided by a provider. Any closure with the right signature is
//! a provider:
//!
//! ```
//! use understory_zoom::{Axis, OverPanRangeProvider, TransformState};
//!
//! let fixed = |_: &TransformState, _: Axis| 32.0;
//! let state = TransformState::default();
//! assert_eq!(fixed.over_pan_range(&state, Axis::Horizontal), 32.0);
//! ```

use crate::alignment::Axis;
use crate::matrix::TransformState;

/// Fraction of the container's smaller side used by [`DefaultOverPanRange`].
pub const DEFAULT_OVER_PAN_FACTOR: f64 = 0.1;

/// Fraction of the zoom range used by [`DefaultOverZoomRange`].
pub const DEFAULT_OVER_ZOOM_FACTOR: f64 = 0.1;

/// Decides how far the content may be panned past its legal range.
pub trait OverPanRangeProvider {
    /// Maximum over-pan on `axis`, in scaled (container pixel) units.
    ///
    /// Negative values are treated as zero.
    fn over_pan_range(&self, transform: &TransformState, axis: Axis) -> f64;
}

impl<F> OverPanRangeProvider for F
where
    F: Fn(&TransformState, Axis) -> f64,
{
    fn over_pan_range(&self, transform: &TransformState, axis: Axis) -> f64 {
        self(transform, axis)
    }
}

/// Over-pan of 10% of the container's smaller side, on both axes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultOverPanRange;

impl OverPanRangeProvider for DefaultOverPanRange {
    fn over_pan_range(&self, transform: &TransformState, _axis: Axis) -> f64 {
        let container = transform.container_size();
        container.width.min(container.height) * DEFAULT_OVER_PAN_FACTOR
    }
}

/// Direction of an over-zoom excursion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomDirection {
    /// Past the maximum zoom.
    In,
    /// Below the minimum zoom.
    Out,
}

/// Minimum and maximum zoom, both in real zoom units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    /// Smallest allowed real zoom.
    pub min: f64,
    /// Largest allowed real zoom.
    pub max: f64,
}

/// Decides how far the zoom may be pinched past its legal range.
pub trait OverZoomRangeProvider {
    /// Maximum over-zoom in `direction`, in real zoom units.
    ///
    /// Negative values are treated as zero.
    fn over_zoom_range(
        &self,
        transform: &TransformState,
        limits: ZoomLimits,
        direction: ZoomDirection,
    ) -> f64;
}

impl<F> OverZoomRangeProvider for F
where
    F: Fn(&TransformState, ZoomLimits, ZoomDirection) -> f64,
{
    fn over_zoom_range(
        &self,
        transform: &TransformState,
        limits: ZoomLimits,
        direction: ZoomDirection,
    ) -> f64 {
        self(transform, limits, direction)
    }
}

/// Over-zoom of 10% of the legal zoom range, in both directions.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultOverZoomRange;

impl OverZoomRangeProvider for DefaultOverZoomRange {
    fn over_zoom_range(
        &self,
        _transform: &TransformState,
        limits: ZoomLimits,
        _direction: ZoomDirection,
    ) -> f64 {
        DEFAULT_OVER_ZOOM_FACTOR * (limits.max - limits.min)
    }
}
