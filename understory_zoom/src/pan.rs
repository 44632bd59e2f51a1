// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan legality and correction.
//!
//! [`PanManager`] holds only configuration. Every query reads the current
//! transform through a borrowed [`TransformState`], so the same manager can be
//! asked "what if" questions about simulated transforms.
//!
//! Pans are expressed as the scaled position of the content's top-left corner
//! inside the container. When the content overflows the container the legal
//! range is `[container - content, 0]`; when it fits, the alignment decides.

use alloc::boxed::Box;
use core::fmt;

use crate::alignment::{Alignment, Axis};
use crate::matrix::TransformState;
use crate::point::ScaledPoint;
use crate::provider::{DefaultOverPanRange, OverPanRangeProvider};

/// Scroller bounds for one axis, in scaled pan units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PanStatus {
    /// Smallest legal scaled pan.
    pub(crate) min: f64,
    /// Current scaled pan.
    pub(crate) current: f64,
    /// Largest legal scaled pan.
    pub(crate) max: f64,
    /// The current pan is outside the strict range.
    pub(crate) is_in_over_pan: bool,
}

/// Pan configuration plus the bounds math built on it.
pub(crate) struct PanManager {
    pub(crate) horizontal_pan_enabled: bool,
    pub(crate) vertical_pan_enabled: bool,
    pub(crate) horizontal_over_pan_enabled: bool,
    pub(crate) vertical_over_pan_enabled: bool,
    pub(crate) alignment: Alignment,
    over_pan_range: Box<dyn OverPanRangeProvider>,
}

impl fmt::Debug for PanManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanManager")
            .field("horizontal_pan_enabled", &self.horizontal_pan_enabled)
            .field("vertical_pan_enabled", &self.vertical_pan_enabled)
            .field("horizontal_over_pan_enabled", &self.horizontal_over_pan_enabled)
            .field("vertical_over_pan_enabled", &self.vertical_over_pan_enabled)
            .field("alignment", &self.alignment)
            .finish_non_exhaustive()
    }
}

impl Default for PanManager {
    fn default() -> Self {
        Self {
            horizontal_pan_enabled: true,
            vertical_pan_enabled: true,
            horizontal_over_pan_enabled: true,
            vertical_over_pan_enabled: true,
            alignment: Alignment::default(),
            over_pan_range: Box::new(DefaultOverPanRange),
        }
    }
}

impl PanManager {
    pub(crate) fn set_over_pan_range(&mut self, provider: Box<dyn OverPanRangeProvider>) {
        self.over_pan_range = provider;
    }

    /// Pan is enabled on at least one axis.
    pub(crate) fn is_pan_enabled(&self) -> bool {
        self.horizontal_pan_enabled || self.vertical_pan_enabled
    }

    /// Over-pan is enabled on at least one axis.
    pub(crate) fn is_over_pan_enabled(&self) -> bool {
        self.horizontal_over_pan_enabled || self.vertical_over_pan_enabled
    }

    pub(crate) fn is_pan_enabled_on(&self, axis: Axis) -> bool {
        axis.select(self.horizontal_pan_enabled, self.vertical_pan_enabled)
    }

    pub(crate) fn is_over_pan_enabled_on(&self, axis: Axis) -> bool {
        axis.select(
            self.horizontal_over_pan_enabled,
            self.vertical_over_pan_enabled,
        )
    }

    /// Allowed over-pan on `axis`, always finite and never negative.
    pub(crate) fn max_over_pan(&self, transform: &TransformState, axis: Axis) -> f64 {
        let value = self.over_pan_range.over_pan_range(transform, axis);
        if !value.is_finite() || value < 0.0 {
            log::warn!("over-pan range provider returned {value} for {axis:?}; using 0");
            return 0.0;
        }
        value
    }

    /// Strict legal range of the scaled pan on `axis`, before over-pan.
    fn strict_range(&self, transform: &TransformState, axis: Axis) -> (f64, f64) {
        let container = transform.container_extent(axis);
        let content = transform.content_scaled_extent(axis);
        if content <= container {
            let extra_space = container - content;
            match self.alignment.gravity(axis) {
                Some(gravity) if !self.alignment.is_none(axis) => {
                    let resting = gravity.apply(extra_space);
                    (resting, resting)
                }
                _ => (0.0, extra_space),
            }
        } else {
            (container - content, 0.0)
        }
    }

    /// Correction that brings the scaled pan on `axis` back into its legal
    /// range, or `0.0` if it already is.
    ///
    /// With `allow_over_pan` and over-pan enabled on the axis, the range is
    /// widened by [`max_over_pan`](Self::max_over_pan) on both sides.
    pub(crate) fn check_bounds(
        &self,
        transform: &TransformState,
        axis: Axis,
        allow_over_pan: bool,
    ) -> f64 {
        let value = transform.scaled_pan_on(axis);
        let over = if allow_over_pan && self.is_over_pan_enabled_on(axis) {
            self.max_over_pan(transform, axis)
        } else {
            0.0
        };
        let (min, max) = self.strict_range(transform, axis);
        let desired = value.clamp(min - over, max + over);
        desired - value
    }

    /// Strict correction on both axes.
    pub(crate) fn correction(&self, transform: &TransformState) -> ScaledPoint {
        ScaledPoint::new(
            self.check_bounds(transform, Axis::Horizontal, false),
            self.check_bounds(transform, Axis::Vertical, false),
        )
    }

    /// Scroller bounds for `axis`, used to seed a fling.
    ///
    /// Content that is pinned by its alignment gets an empty range at its
    /// corrected position.
    pub(crate) fn compute_status(&self, transform: &TransformState, axis: Axis) -> PanStatus {
        let current = transform.scaled_pan_on(axis);
        let container = transform.container_extent(axis);
        let content = transform.content_scaled_extent(axis);
        let fix = self.check_bounds(transform, axis, false);
        let (min, max) = if content > container {
            (container - content, 0.0)
        } else if self.alignment.is_none(axis) {
            (0.0, container - content)
        } else {
            (current + fix, current + fix)
        };
        PanStatus {
            min,
            current,
            max,
            is_in_over_pan: fix != 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use kurbo::{Affine, Size};

    use super::PanManager;
    use crate::alignment::{Alignment, Axis};
    use crate::matrix::TransformState;
    use crate::point::ScaledPoint;

    fn state(content: f64, container: f64, zoom: f64, pan: f64) -> TransformState {
        TransformState::from_parts(
            Size::new(content, content),
            Size::new(container, container),
            Affine::translate((pan, pan)) * Affine::scale(zoom),
        )
    }

    #[test]
    fn fitting_content_with_no_alignment_is_pulled_to_nearest_edge() {
        let mut pan = PanManager::default();
        pan.alignment = Alignment::NONE;
        let t = state(300.0, 500.0, 1.0, -50.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), 50.0);

        let t = state(300.0, 500.0, 1.0, 260.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), -60.0);

        // Anywhere inside [0, extra] is already legal.
        let t = state(300.0, 500.0, 1.0, 120.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), 0.0);
    }

    #[test]
    fn applying_the_correction_is_idempotent() {
        let mut pan = PanManager::default();
        pan.alignment = Alignment::NONE;
        for start in [-400.0, -50.0, 0.0, 90.0, 200.0, 999.0] {
            let t = state(300.0, 500.0, 1.0, start);
            let fix = pan.check_bounds(&t, Axis::Vertical, false);
            let fixed = state(300.0, 500.0, 1.0, start + fix);
            assert_eq!(
                pan.check_bounds(&fixed, Axis::Vertical, false),
                0.0,
                "start {start}"
            );
        }
    }

    #[test]
    fn aligned_fitting_content_collapses_to_a_point() {
        let pan = PanManager::default();
        let t = state(300.0, 500.0, 1.0, 0.0);
        // Centered: resting pan is 100.
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), 100.0);

        let mut pan = PanManager::default();
        pan.alignment = Alignment::RIGHT | Alignment::TOP;
        let t = state(300.0, 500.0, 1.0, 40.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), 160.0);
        assert_eq!(pan.check_bounds(&t, Axis::Vertical, false), -40.0);
    }

    #[test]
    fn overflowing_content_must_cover_the_container() {
        let pan = PanManager::default();
        // 1000 scaled into 500: legal range is [-500, 0].
        let t = state(1000.0, 500.0, 1.0, 30.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), -30.0);
        let t = state(1000.0, 500.0, 1.0, -530.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, false), 30.0);
    }

    #[test]
    fn over_pan_widens_the_range() {
        let pan = PanManager::default();
        // Default over-pan is 10% of 500.
        let t = state(1000.0, 500.0, 1.0, 30.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, true), 0.0);
        let t = state(1000.0, 500.0, 1.0, 80.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, true), -30.0);

        let mut pan = PanManager::default();
        pan.horizontal_over_pan_enabled = false;
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, true), -80.0);
        assert!(pan.is_over_pan_enabled());
    }

    #[test]
    fn negative_provider_values_are_clamped() {
        let mut pan = PanManager::default();
        pan.set_over_pan_range(Box::new(|_: &TransformState, _: Axis| -10.0));
        let t = state(1000.0, 500.0, 1.0, 5.0);
        assert_eq!(pan.max_over_pan(&t, Axis::Horizontal), 0.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, true), -5.0);
    }

    #[test]
    fn non_finite_provider_values_disable_over_pan() {
        let mut pan = PanManager::default();
        pan.set_over_pan_range(Box::new(|_: &TransformState, _: Axis| f64::NAN));
        let t = state(1000.0, 500.0, 1.0, 5.0);
        assert_eq!(pan.max_over_pan(&t, Axis::Horizontal), 0.0);
        assert_eq!(pan.check_bounds(&t, Axis::Horizontal, true), -5.0);

        pan.set_over_pan_range(Box::new(|_: &TransformState, _: Axis| f64::INFINITY));
        let t = state(1000.0, 500.0, 1.0, -900.0);
        assert_eq!(pan.max_over_pan(&t, Axis::Vertical), 0.0);
        assert_eq!(pan.check_bounds(&t, Axis::Vertical, true), 400.0);
    }

    #[test]
    fn status_ranges() {
        let mut pan = PanManager::default();
        let t = state(1000.0, 500.0, 1.0, -50.0);
        let s = pan.compute_status(&t, Axis::Horizontal);
        assert_eq!((s.min, s.current, s.max), (-500.0, -50.0, 0.0));
        assert!(!s.is_in_over_pan);

        let t = state(300.0, 500.0, 1.0, 40.0);
        let s = pan.compute_status(&t, Axis::Horizontal);
        assert_eq!((s.min, s.max), (100.0, 100.0));
        assert!(s.is_in_over_pan);

        pan.alignment = Alignment::NONE;
        let s = pan.compute_status(&t, Axis::Horizontal);
        assert_eq!((s.min, s.max), (0.0, 200.0));
        assert!(!s.is_in_over_pan);
    }

    #[test]
    fn correction_covers_both_axes() {
        let pan = PanManager::default();
        let t = TransformState::from_parts(
            Size::new(1000.0, 1000.0),
            Size::new(500.0, 500.0),
            Affine::translate((20.0, -600.0)),
        );
        assert_eq!(pan.correction(&t), ScaledPoint::new(-20.0, 100.0));
    }
}
