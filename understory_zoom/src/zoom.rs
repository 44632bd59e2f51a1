// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom legality, correction and unit conversion.
//!
//! Two zoom scales coexist:
//!
//! - *Real* zoom is the scale factor stored in the transform.
//! - *Logical* zoom is real zoom divided by the transformation zoom, so that
//!   `1.0` means "as fitted by the base [`Transformation`](crate::Transformation)".
//!
//! Each zoom bound remembers which scale it was expressed in, so a bound of
//! logical `2.5` keeps meaning "2.5× the fitted size" across container
//! resizes, while a bound of real `3.0` stays pinned to the raw scale.

use alloc::boxed::Box;
use core::fmt;

use crate::matrix::TransformState;
use crate::provider::{DefaultOverZoomRange, OverZoomRangeProvider, ZoomDirection, ZoomLimits};

/// Unit in which a zoom value is expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoomType {
    /// Relative to the transformation zoom (`1.0` is the fitted size).
    Logical,
    /// The raw scale factor of the transform.
    Real,
}

/// Default minimum zoom, in [`ZoomType::Logical`] units.
pub const DEFAULT_MIN_ZOOM: f64 = 0.8;

/// Default maximum zoom, in [`ZoomType::Logical`] units.
pub const DEFAULT_MAX_ZOOM: f64 = 2.5;

/// Invalid zoom configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoomConfigError {
    /// A zoom bound was negative or NaN.
    InvalidZoom(f64),
    /// Minimum and maximum, both in the same unit, are inverted.
    InvertedBounds {
        /// The minimum that was requested or already configured.
        min: f64,
        /// The maximum that was requested or already configured.
        max: f64,
        /// Unit shared by both bounds.
        zoom_type: ZoomType,
    },
}

impl fmt::Display for ZoomConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidZoom(value) => {
                write!(f, "zoom bound must be a non-negative number, got {value}")
            }
            Self::InvertedBounds {
                min,
                max,
                zoom_type,
            } => write!(
                f,
                "minimum zoom {min} is larger than maximum zoom {max} ({zoom_type:?} units)"
            ),
        }
    }
}

impl core::error::Error for ZoomConfigError {}

/// Zoom configuration plus the bounds math built on it.
pub(crate) struct ZoomManager {
    pub(crate) zoom_enabled: bool,
    pub(crate) over_zoom_enabled: bool,
    min_zoom: f64,
    min_zoom_type: ZoomType,
    max_zoom: f64,
    max_zoom_type: ZoomType,
    transformation_zoom: f64,
    over_zoom_range: Box<dyn OverZoomRangeProvider>,
}

impl fmt::Debug for ZoomManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomManager")
            .field("zoom_enabled", &self.zoom_enabled)
            .field("over_zoom_enabled", &self.over_zoom_enabled)
            .field("min_zoom", &(self.min_zoom, self.min_zoom_type))
            .field("max_zoom", &(self.max_zoom, self.max_zoom_type))
            .field("transformation_zoom", &self.transformation_zoom)
            .finish_non_exhaustive()
    }
}

impl Default for ZoomManager {
    fn default() -> Self {
        Self {
            zoom_enabled: true,
            over_zoom_enabled: true,
            min_zoom: DEFAULT_MIN_ZOOM,
            min_zoom_type: ZoomType::Logical,
            max_zoom: DEFAULT_MAX_ZOOM,
            max_zoom_type: ZoomType::Logical,
            transformation_zoom: 1.0,
            over_zoom_range: Box::new(DefaultOverZoomRange),
        }
    }
}

fn validate(value: f64) -> Result<(), ZoomConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ZoomConfigError::InvalidZoom(value))
    }
}

impl ZoomManager {
    pub(crate) fn set_over_zoom_range(&mut self, provider: Box<dyn OverZoomRangeProvider>) {
        self.over_zoom_range = provider;
    }

    /// Sets the minimum zoom.
    ///
    /// Fails without changing anything if the value is negative, or if it is
    /// larger than a maximum expressed in the same unit.
    pub(crate) fn set_min_zoom(
        &mut self,
        value: f64,
        zoom_type: ZoomType,
    ) -> Result<(), ZoomConfigError> {
        validate(value)?;
        if zoom_type == self.max_zoom_type && value > self.max_zoom {
            return Err(ZoomConfigError::InvertedBounds {
                min: value,
                max: self.max_zoom,
                zoom_type,
            });
        }
        self.min_zoom = value;
        self.min_zoom_type = zoom_type;
        Ok(())
    }

    /// Sets the maximum zoom. See [`set_min_zoom`](Self::set_min_zoom).
    pub(crate) fn set_max_zoom(
        &mut self,
        value: f64,
        zoom_type: ZoomType,
    ) -> Result<(), ZoomConfigError> {
        validate(value)?;
        if zoom_type == self.min_zoom_type && value < self.min_zoom {
            return Err(ZoomConfigError::InvertedBounds {
                min: self.min_zoom,
                max: value,
                zoom_type,
            });
        }
        self.max_zoom = value;
        self.max_zoom_type = zoom_type;
        Ok(())
    }

    pub(crate) fn transformation_zoom(&self) -> f64 {
        self.transformation_zoom
    }

    /// Updates the baseline. Non-positive or non-finite values are ignored.
    pub(crate) fn set_transformation_zoom(&mut self, value: f64) {
        if value > 0.0 && value.is_finite() {
            self.transformation_zoom = value;
        } else {
            log::warn!("ignoring invalid transformation zoom {value}");
        }
    }

    pub(crate) fn to_real(&self, logical: f64) -> f64 {
        logical * self.transformation_zoom
    }

    pub(crate) fn to_logical(&self, real: f64) -> f64 {
        real / self.transformation_zoom
    }

    fn bound_to_real(&self, value: f64, zoom_type: ZoomType) -> f64 {
        match zoom_type {
            ZoomType::Logical => self.to_real(value),
            ZoomType::Real => value,
        }
    }

    /// Minimum zoom in real units.
    pub(crate) fn min_zoom(&self) -> f64 {
        self.bound_to_real(self.min_zoom, self.min_zoom_type)
    }

    /// Maximum zoom in real units.
    pub(crate) fn max_zoom(&self) -> f64 {
        self.bound_to_real(self.max_zoom, self.max_zoom_type)
    }

    pub(crate) fn min_zoom_setting(&self) -> (f64, ZoomType) {
        (self.min_zoom, self.min_zoom_type)
    }

    pub(crate) fn max_zoom_setting(&self) -> (f64, ZoomType) {
        (self.max_zoom, self.max_zoom_type)
    }

    fn max_over_zoom(
        &self,
        transform: &TransformState,
        limits: ZoomLimits,
        direction: ZoomDirection,
    ) -> f64 {
        let value = self
            .over_zoom_range
            .over_zoom_range(transform, limits, direction);
        if !value.is_finite() || value < 0.0 {
            log::warn!("over-zoom range provider returned {value} for {direction:?}; using 0");
            return 0.0;
        }
        value
    }

    /// Clamps the real zoom `value` into the legal range.
    ///
    /// With `allow_over_zoom` and over-zoom enabled, the range is widened by
    /// the over-zoom provider in both directions.
    ///
    /// A minimum and maximum expressed in different units can end up inverted
    /// once converted to real units. The real-unit bound then wins and the
    /// logical-unit bound collapses onto it; this is reported as a warning.
    pub(crate) fn check_bounds(
        &self,
        transform: &TransformState,
        value: f64,
        allow_over_zoom: bool,
    ) -> f64 {
        let limits = ZoomLimits {
            min: self.min_zoom(),
            max: self.max_zoom(),
        };
        let mut min = limits.min;
        let mut max = limits.max;
        if allow_over_zoom && self.over_zoom_enabled {
            min -= self.max_over_zoom(transform, limits, ZoomDirection::Out);
            max += self.max_over_zoom(transform, limits, ZoomDirection::In);
            min = min.max(0.0);
        }
        if max < min {
            match (self.min_zoom_type, self.max_zoom_type) {
                (ZoomType::Logical, ZoomType::Real) => {
                    log::warn!(
                        "logical min zoom {min} exceeds real max zoom {max}; collapsing onto max"
                    );
                    min = max;
                }
                (ZoomType::Real, ZoomType::Logical) => {
                    log::warn!(
                        "real min zoom {min} exceeds logical max zoom {max}; collapsing onto min"
                    );
                    max = min;
                }
                _ => {
                    // Rejected by the setters, so only a provider can get here.
                    log::error!("zoom bounds are inverted: min {min} > max {max}");
                    max = min;
                }
            }
        }
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use kurbo::{Affine, Size};

    use super::{ZoomConfigError, ZoomManager, ZoomType};
    use crate::matrix::TransformState;
    use crate::provider::{ZoomDirection, ZoomLimits};

    fn state() -> TransformState {
        TransformState::from_parts(
            Size::new(1000.0, 1000.0),
            Size::new(500.0, 500.0),
            Affine::scale(0.5),
        )
    }

    #[test]
    fn bounds_follow_their_unit() {
        let mut zoom = ZoomManager::default();
        zoom.set_transformation_zoom(0.5);
        assert_eq!(zoom.min_zoom(), 0.4);
        assert_eq!(zoom.max_zoom(), 1.25);

        zoom.set_max_zoom(3.0, ZoomType::Real).unwrap();
        assert_eq!(zoom.max_zoom(), 3.0);
        zoom.set_transformation_zoom(2.0);
        assert_eq!(zoom.max_zoom(), 3.0);
        assert_eq!(zoom.min_zoom(), 1.6);
    }

    #[test]
    fn strict_check_stays_in_range() {
        let mut zoom = ZoomManager::default();
        zoom.set_transformation_zoom(0.5);
        let t = state();
        for value in [-100.0, 0.0, 0.1, 0.4, 0.7, 1.25, 2.0, 1e9] {
            let checked = zoom.check_bounds(&t, value, false);
            assert!((0.4..=1.25).contains(&checked), "{value} -> {checked}");
        }
        assert_eq!(zoom.check_bounds(&t, 0.7, false), 0.7);
    }

    #[test]
    fn over_zoom_widens_by_a_tenth_of_the_range() {
        let mut zoom = ZoomManager::default();
        zoom.set_min_zoom(1.0, ZoomType::Real).unwrap();
        zoom.set_max_zoom(3.0, ZoomType::Real).unwrap();
        let t = state();
        assert!((zoom.check_bounds(&t, 10.0, true) - 3.2).abs() < 1e-12);
        assert!((zoom.check_bounds(&t, 0.0, true) - 0.8).abs() < 1e-12);

        zoom.over_zoom_enabled = false;
        assert_eq!(zoom.check_bounds(&t, 10.0, true), 3.0);
    }

    #[test]
    fn custom_provider_and_negative_values() {
        let mut zoom = ZoomManager::default();
        zoom.set_min_zoom(1.0, ZoomType::Real).unwrap();
        zoom.set_max_zoom(2.0, ZoomType::Real).unwrap();
        zoom.set_over_zoom_range(Box::new(
            |_: &TransformState, _: ZoomLimits, direction: ZoomDirection| match direction {
                ZoomDirection::In => 0.5,
                ZoomDirection::Out => -1.0,
            },
        ));
        let t = state();
        assert_eq!(zoom.check_bounds(&t, 5.0, true), 2.5);
        assert_eq!(zoom.check_bounds(&t, 0.0, true), 1.0);
    }

    #[test]
    fn non_finite_provider_values_disable_over_zoom() {
        let mut zoom = ZoomManager::default();
        zoom.set_min_zoom(1.0, ZoomType::Real).unwrap();
        zoom.set_max_zoom(2.0, ZoomType::Real).unwrap();
        zoom.set_over_zoom_range(Box::new(
            |_: &TransformState, _: ZoomLimits, direction: ZoomDirection| match direction {
                ZoomDirection::In => f64::NAN,
                ZoomDirection::Out => f64::NEG_INFINITY,
            },
        ));
        let t = state();
        assert_eq!(zoom.check_bounds(&t, 5.0, true), 2.0);
        assert_eq!(zoom.check_bounds(&t, 0.0, true), 1.0);
        assert_eq!(zoom.check_bounds(&t, 1.5, true), 1.5);
    }

    #[test]
    fn same_unit_inversion_is_rejected() {
        let mut zoom = ZoomManager::default();
        assert_eq!(
            zoom.set_min_zoom(3.0, ZoomType::Logical),
            Err(ZoomConfigError::InvertedBounds {
                min: 3.0,
                max: 2.5,
                zoom_type: ZoomType::Logical,
            })
        );
        assert_eq!(zoom.min_zoom_setting(), (0.8, ZoomType::Logical));
        assert_eq!(
            zoom.set_max_zoom(-1.0, ZoomType::Real),
            Err(ZoomConfigError::InvalidZoom(-1.0))
        );
        assert!(matches!(
            zoom.set_max_zoom(f64::NAN, ZoomType::Real),
            Err(ZoomConfigError::InvalidZoom(_))
        ));
    }

    #[test]
    fn mixed_unit_inversion_prefers_the_real_bound() {
        let mut zoom = ZoomManager::default();
        zoom.over_zoom_enabled = false;
        zoom.set_max_zoom(1.0, ZoomType::Real).unwrap();
        // Logical min 0.8 becomes real 1.6 with this baseline.
        zoom.set_transformation_zoom(2.0);
        let t = state();
        assert_eq!(zoom.check_bounds(&t, 0.5, false), 1.0);
        assert_eq!(zoom.check_bounds(&t, 5.0, false), 1.0);

        let mut zoom = ZoomManager::default();
        zoom.over_zoom_enabled = false;
        zoom.set_min_zoom(2.0, ZoomType::Real).unwrap();
        // Logical max 2.5 becomes real 0.25.
        zoom.set_transformation_zoom(0.1);
        assert_eq!(zoom.check_bounds(&t, 0.5, false), 2.0);
    }

    #[test]
    fn unit_conversion() {
        let mut zoom = ZoomManager::default();
        zoom.set_transformation_zoom(0.5);
        assert_eq!(zoom.to_real(2.0), 1.0);
        assert_eq!(zoom.to_logical(1.0), 2.0);
        zoom.set_transformation_zoom(0.0);
        assert_eq!(zoom.transformation_zoom(), 0.5);
    }

    #[test]
    fn errors_display() {
        let err = ZoomConfigError::InvalidZoom(-2.0);
        assert_eq!(
            alloc::format!("{err}"),
            "zoom bound must be a non-negative number, got -2"
        );
    }
}
