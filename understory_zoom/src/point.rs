// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content-space and viewport-space points.
//!
//! The engine deals with two coordinate systems that are easy to mix up:
//!
//! - [`AbsolutePoint`]: untransformed content coordinates. `(0, 0)` is the
//!   content's top-left corner and a unit is one content unit, regardless of
//!   the current zoom.
//! - [`ScaledPoint`]: the same quantity multiplied by the current real zoom,
//!   so a unit is one container pixel.
//!
//! Keeping them as distinct types makes the conversions explicit:
//!
//! ```
//! use understory_zoom::{AbsolutePoint, ScaledPoint};
//!
//! let abs = AbsolutePoint::new(10.0, -4.0);
//! let scaled = abs.to_scaled(2.0);
//! assert_eq!(scaled, ScaledPoint::new(20.0, -8.0));
//! assert_eq!(scaled.to_absolute(2.0), abs);
//! ```

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use kurbo::Vec2;

macro_rules! point_type {
    ($(#[$meta:meta])* $name:ident, $other:ident, $convert:ident, $op:tt) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        pub struct $name {
            /// Horizontal component.
            pub x: f64,
            /// Vertical component.
            pub y: f64,
        }

        impl $name {
            /// The origin.
            pub const ZERO: Self = Self::new(0.0, 0.0);

            /// Creates a new point.
            #[must_use]
            pub const fn new(x: f64, y: f64) -> Self {
                Self { x, y }
            }

            /// Overwrites both components in place.
            pub fn set(&mut self, x: f64, y: f64) {
                self.x = x;
                self.y = y;
            }

            /// Returns `true` when both components are zero.
            #[must_use]
            pub fn is_zero(self) -> bool {
                self.x == 0.0 && self.y == 0.0
            }

            /// Returns `true` when either component is NaN.
            #[must_use]
            pub fn is_nan(self) -> bool {
                self.x.is_nan() || self.y.is_nan()
            }

            /// Converts to the other coordinate system given the real zoom.
            #[must_use]
            pub fn $convert(self, zoom: f64) -> $other {
                $other::new(self.x $op zoom, self.y $op zoom)
            }

            /// Returns this point as a kurbo vector.
            #[must_use]
            pub fn to_vec2(self) -> Vec2 {
                Vec2::new(self.x, self.y)
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::new(self.x + rhs.x, self.y + rhs.y)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.x += rhs.x;
                self.y += rhs.y;
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self::new(self.x - rhs.x, self.y - rhs.y)
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.x -= rhs.x;
                self.y -= rhs.y;
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self::new(-self.x, -self.y)
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;

            fn mul(self, factor: f64) -> Self {
                Self::new(self.x * factor, self.y * factor)
            }
        }

        impl From<Vec2> for $name {
            fn from(v: Vec2) -> Self {
                Self::new(v.x, v.y)
            }
        }

        impl From<$name> for Vec2 {
            fn from(p: $name) -> Self {
                p.to_vec2()
            }
        }

        impl From<(f64, f64)> for $name {
            fn from((x, y): (f64, f64)) -> Self {
                Self::new(x, y)
            }
        }
    };
}

point_type!(
    /// A position or delta in untransformed content coordinates.
    ///
    /// Independent of the current zoom.
    AbsolutePoint,
    ScaledPoint,
    to_scaled,
    *
);

point_type!(
    /// A position or delta in scaled (container pixel) coordinates.
    ///
    /// Equal to an [`AbsolutePoint`] multiplied by the current real zoom.
    ScaledPoint,
    AbsolutePoint,
    to_absolute,
    /
);
