// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis, alignment and fit-mode primitives.

use core::ops::BitOr;

/// One of the two transform axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The X axis.
    Horizontal,
    /// The Y axis.
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const BOTH: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Picks the component of `(x, y)` that belongs to this axis.
    #[must_use]
    pub fn select<T>(self, x: T, y: T) -> T {
        match self {
            Self::Horizontal => x,
            Self::Vertical => y,
        }
    }
}

/// Where content rests along one axis when it is smaller than its container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gravity {
    /// Left or top edge.
    Start,
    /// Right or bottom edge.
    End,
    /// Centered.
    Center,
    /// Unconstrained: free to rest anywhere inside the container.
    None,
}

impl Gravity {
    /// Resting offset for content that leaves `extra_space` free on the axis.
    ///
    /// `extra_space` is `container - content` and may be negative when the
    /// content overflows the container.
    #[must_use]
    pub fn apply(self, extra_space: f64) -> f64 {
        match self {
            Self::Start | Self::None => 0.0,
            Self::End => extra_space,
            Self::Center => extra_space * 0.5,
        }
    }
}

/// Packed per-axis alignment.
///
/// The vertical value lives in the low nibble and the horizontal value in the
/// high nibble, so that one vertical and one horizontal constant can be
/// combined with `|`:
///
/// ```
/// use understory_zoom::{Alignment, Axis, Gravity};
///
/// let a = Alignment::TOP | Alignment::RIGHT;
/// assert_eq!(a.gravity(Axis::Vertical), Some(Gravity::Start));
/// assert_eq!(a.gravity(Axis::Horizontal), Some(Gravity::End));
/// assert_eq!(a.bits(), 0x21);
/// ```
///
/// An axis can also carry no value at all ([`Alignment::gravity`] returns
/// `None`), which is treated like the explicit `NONE_*` value by the pan
/// bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Alignment(u8);

impl Alignment {
    const HORIZONTAL_MASK: u8 = 0xF0;
    const VERTICAL_MASK: u8 = 0x0F;

    /// Aligns the content top to the container top.
    pub const TOP: Self = Self(0x01);
    /// Aligns the content bottom to the container bottom.
    pub const BOTTOM: Self = Self(0x02);
    /// Centers the content vertically.
    pub const CENTER_VERTICAL: Self = Self(0x03);
    /// No forced vertical alignment.
    pub const NONE_VERTICAL: Self = Self(0x04);
    /// Aligns the content left edge to the container left edge.
    pub const LEFT: Self = Self(0x10);
    /// Aligns the content right edge to the container right edge.
    pub const RIGHT: Self = Self(0x20);
    /// Centers the content horizontally.
    pub const CENTER_HORIZONTAL: Self = Self(0x30);
    /// No forced horizontal alignment.
    pub const NONE_HORIZONTAL: Self = Self(0x40);
    /// Centered on both axes.
    pub const CENTER: Self = Self(0x33);
    /// Unconstrained on both axes.
    pub const NONE: Self = Self(0x44);

    /// Rebuilds an alignment from its packed representation.
    ///
    /// Returns `None` if either nibble holds an unknown value.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        let v = bits & Self::VERTICAL_MASK;
        let h = (bits & Self::HORIZONTAL_MASK) >> 4;
        if v > 4 || h > 4 {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Returns the packed representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns the horizontal half of this alignment.
    #[must_use]
    pub const fn horizontal(self) -> Self {
        Self(self.0 & Self::HORIZONTAL_MASK)
    }

    /// Returns the vertical half of this alignment.
    #[must_use]
    pub const fn vertical(self) -> Self {
        Self(self.0 & Self::VERTICAL_MASK)
    }

    /// Resting gravity on `axis`, or `None` if this alignment has no value
    /// for that axis.
    #[must_use]
    pub fn gravity(self, axis: Axis) -> Option<Gravity> {
        let nibble = match axis {
            Axis::Horizontal => (self.0 & Self::HORIZONTAL_MASK) >> 4,
            Axis::Vertical => self.0 & Self::VERTICAL_MASK,
        };
        match nibble {
            1 => Some(Gravity::Start),
            2 => Some(Gravity::End),
            3 => Some(Gravity::Center),
            4 => Some(Gravity::None),
            _ => None,
        }
    }

    /// Returns `true` if `axis` is unconstrained (explicit none or no value).
    #[must_use]
    pub fn is_none(self, axis: Axis) -> bool {
        matches!(self.gravity(axis), None | Some(Gravity::None))
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::CENTER
    }
}

impl BitOr for Alignment {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Base transformation applied when the engine first learns both sizes.
///
/// The resulting scale becomes the *transformation zoom*: the real zoom that
/// corresponds to a logical zoom of `1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Transformation {
    /// Scale so that the content fits entirely inside the container.
    #[default]
    CenterInside,
    /// Scale so that the content covers the whole container.
    CenterCrop,
    /// Keep the content at its natural size.
    None,
}

impl Transformation {
    /// Real zoom that realizes this transformation for the given sizes.
    #[must_use]
    pub fn zoom_for(self, content: kurbo::Size, container: kurbo::Size) -> f64 {
        let sx = container.width / content.width;
        let sy = container.height / content.height;
        match self {
            Self::CenterInside => sx.min(sy),
            Self::CenterCrop => sx.max(sy),
            Self::None => 1.0,
        }
    }
}
