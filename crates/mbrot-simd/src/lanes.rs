//! Fixed-width lane batches.
//!
//! A lane batch is [`LANE_WIDTH`] independent `f32` values processed with one
//! operation per step. The kernel is written once against [`LaneF32`] and
//! instantiated with either [`ArrayLanes`] (plain arrays, any target) or the
//! crate-private AVX register type.
//!
//! Masks are opaque per backend but always reduce to an 8-bit escape bitmask
//! where bit `i` corresponds to lane `i`.

/// Number of lanes in every batch.
pub const LANE_WIDTH: usize = 8;

/// Lane indices `0.0..=7.0`, used to spread a batch across adjacent pixels.
#[inline]
pub const fn lane_offsets() -> [f32; LANE_WIDTH] {
    [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
}

/// Per-lane boolean mask.
pub trait LaneMask: Copy {
    /// Mask with every lane set.
    fn all() -> Self;

    /// Lanes set in `self` and clear in `other` (`self & !other`).
    fn and_not(self, other: Self) -> Self;

    /// Collapse to a bitmask, bit `i` = lane `i`.
    fn bitmask(self) -> u8;

    /// True when no lane is set.
    #[inline(always)]
    fn none(self) -> bool {
        self.bitmask() == 0
    }
}

/// A batch of [`LANE_WIDTH`] `f32` values.
///
/// Arithmetic must be plain IEEE-754 single precision per lane (no fused
/// multiply-add, no reassociation) so results match the scalar path bit for
/// bit.
pub trait LaneF32: Copy {
    /// Mask type produced by comparisons.
    type Mask: LaneMask;

    /// Broadcast one value to every lane.
    fn splat(value: f32) -> Self;

    /// Load lanes from an array, lane `i` = `values[i]`.
    fn from_array(values: [f32; LANE_WIDTH]) -> Self;

    /// Store lanes into an array.
    fn to_array(self) -> [f32; LANE_WIDTH];

    /// Lane-wise `self + rhs`.
    fn add(self, rhs: Self) -> Self;

    /// Lane-wise `self - rhs`.
    fn sub(self, rhs: Self) -> Self;

    /// Lane-wise `self * rhs`.
    fn mul(self, rhs: Self) -> Self;

    /// Lane-wise ordered `self > rhs`. NaN lanes compare false.
    fn gt(self, rhs: Self) -> Self::Mask;

    /// Add `rhs` only in lanes set in `mask`.
    fn add_masked(self, mask: Self::Mask, rhs: Self) -> Self;
}

/// Bitmask over [`LANE_WIDTH`] lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayMask(pub u8);

impl LaneMask for ArrayMask {
    #[inline(always)]
    fn all() -> Self {
        Self(u8::MAX)
    }

    #[inline(always)]
    fn and_not(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline(always)]
    fn bitmask(self) -> u8 {
        self.0
    }
}

/// Portable lane batch backed by a plain array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArrayLanes(pub [f32; LANE_WIDTH]);

impl ArrayLanes {
    #[inline(always)]
    fn zip(self, rhs: Self, op: impl Fn(f32, f32) -> f32) -> Self {
        let mut out = [0.0; LANE_WIDTH];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = op(self.0[i], rhs.0[i]);
        }
        Self(out)
    }
}

impl LaneF32 for ArrayLanes {
    type Mask = ArrayMask;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        Self([value; LANE_WIDTH])
    }

    #[inline(always)]
    fn from_array(values: [f32; LANE_WIDTH]) -> Self {
        Self(values)
    }

    #[inline(always)]
    fn to_array(self) -> [f32; LANE_WIDTH] {
        self.0
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a - b)
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a * b)
    }

    #[inline(always)]
    fn gt(self, rhs: Self) -> ArrayMask {
        let mut bits = 0u8;
        for i in 0..LANE_WIDTH {
            bits |= u8::from(self.0[i] > rhs.0[i]) << i;
        }
        ArrayMask(bits)
    }

    #[inline(always)]
    fn add_masked(self, mask: ArrayMask, rhs: Self) -> Self {
        let mut out = self.0;
        for (i, slot) in out.iter_mut().enumerate() {
            if mask.0 & (1 << i) != 0 {
                *slot += rhs.0[i];
            }
        }
        Self(out)
    }
}
