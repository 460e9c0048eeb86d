//! AVX lane backend.
//!
//! Every function here assumes the CPU supports AVX. The only way in is
//! through [`EscapeTimeKernel`](crate::EscapeTimeKernel), whose hardware
//! strategy is resolved against [`is_available`] at construction, so the
//! types never escape this crate.

use std::arch::x86_64::{
    __m256, _CMP_EQ_OQ, _CMP_GT_OQ, _mm256_add_ps, _mm256_and_ps, _mm256_andnot_ps,
    _mm256_cmp_ps, _mm256_loadu_ps, _mm256_movemask_ps, _mm256_mul_ps, _mm256_set1_ps,
    _mm256_setzero_ps, _mm256_storeu_ps, _mm256_sub_ps,
};

use crate::kernel::{BatchOutcome, EscapeParams, RowStats, escape_lanes, fill_row_lanes, lane_cx};
use crate::lanes::{LANE_WIDTH, LaneF32, LaneMask};

/// Runtime AVX detection.
pub(crate) fn is_available() -> bool {
    std::arch::is_x86_feature_detected!("avx")
}

#[derive(Clone, Copy)]
pub(crate) struct AvxMask(__m256);

#[derive(Clone, Copy)]
pub(crate) struct AvxLanes(__m256);

// SAFETY (all impls below): values of these types are only created inside
// the `#[target_feature(enable = "avx")]` entry points, which are only called
// after `is_available()` returned true.

impl LaneMask for AvxMask {
    #[inline(always)]
    fn all() -> Self {
        unsafe {
            let zero = _mm256_setzero_ps();
            Self(_mm256_cmp_ps::<_CMP_EQ_OQ>(zero, zero))
        }
    }

    #[inline(always)]
    fn and_not(self, other: Self) -> Self {
        // andnot(a, b) = !a & b
        unsafe { Self(_mm256_andnot_ps(other.0, self.0)) }
    }

    #[inline(always)]
    fn bitmask(self) -> u8 {
        unsafe { _mm256_movemask_ps(self.0) as u8 }
    }
}

impl LaneF32 for AvxLanes {
    type Mask = AvxMask;

    #[inline(always)]
    fn splat(value: f32) -> Self {
        unsafe { Self(_mm256_set1_ps(value)) }
    }

    #[inline(always)]
    fn from_array(values: [f32; LANE_WIDTH]) -> Self {
        unsafe { Self(_mm256_loadu_ps(values.as_ptr())) }
    }

    #[inline(always)]
    fn to_array(self) -> [f32; LANE_WIDTH] {
        let mut out = [0.0; LANE_WIDTH];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), self.0) };
        out
    }

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        unsafe { Self(_mm256_add_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        unsafe { Self(_mm256_sub_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        unsafe { Self(_mm256_mul_ps(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn gt(self, rhs: Self) -> AvxMask {
        unsafe { AvxMask(_mm256_cmp_ps::<_CMP_GT_OQ>(self.0, rhs.0)) }
    }

    #[inline(always)]
    fn add_masked(self, mask: AvxMask, rhs: Self) -> Self {
        unsafe { Self(_mm256_add_ps(self.0, _mm256_and_ps(mask.0, rhs.0))) }
    }
}

pub(crate) fn escape_batch(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    x: usize,
    cy: f32,
) -> BatchOutcome {
    debug_assert!(is_available());
    // SAFETY: callers only reach this with the hardware strategy resolved.
    unsafe { escape_batch_avx(params, x0_base, step, x, cy) }
}

pub(crate) fn fill_row(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    cy: f32,
    counts: &mut [u32],
) -> RowStats {
    debug_assert!(is_available());
    // SAFETY: as above.
    unsafe { fill_row_avx(params, x0_base, step, cy, counts) }
}

#[target_feature(enable = "avx")]
unsafe fn escape_batch_avx(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    x: usize,
    cy: f32,
) -> BatchOutcome {
    escape_lanes(
        params,
        lane_cx::<AvxLanes>(x0_base, step, x),
        AvxLanes::splat(cy),
    )
}

#[target_feature(enable = "avx")]
unsafe fn fill_row_avx(
    params: EscapeParams,
    x0_base: f32,
    step: f32,
    cy: f32,
    counts: &mut [u32],
) -> RowStats {
    fill_row_lanes::<AvxLanes>(params, x0_base, step, cy, counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::{ArrayLanes, lane_offsets};

    #[test]
    fn avx_lanes_match_array_lanes() {
        if !is_available() {
            return;
        }
        let a = lane_offsets();
        let b = [0.5, -1.0, 3.25, 7.0, -0.125, 2.0, 9.0, -4.0];
        let (pa, pb) = (ArrayLanes::from_array(a), ArrayLanes::from_array(b));
        let (ha, hb) = (AvxLanes::from_array(a), AvxLanes::from_array(b));

        assert_eq!(ha.add(hb).to_array(), pa.add(pb).to_array());
        assert_eq!(ha.sub(hb).to_array(), pa.sub(pb).to_array());
        assert_eq!(ha.mul(hb).to_array(), pa.mul(pb).to_array());
        assert_eq!(ha.gt(hb).bitmask(), pa.gt(pb).bitmask());
    }

    #[test]
    fn avx_mask_helpers() {
        if !is_available() {
            return;
        }
        assert_eq!(AvxMask::all().bitmask(), 0xFF);
        let high = AvxLanes::from_array(lane_offsets()).gt(AvxLanes::splat(3.5));
        assert_eq!(AvxMask::all().and_not(high).bitmask(), 0x0F);
        let counts = AvxLanes::splat(1.0).add_masked(high, AvxLanes::splat(2.0));
        assert_eq!(counts.to_array(), [1.0, 1.0, 1.0, 1.0, 3.0, 3.0, 3.0, 3.0]);
    }
}
