//! Property-based invariant tests for the escape-time strategies.
//!
//! 1. Every strategy fills a row with the same counts as the scalar loop
//! 2. Counts never exceed the cap
//! 3. Batch escape bitmask flags exactly the lanes below the cap
//! 4. Batch steps equal the deepest lane count (early exit)
//! 5. A batch that fully escapes stops before the cap
//! 6. Lowering the cap clamps counts without changing shallower ones

use mbrot_simd::Strategy as KernelStrategy;
use mbrot_simd::{EscapeParams, EscapeTimeKernel, LANE_WIDTH, pixel_cx};
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn arb_strategy() -> impl Strategy<Value = KernelStrategy> {
    prop_oneof![
        Just(KernelStrategy::Scalar),
        Just(KernelStrategy::PortableVector),
        Just(KernelStrategy::HardwareVector),
    ]
}

fn arb_params() -> impl Strategy<Value = EscapeParams> {
    (1u32..=300, prop_oneof![Just(4.0f32), Just(10_000.0f32), 1.0f32..1e6])
        .prop_map(|(n_max, r2_max)| EscapeParams::new(n_max, r2_max))
}

fn scalar_row(params: EscapeParams, x0_base: f32, step: f32, cy: f32, len: usize) -> Vec<u32> {
    let mut counts = vec![0; len];
    EscapeTimeKernel::new(KernelStrategy::Scalar, params).fill_row(x0_base, step, cy, &mut counts);
    counts
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Strategy equivalence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn strategies_fill_identical_rows(
        strategy in arb_strategy(),
        params in arb_params(),
        x0_base in -2.5f32..1.0,
        step in 1e-5f32..0.05,
        cy in -1.5f32..1.5,
        batches in 1usize..=8,
    ) {
        let len = batches * LANE_WIDTH;
        let reference = scalar_row(params, x0_base, step, cy, len);
        let mut counts = vec![0; len];
        EscapeTimeKernel::new(strategy, params).fill_row(x0_base, step, cy, &mut counts);
        prop_assert_eq!(counts, reference, "strategy {}", strategy);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Counts bounded by the cap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn counts_never_exceed_cap(
        strategy in arb_strategy(),
        params in arb_params(),
        x0_base in -3.0f32..3.0,
        step in 0.0f32..0.5,
        cy in -3.0f32..3.0,
    ) {
        let mut counts = vec![0; 4 * LANE_WIDTH];
        EscapeTimeKernel::new(strategy, params).fill_row(x0_base, step, cy, &mut counts);
        for &n in &counts {
            prop_assert!(n <= params.n_max(), "count {} above cap {}", n, params.n_max());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3 + 4. Escape bitmask and early exit
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn batch_bitmask_and_steps_are_consistent(
        strategy in arb_strategy(),
        x0_base in -2.5f32..1.0,
        step in 1e-4f32..0.1,
        x in 0usize..64,
        cy in -1.5f32..1.5,
    ) {
        let params = EscapeParams::default();
        let outcome = EscapeTimeKernel::new(strategy, params).escape_batch(x0_base, step, x, cy);
        for lane in 0..LANE_WIDTH {
            let flagged = outcome.escaped & (1 << lane) != 0;
            prop_assert_eq!(flagged, outcome.counts[lane] < params.n_max(), "lane {}", lane);
            let expected = EscapeTimeKernel::new(KernelStrategy::Scalar, params)
                .escape_point(pixel_cx(x0_base, step, x + lane), cy);
            prop_assert_eq!(outcome.counts[lane], expected);
        }
        let deepest = outcome.counts.iter().copied().max().unwrap_or(0);
        prop_assert_eq!(outcome.steps, deepest);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Fully escaping batches stop early
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn escaping_batch_stops_before_cap(
        strategy in arb_strategy(),
        x0_base in 0.5f32..50.0,
        step in 0.0f32..1.0,
        cy in 0.5f32..50.0,
    ) {
        // |c| > 0.7 on the positive quadrant, away from the set.
        let params = EscapeParams::default();
        let outcome = EscapeTimeKernel::new(strategy, params).escape_batch(x0_base, step, 0, cy);
        prop_assert_eq!(outcome.escaped, 0xFF);
        prop_assert!(outcome.steps < params.n_max());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Cap monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lower_cap_clamps_counts(
        strategy in arb_strategy(),
        low in 1u32..128,
        x0_base in -2.0f32..0.5,
        step in 1e-4f32..0.05,
        cy in -1.2f32..1.2,
    ) {
        let full = EscapeParams::default();
        let capped = EscapeParams::new(low, full.r2_max());
        let mut a = vec![0; 2 * LANE_WIDTH];
        let mut b = vec![0; 2 * LANE_WIDTH];
        EscapeTimeKernel::new(strategy, full).fill_row(x0_base, step, cy, &mut a);
        EscapeTimeKernel::new(strategy, capped).fill_row(x0_base, step, cy, &mut b);
        for (deep, shallow) in a.iter().zip(b.iter()) {
            prop_assert_eq!(*shallow, (*deep).min(low));
        }
    }
}
