//! Property-based invariant tests for frame rendering.
//!
//! 1. Every strategy renders byte-identical frames for any viewport
//! 2. Rendered colors are exactly the mapped iteration counts
//! 3. Probing a pixel agrees with the count grid
//! 4. Frame stats are independent of the strategy's batching for
//!    pixels and bounded totals; batched lane-steps never undercut scalar

use mbrot_core::{EngineConfig, Viewport};
use mbrot_render::{FrameRenderer, PixelBuffer, Strategy as KernelStrategy};
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn arb_strategy() -> impl Strategy<Value = KernelStrategy> {
    prop::sample::select(KernelStrategy::ALL.to_vec())
}

fn arb_config() -> impl Strategy<Value = EngineConfig> {
    (1usize..=6, 1usize..=12, 1u32..=300).prop_map(|(batches, rows, n_max)| {
        EngineConfig::default()
            .with_resolution(batches * 8, rows)
            .with_n_max(n_max)
    })
}

fn arb_viewport() -> impl Strategy<Value = Viewport> {
    (-1.0f32..1.0, -1.0f32..1.0, 1e-3f32..4.0)
        .prop_map(|(x, y, scale)| Viewport::new(x, y, scale))
}

fn render(config: &EngineConfig, strategy: KernelStrategy, viewport: &Viewport) -> PixelBuffer {
    let mut renderer = FrameRenderer::new(config, strategy).expect("generated config is valid");
    let mut buf = PixelBuffer::for_config(config);
    renderer.render_into(viewport, &mut buf);
    buf
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Strategy equivalence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn strategies_render_identical_bytes(
        config in arb_config(),
        strategy in arb_strategy(),
        viewport in arb_viewport(),
    ) {
        let reference = render(&config, KernelStrategy::Scalar, &viewport);
        let other = render(&config, strategy, &viewport);
        prop_assert!(other == reference, "{} differs at {:?}", strategy, viewport);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Colors are mapped counts
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn colors_are_mapped_counts(
        config in arb_config(),
        strategy in arb_strategy(),
        viewport in arb_viewport(),
    ) {
        let mut renderer = FrameRenderer::new(&config, strategy).expect("valid config");
        let mut buf = PixelBuffer::for_config(&config);
        let mut counts = vec![0u32; config.pixel_count()];
        renderer.render_into(&viewport, &mut buf);
        renderer.render_counts(&viewport, &mut counts);
        for (i, &n) in counts.iter().enumerate() {
            prop_assert!(n <= config.n_max);
            let pixel = buf.pixel(i % config.length, i / config.length);
            prop_assert_eq!(pixel, Some(renderer.colors().color(n)));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Probe agrees with the grid
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn probe_matches_grid(
        config in arb_config(),
        strategy in arb_strategy(),
        viewport in arb_viewport(),
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
    ) {
        let renderer = FrameRenderer::new(&config, strategy).expect("valid config");
        let mut counts = vec![0u32; config.pixel_count()];
        renderer.render_counts(&viewport, &mut counts);
        let x = ((fx * config.length as f64) as usize).min(config.length - 1);
        let y = ((fy * config.width as f64) as usize).min(config.width - 1);
        let probe = renderer.probe(x, y, &viewport);
        prop_assert_eq!(probe.count, counts[y * config.length + x]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Stats totals
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stats_totals_match_across_strategies(
        config in arb_config(),
        strategy in arb_strategy(),
        viewport in arb_viewport(),
    ) {
        let scalar = FrameRenderer::new(&config, KernelStrategy::Scalar).expect("valid config");
        let other = FrameRenderer::new(&config, strategy).expect("valid config");
        let mut counts = vec![0u32; config.pixel_count()];
        let a = scalar.render_counts(&viewport, &mut counts);
        let b = other.render_counts(&viewport, &mut counts);
        prop_assert_eq!(a.rows, b.rows);
        prop_assert_eq!(a.pixels, b.pixels);
        prop_assert_eq!(a.bounded, b.bounded);
        // Batches run every lane to the deepest lane's count.
        prop_assert!(b.steps >= a.steps, "batched {} < scalar {}", b.steps, a.steps);
        if strategy.is_batched() {
            prop_assert_eq!(b.steps % 8, 0);
        }
    }
}
