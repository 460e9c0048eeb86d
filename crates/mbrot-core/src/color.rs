//! Iteration count to RGBA.
//!
//! The gradient runs from yellow (immediate escape) to blue (bounded):
//!
//! ```text
//! c = trunc(sqrt(sqrt(n / n_max)) * 255)   clamped to [0, 255]
//! R = 255 - c ; G = 255 - c ; B = c ; A = 255
//! ```
//!
//! The double square root spreads the low counts, where most of the
//! visible structure lives, over most of the ramp.

/// An 8-bit RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Bytes in buffer order.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Caps at or below this size get a precomputed table.
const LUT_LIMIT: u32 = 1 << 16;

/// Maps iteration counts to colors for a fixed cap.
#[derive(Debug, Clone)]
pub struct ColorMapper {
    n_max: u32,
    lut: Option<Box<[u8]>>,
}

impl ColorMapper {
    /// # Panics
    /// Panics if `n_max` is zero.
    #[must_use]
    pub fn new(n_max: u32) -> Self {
        assert!(n_max > 0, "iteration cap must be positive");
        let lut = (n_max <= LUT_LIMIT).then(|| {
            (0..=n_max)
                .map(|n| intensity(n, n_max))
                .collect::<Vec<_>>()
                .into_boxed_slice()
        });
        Self { n_max, lut }
    }

    #[must_use]
    pub const fn n_max(&self) -> u32 {
        self.n_max
    }

    /// Blue channel for count `n`; counts above the cap are treated as the cap.
    #[must_use]
    pub fn intensity(&self, n: u32) -> u8 {
        let n = n.min(self.n_max);
        match &self.lut {
            Some(lut) => lut[n as usize],
            None => intensity(n, self.n_max),
        }
    }

    #[must_use]
    pub fn color(&self, n: u32) -> Rgba {
        let c = self.intensity(n);
        Rgba::new(255 - c, 255 - c, c, 255)
    }

    /// Write the color of `n` into a 4-byte pixel slot.
    ///
    /// # Panics
    /// Panics if `pixel` is not exactly 4 bytes long.
    #[inline]
    pub fn write(&self, n: u32, pixel: &mut [u8]) {
        pixel.copy_from_slice(&self.color(n).to_bytes());
    }
}

fn intensity(n: u32, n_max: u32) -> u8 {
    let ratio = n as f32 / n_max as f32;
    // `as` saturates, which is the clamp to [0, 255].
    (ratio.sqrt().sqrt() * 255.0) as u8
}
