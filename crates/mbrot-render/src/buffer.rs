//! Owned RGBA8 frame.

use mbrot_core::{EngineConfig, Rgba};

/// Row-major RGBA8 pixel buffer of a fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    length: usize,
    width: usize,
    bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Zeroed buffer with `length` pixels per row and `width` rows.
    #[must_use]
    pub fn new(length: usize, width: usize) -> Self {
        Self {
            length,
            width,
            bytes: vec![0; length * width * 4],
        }
    }

    /// Buffer sized for `config`.
    #[must_use]
    pub fn for_config(config: &EngineConfig) -> Self {
        Self::new(config.length, config.width)
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Bytes per row.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.length * 4
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Bytes of row `y`.
    ///
    /// # Panics
    /// Panics if `y` is out of range.
    #[must_use]
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.width, "row {y} out of range (height {})", self.width);
        let start = y * self.stride();
        &self.bytes[start..start + self.stride()]
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    #[inline]
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.length || y >= self.width {
            return None;
        }
        let i = (y * self.length + x) * 4;
        Some(Rgba::from_bytes([
            self.bytes[i],
            self.bytes[i + 1],
            self.bytes[i + 2],
            self.bytes[i + 3],
        ]))
    }
}
