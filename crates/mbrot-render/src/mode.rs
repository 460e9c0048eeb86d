//! Frame-loop run modes.

/// How the orchestrator drives frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Render until the user quits; every frame is presented.
    #[default]
    Interactive,
    /// Render a fixed number of frames, discard them, and report timing.
    Headless {
        /// Frames to render.
        frames: u64,
    },
}

impl RunMode {
    /// Frame count of the default benchmark run.
    pub const DEFAULT_BENCH_FRAMES: u64 = 300;

    /// Headless run of [`Self::DEFAULT_BENCH_FRAMES`] frames.
    #[must_use]
    pub const fn benchmark() -> Self {
        Self::Headless {
            frames: Self::DEFAULT_BENCH_FRAMES,
        }
    }

    #[must_use]
    pub const fn is_headless(self) -> bool {
        matches!(self, Self::Headless { .. })
    }

    /// Upper bound on frames, if the mode has one.
    #[must_use]
    pub const fn frame_limit(self) -> Option<u64> {
        match self {
            Self::Interactive => None,
            Self::Headless { frames } => Some(frames),
        }
    }

    /// Whether another frame should run after `done` frames.
    #[must_use]
    pub const fn should_continue(self, done: u64) -> bool {
        match self {
            Self::Interactive => true,
            Self::Headless { frames } => done < frames,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Headless { .. } => "headless",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn benchmark_defaults_to_300_frames() {
        assert_eq!(RunMode::benchmark().frame_limit(), Some(300));
        assert!(RunMode::benchmark().is_headless());
    }

    #[test]
    fn headless_stops_at_limit() {
        let mode = RunMode::Headless { frames: 2 };
        assert!(mode.should_continue(0));
        assert!(mode.should_continue(1));
        assert!(!mode.should_continue(2));
    }

    #[test]
    fn interactive_never_stops_on_count() {
        let mode = RunMode::default();
        assert_eq!(mode, RunMode::Interactive);
        assert!(mode.should_continue(u64::MAX));
        assert_eq!(mode.frame_limit(), None);
    }
}
