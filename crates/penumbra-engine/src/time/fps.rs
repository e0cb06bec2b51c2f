use std::time::Duration;

/// Counts presented frames and reports the rate once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    accumulated: Duration,
    frames: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            accumulated: Duration::ZERO,
            frames: 0,
        }
    }

    /// Records one frame that took `dt` seconds.
    ///
    /// Returns the frames-per-second figure when a full window has elapsed.
    pub fn frame(&mut self, dt: f32) -> Option<f32> {
        self.accumulated += Duration::from_secs_f32(dt.max(0.0));
        self.frames += 1;

        if self.accumulated < self.window {
            return None;
        }

        let fps = self.frames as f32 / self.accumulated.as_secs_f32();
        self.accumulated = Duration::ZERO;
        self.frames = 0;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut fps = FpsCounter::new();
        let mut frames = 0;
        let rate = loop {
            frames += 1;
            assert!(frames <= 61, "no report after {frames} frames");
            if let Some(rate) = fps.frame(1.0 / 60.0) {
                break rate;
            }
        };
        assert!(frames >= 60);
        assert!((rate - 60.0).abs() < 1.0, "rate = {rate}");
        assert_eq!(fps.frame(1.0 / 60.0), None);
    }

    #[test]
    fn slow_frame_reports_immediately() {
        let mut fps = FpsCounter::new();
        let rate = fps.frame(2.0).unwrap();
        assert!((rate - 0.5).abs() < 1e-4);
    }
}
