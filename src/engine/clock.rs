/// Wall-clock frame timing
///
/// Measures the time between display frames and hands out a bounded delta,
/// so a long stall (debugger break, window drag) never turns into an
/// unbounded burst of physics steps downstream.
use std::time::{Duration, Instant};

/// Largest frame delta handed out by the clock (seconds)
pub const DEFAULT_MAX_FRAME_DELTA: f64 = 0.25;

/// FPS tracking window (average over last N frames)
const FPS_WINDOW_SIZE: usize = 60;

/// Frame clock for the render loop
pub struct FrameClock {
    /// Time of last frame
    last_frame_time: Instant,

    /// Time when the clock started
    start_time: Instant,

    /// Upper bound on a single frame delta (seconds)
    max_frame_delta: f64,

    /// Frame timing history for FPS calculation
    frame_times: Vec<Duration>,

    /// Current frame number
    frame_count: u64,

    /// Current FPS (updated periodically)
    current_fps: f32,
}

impl FrameClock {
    /// Create a new clock with the default delta bound
    pub fn new() -> Self {
        Self::with_max_frame_delta(DEFAULT_MAX_FRAME_DELTA)
    }

    /// Create a new clock with a custom delta bound (seconds)
    pub fn with_max_frame_delta(max_frame_delta: f64) -> Self {
        let now = Instant::now();
        Self {
            last_frame_time: now,
            start_time: now,
            max_frame_delta: max_frame_delta.max(0.0),
            frame_times: Vec::with_capacity(FPS_WINDOW_SIZE),
            frame_count: 0,
            current_fps: 0.0,
        }
    }

    /// Begin a new frame, returns the bounded delta in seconds
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        // `Instant` is monotonic, so the delta is never negative here
        let frame_time = now.saturating_duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.record(frame_time)
    }

    /// Feed a fixed frame time instead of reading the wall clock
    #[cfg(test)]
    pub fn tick_with(&mut self, frame_time: Duration) -> f64 {
        self.last_frame_time = Instant::now();
        self.record(frame_time)
    }

    fn record(&mut self, frame_time: Duration) -> f64 {
        self.frame_count += 1;

        self.frame_times.push(frame_time);
        if self.frame_times.len() > FPS_WINDOW_SIZE {
            self.frame_times.remove(0);
        }

        // Update FPS counter every 10 frames
        if self.frame_count % 10 == 0 {
            self.update_fps();
        }

        let delta = frame_time.as_secs_f64();
        if delta > self.max_frame_delta {
            log::debug!(
                "Frame delta {:.3}s clamped to {:.3}s",
                delta,
                self.max_frame_delta
            );
            self.max_frame_delta
        } else {
            delta
        }
    }

    /// Get the delta bound in seconds
    pub fn max_frame_delta(&self) -> f64 {
        self.max_frame_delta
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.current_fps
    }

    /// Get total elapsed wall-clock time since start
    pub fn elapsed(&self) -> Duration {
        Instant::now().duration_since(self.start_time)
    }

    /// Get total number of frames ticked
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn update_fps(&mut self) {
        if self.frame_times.is_empty() {
            self.current_fps = 0.0;
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total / self.frame_times.len() as u32;

        self.current_fps = if avg_frame_time.as_secs_f32() > 0.0 {
            1.0 / avg_frame_time.as_secs_f32()
        } else {
            0.0
        };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
