/// Fixed timestep driver
///
/// Accumulates frame time and advances the physics world in constant
/// increments, any number of times per frame. The number and order of steps
/// depends only on the accumulated time, never on the display rate, so a run
/// is reproducible whether it renders at 30 or 240 frames per second.
use crate::engine::clock::DEFAULT_MAX_FRAME_DELTA;
use crate::engine::error::TimingAnomaly;

/// Default physics rate (60 steps per second)
pub const FIXED_TIMESTEP: f64 = 1.0 / 60.0;

/// Tolerance on the step boundary, absorbs binary rounding of 1/60 multiples
const STEP_EPSILON: f64 = 1e-9;

/// Anything that can be advanced by one fixed step
pub trait Steppable {
    fn step(&mut self, dt: f32);
}

/// Driver configuration, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    /// Simulated seconds per physics step
    pub fixed_step: f64,
    /// Upper bound on a single frame delta, in seconds
    pub max_frame_delta: f64,
}

pub const DEFAULT_DRIVER_CONFIG: DriverConfig = DriverConfig {
    fixed_step: FIXED_TIMESTEP,
    max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
};

impl Default for DriverConfig {
    fn default() -> Self {
        DEFAULT_DRIVER_CONFIG
    }
}

/// Result of one `advance` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Number of physics steps executed this frame
    pub steps: u32,
    /// Set when the incoming delta was rejected and treated as zero
    pub anomaly: Option<TimingAnomaly>,
}

/// Fixed-step driver state
pub struct FixedStepDriver {
    config: DriverConfig,

    /// Leftover time, always in `[0, fixed_step)` after `advance`
    accumulator: f64,

    /// Total simulated time
    simulated_time: f64,

    /// Whether stepping is suspended
    paused: bool,

    /// Frames advanced
    frame_count: u64,

    /// Total steps executed
    step_count: u64,
}

impl FixedStepDriver {
    /// Create a driver with the default 1/60 s step
    pub fn new() -> Self {
        Self::with_config(DEFAULT_DRIVER_CONFIG)
    }

    /// Create a driver from a custom configuration
    ///
    /// A non-positive or non-finite step falls back to the default step.
    pub fn with_config(mut config: DriverConfig) -> Self {
        if !(config.fixed_step.is_finite() && config.fixed_step > 0.0) {
            log::warn!(
                "Invalid fixed step {}, using {}",
                config.fixed_step,
                FIXED_TIMESTEP
            );
            config.fixed_step = FIXED_TIMESTEP;
        }
        if !(config.max_frame_delta >= 0.0) {
            config.max_frame_delta = DEFAULT_MAX_FRAME_DELTA;
        }

        Self {
            config,
            accumulator: 0.0,
            simulated_time: 0.0,
            paused: false,
            frame_count: 0,
            step_count: 0,
        }
    }

    /// Advance by one display frame, stepping `world` as many times as fit
    pub fn advance<W: Steppable + ?Sized>(&mut self, frame_delta: f64, world: &mut W) -> StepOutcome {
        let (delta, anomaly) = self.sanitize(frame_delta);
        self.frame_count += 1;

        if self.paused {
            return StepOutcome { steps: 0, anomaly };
        }

        let step = self.config.fixed_step;
        let available = self.accumulator + delta;
        let steps = ((available + STEP_EPSILON) / step).floor().max(0.0) as u32;

        let dt = step as f32;
        for _ in 0..steps {
            world.step(dt);
        }

        self.accumulator = (available - steps as f64 * step).max(0.0);
        if self.accumulator >= step {
            // Only reachable through rounding right at the boundary
            self.accumulator = 0.0;
        }
        self.simulated_time += steps as f64 * step;
        self.step_count += steps as u64;

        StepOutcome { steps, anomaly }
    }

    fn sanitize(&self, frame_delta: f64) -> (f64, Option<TimingAnomaly>) {
        let anomaly = if frame_delta.is_nan() {
            Some(TimingAnomaly::NotANumber)
        } else if frame_delta < 0.0 {
            Some(TimingAnomaly::Negative(frame_delta))
        } else {
            None
        };

        if let Some(anomaly) = anomaly {
            log::warn!("{}; treating frame delta as zero", anomaly);
            return (0.0, Some(anomaly));
        }

        (frame_delta.min(self.config.max_frame_delta), None)
    }

    /// Get the fixed timestep (seconds)
    pub fn fixed_step(&self) -> f64 {
        self.config.fixed_step
    }

    /// Get the driver configuration
    pub fn config(&self) -> DriverConfig {
        self.config
    }

    /// Leftover time not yet consumed by a step
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Interpolation alpha between the last two physics states
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.config.fixed_step) as f32
    }

    /// Total simulated time in seconds
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }

    /// Get total number of frames advanced
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of steps executed
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Check if stepping is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause stepping
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Simulation paused");
        }
    }

    /// Resume stepping
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent a step burst
            self.accumulator = 0.0;
            log::info!("Simulation resumed");
        }
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for FixedStepDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[derive(Default)]
    struct CountingWorld {
        steps: u32,
        last_dt: f32,
    }

    impl Steppable for CountingWorld {
        fn step(&mut self, dt: f32) {
            self.steps += 1;
            self.last_dt = dt;
        }
    }

    #[test]
    fn test_driver_creation() {
        let driver = FixedStepDriver::new();
        assert_eq!(driver.frame_count(), 0);
        assert_eq!(driver.step_count(), 0);
        assert!(!driver.is_paused());
        assert!((driver.fixed_step() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_tenth_second_frame_runs_six_steps() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();

        let outcome = driver.advance(0.1, &mut world);

        assert_eq!(outcome.steps, 6);
        assert_eq!(world.steps, 6);
        assert_abs_diff_eq!(driver.accumulator(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(world.last_dt, 1.0 / 60.0, epsilon = 1e-7);
    }

    #[test]
    fn test_short_frames_accumulate() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();

        // 120 Hz display: one step every other frame
        let first = driver.advance(1.0 / 120.0, &mut world);
        let second = driver.advance(1.0 / 120.0, &mut world);

        assert_eq!(first.steps, 0);
        assert_eq!(second.steps, 1);
        assert!(driver.accumulator() < driver.fixed_step());
    }

    #[test]
    fn test_step_count_independent_of_split() {
        let total = 2.0;
        let splits: [&[f64]; 3] = [
            &[1.0 / 30.0; 60],
            &[1.0 / 144.0; 288],
            &[0.013, 0.021, 0.007, 0.033, 0.019],
        ];

        for split in splits {
            let mut driver = FixedStepDriver::new();
            let mut world = CountingWorld::default();
            let mut sum = 0.0;
            let mut i = 0;
            while sum < total - 1e-12 {
                let delta = split[i % split.len()].min(total - sum);
                driver.advance(delta, &mut world);
                sum += delta;
                i += 1;
            }

            let expected = (total / FIXED_TIMESTEP).floor() as i64;
            let diff = (world.steps as i64 - expected).abs();
            assert!(diff <= 1, "expected ~{} steps, got {}", expected, world.steps);
        }
    }

    #[test]
    fn test_accumulator_stays_below_step() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();
        for delta in [0.001, 0.05, 0.0166, 0.2, 0.017, 0.0] {
            driver.advance(delta, &mut world);
            assert!(driver.accumulator() >= 0.0);
            assert!(driver.accumulator() < driver.fixed_step());
        }
    }

    #[test]
    fn test_stall_is_bounded() {
        let mut driver = FixedStepDriver::with_config(DriverConfig {
            fixed_step: 1.0 / 60.0,
            max_frame_delta: 0.1,
        });
        let mut world = CountingWorld::default();

        let outcome = driver.advance(5.0, &mut world);

        assert_eq!(outcome.steps, 6);
        assert!(outcome.anomaly.is_none());
    }

    #[test]
    fn test_negative_delta_is_zeroed() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();
        driver.advance(0.01, &mut world);
        let before = driver.accumulator();

        let outcome = driver.advance(-0.5, &mut world);

        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.anomaly, Some(TimingAnomaly::Negative(-0.5)));
        assert_eq!(driver.accumulator(), before);
    }

    #[test]
    fn test_nan_delta_is_zeroed() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();

        let outcome = driver.advance(f64::NAN, &mut world);

        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.anomaly, Some(TimingAnomaly::NotANumber));
        assert_eq!(driver.accumulator(), 0.0);
    }

    #[test]
    fn test_invalid_step_falls_back() {
        let driver = FixedStepDriver::with_config(DriverConfig {
            fixed_step: 0.0,
            max_frame_delta: 0.25,
        });
        assert_eq!(driver.fixed_step(), FIXED_TIMESTEP);
    }

    #[test]
    fn test_pause_resume() {
        let mut driver = FixedStepDriver::new();
        assert!(!driver.is_paused());

        driver.pause();
        assert!(driver.is_paused());

        driver.resume();
        assert!(!driver.is_paused());
    }

    #[test]
    fn test_toggle_pause() {
        let mut driver = FixedStepDriver::new();
        driver.toggle_pause();
        assert!(driver.is_paused());
        driver.toggle_pause();
        assert!(!driver.is_paused());
    }

    #[test]
    fn test_paused_no_steps() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();
        driver.pause();

        let outcome = driver.advance(0.2, &mut world);

        assert_eq!(outcome.steps, 0);
        assert_eq!(world.steps, 0);
        assert_eq!(driver.frame_count(), 1);
    }

    #[test]
    fn test_alpha_range() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();
        driver.advance(0.025, &mut world);
        let alpha = driver.alpha();
        assert!((0.0..1.0).contains(&alpha));
    }

    #[test]
    fn test_simulated_time_tracks_steps() {
        let mut driver = FixedStepDriver::new();
        let mut world = CountingWorld::default();
        driver.advance(0.1, &mut world);
        assert_abs_diff_eq!(driver.simulated_time(), 0.1, epsilon = 1e-9);
        assert_eq!(driver.step_count(), 6);
    }
}
