//! Parameter smoothing for zipper-free changes.
//!
//! Parameters arrive once per block. Applying them as a step mid-stream
//! produces clicks, so every continuously variable control goes through one
//! of these smoothers:
//!
//! - [`SmoothedParam`]: exponential (one-pole) approach, advanced per sample
//! - [`BlockRamp`]: linear ramp from the current value to the target, spread
//!   evenly over one block
//! - [`BlockSmoother`]: exponential approach advanced once per block, for
//!   values that are expensive to recompute per sample
//!
//! ## Usage
//!
//! ```rust
//! use cassette_core::BlockRamp;
//!
//! let mut drive = BlockRamp::new(1.0);
//! drive.set_target(2.0);
//! drive.begin_block(4);
//! let values: Vec<f32> = (0..4).map(|_| drive.advance()).collect();
//! assert_eq!(values, vec![1.25, 1.5, 1.75, 2.0]);
//! ```

use libm::expf;

/// Exponential smoothing coefficient for a time constant.
///
/// `alpha = 1 - exp(-1 / (tau * rate))`, where `rate` is the update rate in
/// Hz. Returns `1.0` (instant) for non-positive times or rates.
#[inline]
pub fn smoothing_alpha(time_constant_s: f32, update_rate_hz: f32) -> f32 {
    let samples = time_constant_s * update_rate_hz;
    if !samples.is_finite() || samples <= 0.0 {
        1.0
    } else {
        1.0 - expf(-1.0 / samples)
    }
}

/// Relative distance at which an exponential approach lands on its target.
pub const SETTLE_EPSILON: f32 = 1e-6;

/// One step of `x += alpha * (target - x)`.
///
/// Returns `target` exactly once the step no longer moves the value in `f32`
/// or the result is within [`SETTLE_EPSILON`] of it (relative, measured
/// against `max(|target|, 1)`). A non-positive `alpha` holds `current`.
///
/// ```rust
/// use cassette_core::glide;
///
/// assert_eq!(glide(0.5, 1.0, 0.5), 0.75);
/// assert_eq!(glide(0.9999982, 1.0, 0.002), 1.0);
/// assert_eq!(glide(0.3, 1.0, 0.0), 0.3);
/// ```
#[inline]
pub fn glide(current: f32, target: f32, alpha: f32) -> f32 {
    if alpha.is_nan() || alpha <= 0.0 {
        return current;
    }
    let next = current + alpha * (target - current);
    if next == current || (next - target).abs() <= SETTLE_EPSILON * target.abs().max(1.0) {
        target
    } else {
        next
    }
}

/// A parameter with per-sample exponential smoothing.
///
/// Each step goes through [`glide`], so a parameter always lands on its
/// target exactly and a settled parameter holds it.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Creates a parameter with smoothing disabled (instant changes).
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Creates a parameter with full configuration.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Sets the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Sets target and current value together (no smoothing).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Updates the sample rate and recalculates the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Sets the smoothing time constant in milliseconds.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advances one sample and returns the smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current = glide(self.current, self.target, self.coeff);
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the current value equals the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Jumps to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = smoothing_alpha(self.smoothing_time_ms / 1000.0, self.sample_rate);
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A per-block linear ramp.
///
/// At the start of each block, [`begin_block`](Self::begin_block) computes
/// `step = (target - current) / frames`. Each [`advance`](Self::advance)
/// adds one step; the last sample of the block lands exactly on the target.
#[derive(Debug, Clone)]
pub struct BlockRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: usize,
}

impl BlockRamp {
    /// Creates a settled ramp at `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Sets the value the next block ramps toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Sets target and current value together and cancels any ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Plans a ramp over `frames` samples.
    ///
    /// A ramp left unfinished by a shorter previous block restarts from the
    /// value it had reached.
    #[inline]
    pub fn begin_block(&mut self, frames: usize) {
        if frames == 0 || self.current == self.target {
            self.step = 0.0;
            self.remaining = 0;
            self.current = self.target;
            return;
        }
        self.step = (self.target - self.current) / frames as f32;
        self.remaining = frames;
    }

    /// Advances one sample and returns the ramped value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else {
                self.current += self.step;
            }
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True when the value will not change during the next block.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining == 0 && self.current == self.target
    }
}

impl Default for BlockRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Exponential smoothing advanced once per block.
///
/// The coefficient is derived from the block duration, so the effective time
/// constant is independent of block size:
/// `alpha = 1 - exp(-(frames / sample_rate) / tau)`.
#[derive(Debug, Clone)]
pub struct BlockSmoother {
    current: f32,
    target: f32,
    time_constant_s: f32,
}

impl BlockSmoother {
    /// Creates a settled smoother with time constant `time_constant_ms`.
    pub fn new(initial: f32, time_constant_ms: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            time_constant_s: time_constant_ms / 1000.0,
        }
    }

    /// Sets the value to approach.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Sets target and current value together.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }

    /// Advances by one block of `frames` samples and returns the new value.
    ///
    /// Steps through [`glide`], so the value lands on the target exactly.
    pub fn advance_block(&mut self, frames: usize, sample_rate: f32) -> f32 {
        if frames == 0 || sample_rate <= 0.0 {
            return self.current;
        }
        let block_s = frames as f32 / sample_rate;
        let alpha = if self.time_constant_s <= 0.0 {
            1.0
        } else {
            1.0 - expf(-block_s / self.time_constant_s)
        };
        self.current = glide(self.current, self.target, alpha);
        self.current
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// True once the current value equals the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}
