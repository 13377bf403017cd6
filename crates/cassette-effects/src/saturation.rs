//! Tape saturation with loudness-compensated drive.
//!
//! `y = trim(drive) · tanh(drive · x)`, where `trim` is read from a table of
//! RMS ratios measured on a full-scale sine. Low drive is therefore close to
//! unity gain and high drive compresses toward a square wave without getting
//! louder.
//!
//! # Trim Table
//!
//! [`TrimTable`] is built once per [`Saturation`] instance and never
//! mutated. Each entry is `rms(sin) / rms(tanh(g · sin))` for
//! `g = 10^(dB/20)`, sampled over one period in `f64`, at half-dB steps
//! from [`TRIM_MIN_DB`] to [`TRIM_MAX_DB`]. Lookups interpolate linearly.
//!
//! # Bypass
//!
//! Drive within `1e-3` dB of zero crossfades the shaper out over one block.
//! Once the crossfade settles the stage is a strict identity.

use cassette_core::{
    BlockRamp, ParamDescriptor, ParamUnit, TapeModule, db_to_linear, frame_count, lerp, sanitize,
    sanitize_buffer,
};
use libm::{sin, sqrt, tanh, tanhf};

/// Lowest tabulated drive.
pub const TRIM_MIN_DB: f32 = -60.0;
/// Highest tabulated drive.
pub const TRIM_MAX_DB: f32 = 40.0;
/// Table resolution.
pub const TRIM_STEP_DB: f32 = 0.5;
/// Number of table entries.
pub const TRIM_TABLE_LEN: usize = 201;

const SINE_POINTS: usize = 256;
const BYPASS_EPSILON_DB: f32 = 1e-3;

/// Shaper drive.
pub const DRIVE: ParamDescriptor = ParamDescriptor::new(
    "sat_drive_db",
    "Drive",
    ParamUnit::Decibels,
    TRIM_MIN_DB,
    TRIM_MAX_DB,
    0.0,
);
/// Output gain after the automatic trim.
pub const OUTPUT: ParamDescriptor =
    ParamDescriptor::new("sat_output_db", "Output", ParamUnit::Decibels, -24.0, 24.0, 0.0);

/// RMS-compensation table for the tanh shaper.
#[derive(Debug, Clone)]
pub struct TrimTable {
    entries: [f32; TRIM_TABLE_LEN],
}

impl TrimTable {
    /// Measures every entry.
    pub fn build() -> Self {
        let mut entries = [1.0f32; TRIM_TABLE_LEN];
        let reference = sine_rms(|x| x);
        for (i, entry) in entries.iter_mut().enumerate() {
            let db = f64::from(TRIM_MIN_DB) + i as f64 * f64::from(TRIM_STEP_DB);
            let g = libm::pow(10.0, db / 20.0);
            let shaped = sine_rms(|x| tanh(g * x));
            if shaped > 0.0 {
                *entry = (reference / shaped) as f32;
            }
        }
        Self { entries }
    }

    /// Trim at `drive_db`, clamped to the table range.
    pub fn lookup(&self, drive_db: f32) -> f32 {
        let db = if drive_db.is_nan() {
            0.0
        } else {
            drive_db.clamp(TRIM_MIN_DB, TRIM_MAX_DB)
        };
        let pos = (db - TRIM_MIN_DB) / TRIM_STEP_DB;
        let index = (pos as usize).min(TRIM_TABLE_LEN - 2);
        let frac = (pos - index as f32).clamp(0.0, 1.0);
        lerp(self.entries[index], self.entries[index + 1], frac)
    }

    /// Raw entries, lowest drive first.
    pub fn entries(&self) -> &[f32] {
        &self.entries
    }
}

impl Default for TrimTable {
    fn default() -> Self {
        Self::build()
    }
}

fn sine_rms(shape: impl Fn(f64) -> f64) -> f64 {
    let mut sum = 0.0;
    for n in 0..SINE_POINTS {
        let phase = core::f64::consts::TAU * n as f64 / SINE_POINTS as f64;
        let y = shape(sin(phase));
        sum += y * y;
    }
    sqrt(sum / SINE_POINTS as f64)
}

/// Loudness-compensated tanh saturation.
///
/// ## Parameters
///
/// | Name | Range | Default |
/// |------|-------|---------|
/// | Drive | -60.0–40.0 dB | 0.0 (bypass) |
/// | Output | -24.0–24.0 dB | 0.0 |
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
/// use cassette_effects::Saturation;
///
/// let mut sat = Saturation::new();
/// sat.prepare(48000.0, 2);
/// sat.set_drive_db(12.0);
///
/// let mut block = vec![0.9f32; 128];
/// sat.process_interleaved(&mut block, 2);
/// assert!(block.iter().all(|s| s.abs() < 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Saturation {
    table: TrimTable,
    drive_db: f32,
    output_db: f32,
    drive: BlockRamp,
    trim: BlockRamp,
    wet: BlockRamp,
    output: BlockRamp,
}

impl Default for Saturation {
    fn default() -> Self {
        Self::new()
    }
}

impl Saturation {
    /// Creates a bypassed stage and builds its trim table.
    pub fn new() -> Self {
        let table = TrimTable::build();
        let trim = table.lookup(0.0);
        Self {
            table,
            drive_db: DRIVE.default,
            output_db: OUTPUT.default,
            drive: BlockRamp::new(1.0),
            trim: BlockRamp::new(trim),
            wet: BlockRamp::new(0.0),
            output: BlockRamp::new(1.0),
        }
    }

    /// Sets the drive in dB. Zero bypasses the shaper.
    pub fn set_drive_db(&mut self, drive_db: f32) {
        let drive_db = DRIVE.clamp(drive_db);
        self.drive_db = drive_db;
        if drive_db.abs() < BYPASS_EPSILON_DB {
            self.wet.set_target(0.0);
        } else {
            self.wet.set_target(1.0);
            self.drive.set_target(db_to_linear(drive_db));
            self.trim.set_target(self.table.lookup(drive_db));
        }
    }

    /// Drive in dB.
    pub fn drive_db(&self) -> f32 {
        self.drive_db
    }

    /// Sets the output gain in dB.
    pub fn set_output_db(&mut self, output_db: f32) {
        self.output_db = OUTPUT.clamp(output_db);
        self.output.set_target(if self.output_db == 0.0 {
            1.0
        } else {
            db_to_linear(self.output_db)
        });
    }

    /// Output gain in dB.
    pub fn output_db(&self) -> f32 {
        self.output_db
    }

    /// The trim table owned by this instance.
    pub fn trim_table(&self) -> &TrimTable {
        &self.table
    }

    /// Static transfer curve at the target settings, without smoothing.
    pub fn transfer(&self, x: f32) -> f32 {
        if self.drive_db.abs() < BYPASS_EPSILON_DB {
            return x * self.output.target();
        }
        let g = db_to_linear(self.drive_db);
        self.output.target() * self.table.lookup(self.drive_db) * tanhf(g * x)
    }
}

impl TapeModule for Saturation {
    fn prepare(&mut self, _sample_rate: f32, _channels: usize) {
        self.reset();
    }

    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        let active = &mut buffer[..frames * channels];
        if self.is_neutral() {
            sanitize_buffer(active);
            return;
        }

        self.drive.begin_block(frames);
        self.trim.begin_block(frames);
        self.wet.begin_block(frames);
        self.output.begin_block(frames);

        for frame in active.chunks_exact_mut(channels) {
            let g = self.drive.advance();
            let trim = self.trim.advance();
            let wet = self.wet.advance();
            let out = self.output.advance();
            for sample in frame {
                let x = sanitize(*sample);
                let shaped = trim * tanhf(g * x);
                *sample = out * (x + wet * (shaped - x));
            }
        }
    }

    fn reset(&mut self) {
        self.drive.set_immediate(self.drive.target());
        self.trim.set_immediate(self.trim.target());
        self.wet.set_immediate(self.wet.target());
        self.output.set_immediate(self.output.target());
    }

    fn is_neutral(&self) -> bool {
        self.wet.is_settled()
            && self.wet.get() == 0.0
            && self.output.is_settled()
            && self.output.get() == 1.0
    }
}
