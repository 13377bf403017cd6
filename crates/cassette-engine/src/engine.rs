//! The composition root: one instance of every stage, run in a fixed order.
//!
//! # Pipeline
//!
//! ```text
//! Input → Dropouts → Compander → WowFlutter → HeadBump → Saturation
//!       → HfLoss → Eq → Hiss → Crosstalk → Azimuth → Meters → Output
//! ```
//!
//! The order is fixed here and nowhere else. Every stage is a concrete field
//! and is called directly; nothing on the audio path goes through a vtable.
//!
//! # Per-Block Sequence
//!
//! 1. Channel count differs from the prepared one: re-prepare every stage.
//! 2. Copy the latest [`ParameterSnapshot`] out of the [`ParamSlot`]; push it
//!    to the stages if it changed since the last block.
//! 3. Run the pipeline over chunks of at most `max_block_frames`.
//!
//! Step 1 allocates. Everything else is allocation-free.

use cassette_core::{TapeModule, frame_count};
use cassette_effects::{
    Azimuth, Compander, Crosstalk, Dropouts, Eq, EqSettings, HeadBump, HfLoss, Hiss, Meters,
    Saturation, WowFlutter,
};

use crate::{EngineConfig, EngineError, MAX_CHANNELS, ParamSlot, ParameterSnapshot, TRACK_COUNT};

/// Tape emulation engine.
///
/// # Example
///
/// ```rust
/// use cassette_engine::{Engine, EngineConfig, ParameterSnapshot};
///
/// let mut engine = Engine::new(EngineConfig::default().with_seed(1)).unwrap();
/// engine.update_parameters(ParameterSnapshot::tape_default());
///
/// let mut block = vec![0.0f32; 512 * 2];
/// engine.process(&mut block, 2);
///
/// let mut levels = [0.0f32; 2];
/// assert_eq!(engine.read_meters(&mut levels), 2);
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    /// Channel count the stages are currently sized for. Tracks implicit
    /// re-prepares and can differ from `config.channels`.
    channels: usize,
    slot: ParamSlot,
    applied: Option<ParameterSnapshot>,

    dropouts: Dropouts,
    compander: Compander,
    wow_flutter: WowFlutter,
    head_bump: HeadBump,
    saturation: Saturation,
    hf_loss: HfLoss,
    eq: Eq,
    hiss: Hiss,
    crosstalk: Crosstalk,
    azimuth: Azimuth,
    meters: Meters,
}

impl Engine {
    /// Creates an engine prepared for `config`, with neutral parameters.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if let Err(err) = config.validate() {
            tracing::warn!("engine: rejected config {config:?}: {err}");
            return Err(err);
        }
        let hiss = match config.seed {
            Some(seed) => Hiss::with_seed(seed),
            None => Hiss::new(),
        };
        let mut engine = Self {
            config,
            channels: config.channels,
            slot: ParamSlot::default(),
            applied: None,
            dropouts: Dropouts::new(),
            compander: Compander::new(),
            wow_flutter: WowFlutter::new(),
            head_bump: HeadBump::new(),
            saturation: Saturation::new(),
            hf_loss: HfLoss::new(),
            eq: Eq::new(),
            hiss,
            crosstalk: Crosstalk::new(),
            azimuth: Azimuth::new(),
            meters: Meters::new(),
        };
        engine.apply_latest();
        engine.prepare_stages(config.channels);
        tracing::info!(
            "engine: prepared {} Hz, {} ch, max block {}",
            config.sample_rate,
            config.channels,
            config.max_block_frames
        );
        Ok(engine)
    }

    /// Re-sizes every stage for a new stream format and clears their history.
    ///
    /// Not real-time safe. The caller must not run [`process`](Self::process)
    /// concurrently. On error the engine keeps its previous format.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_frames: usize,
        channels: usize,
    ) -> Result<(), EngineError> {
        let config = EngineConfig {
            sample_rate,
            max_block_frames,
            channels,
            seed: self.config.seed,
        };
        if let Err(err) = config.validate() {
            tracing::warn!(
                "engine: prepare rejected ({sample_rate} Hz, {channels} ch, max block {max_block_frames}): {err}"
            );
            return Err(err);
        }
        self.config = config;
        self.prepare_stages(channels);
        tracing::info!(
            "engine: prepared {sample_rate} Hz, {channels} ch, max block {max_block_frames}"
        );
        Ok(())
    }

    /// Publishes a parameter snapshot. Takes effect from the next block.
    ///
    /// Same as storing into [`param_slot`](Self::param_slot).
    pub fn update_parameters(&self, snapshot: ParameterSnapshot) {
        self.slot.store(snapshot);
        tracing::debug!("engine: parameter snapshot published");
    }

    /// Handle for publishing parameters from another thread.
    pub fn param_slot(&self) -> ParamSlot {
        self.slot.clone()
    }

    /// Most recently published (sanitized) snapshot.
    pub fn latest_parameters(&self) -> ParameterSnapshot {
        self.slot.load()
    }

    /// Processes an interleaved buffer in place.
    ///
    /// A trailing partial frame is left untouched. `channels == 0`, an empty
    /// buffer, or more than [`MAX_CHANNELS`] channels is a no-op. A channel
    /// count that differs from the prepared one re-prepares the engine first.
    pub fn process(&mut self, buffer: &mut [f32], channels: usize) {
        let frames = frame_count(buffer.len(), channels);
        if frames == 0 {
            return;
        }
        if channels > MAX_CHANNELS {
            tracing::warn!("engine: {channels} channels exceeds {MAX_CHANNELS}, block skipped");
            return;
        }
        if channels != self.channels {
            tracing::debug!(
                "engine: channel count {} -> {channels}, re-preparing",
                self.channels
            );
            self.prepare_stages(channels);
        }

        self.apply_latest();

        let max_frames = self.config.max_block_frames;
        if frames > max_frames {
            tracing::warn!(
                "engine: {frames}-frame block exceeds prepared maximum {max_frames}, splitting"
            );
        }
        for chunk in buffer[..frames * channels].chunks_mut(max_frames * channels) {
            self.run_pipeline(chunk, channels);
        }
    }

    /// Writes per-channel RMS in dBFS accumulated since the last call and
    /// resets the accumulators. Returns the number of channels written.
    pub fn read_meters(&mut self, out: &mut [f32]) -> usize {
        self.meters.read_rms_db(out)
    }

    /// Writes per-channel peak level in dBFS since the last call and resets
    /// the peaks. Returns the number of channels written.
    pub fn read_peaks(&mut self, out: &mut [f32]) -> usize {
        self.meters.read_peaks_db(out)
    }

    /// Clears every stage's history and the meters. Parameters are kept.
    pub fn reset(&mut self) {
        self.dropouts.reset();
        self.compander.reset();
        self.wow_flutter.reset();
        self.head_bump.reset();
        self.saturation.reset();
        self.hf_loss.reset();
        self.eq.reset();
        self.hiss.reset();
        self.crosstalk.reset();
        self.azimuth.reset();
        self.meters.reset();
    }

    /// Dropout events since construction or the last [`reset`](Self::reset).
    pub fn dropout_count(&self) -> u64 {
        self.dropouts.dropout_count()
    }

    /// Channel count the stages are sized for.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Prepared sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Prepared maximum block size in frames.
    pub fn max_block_frames(&self) -> usize {
        self.config.max_block_frames
    }

    /// Current configuration.
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            channels: self.channels,
            ..self.config
        }
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn prepare_stages(&mut self, channels: usize) {
        let sr = self.config.sample_rate as f32;
        self.channels = channels;

        self.dropouts.prepare(sr, channels);
        self.compander.prepare(sr, channels);
        self.wow_flutter.prepare(sr, channels);
        self.head_bump.prepare(sr, channels);
        self.saturation.prepare(sr, channels);
        self.hf_loss.prepare(sr, channels);
        self.eq.prepare(sr, channels);
        self.hiss.prepare(sr, channels);
        self.crosstalk.prepare(sr, channels);
        self.azimuth.prepare(sr, channels);
        self.meters.prepare(sr, channels);

        if let Some(seed) = self.config.seed {
            self.dropouts.set_seed(seed);
            self.wow_flutter.set_seed(seed);
            self.hiss.set_seed(seed);
            self.azimuth.set_seed(seed);
        }
    }

    fn apply_latest(&mut self) {
        let params = self.slot.load();
        if self.applied != Some(params) {
            self.apply(&params);
            self.applied = Some(params);
        }
    }

    fn apply(&mut self, p: &ParameterSnapshot) {
        self.dropouts.set_rate_per_min(p.dropout_rate_per_min);

        self.compander.set_enabled(p.comp_enabled);
        self.compander.set_threshold_db(p.comp_threshold_db);
        self.compander.set_ratio(p.comp_ratio);
        self.compander.set_attack_ms(p.comp_attack_ms);
        self.compander.set_release_ms(p.comp_release_ms);
        self.compander.set_knee_db(p.comp_knee_db);
        self.compander.set_makeup_db(p.comp_makeup_db);
        for track in 0..TRACK_COUNT {
            self.compander.set_track_bypass(track, p.track_bypass[track]);
        }

        self.wow_flutter.set_wow_depth(p.wow_depth);
        self.wow_flutter.set_flutter_depth(p.flutter_depth);
        self.wow_flutter.set_wow_rate(p.wow_rate_hz);
        self.wow_flutter.set_flutter_rate(p.flutter_rate_hz);

        self.head_bump.set_gain_db(p.head_bump_gain_db);
        self.head_bump.set_frequency(p.head_bump_freq_hz);
        self.head_bump.set_mix(p.head_bump_mix);

        self.saturation.set_drive_db(p.sat_drive_db);
        self.saturation.set_output_db(p.sat_output_db);

        self.hf_loss.set_cutoff_hz(p.lpf_cutoff_hz);

        self.eq.set_settings(EqSettings {
            low_db: p.eq_low_db,
            mid_db: p.eq_mid_db,
            high_db: p.eq_high_db,
            mid_freq_hz: p.eq_mid_freq_hz,
            mid_q: p.eq_mid_q,
        });

        self.hiss.set_level_dbfs(p.hiss_level_dbfs);
        self.hiss.set_tilt(p.hiss_tilt);

        self.crosstalk.set_amount_db(p.crosstalk_db);
        self.azimuth.set_jitter_ms(p.azimuth_jitter_ms);
    }

    fn run_pipeline(&mut self, block: &mut [f32], channels: usize) {
        self.dropouts.process_interleaved(block, channels);
        self.compander.process_interleaved(block, channels);
        self.wow_flutter.process_interleaved(block, channels);
        self.head_bump.process_interleaved(block, channels);
        self.saturation.process_interleaved(block, channels);
        self.hf_loss.process_interleaved(block, channels);
        self.eq.process_interleaved(block, channels);
        self.hiss.process_interleaved(block, channels);
        self.crosstalk.process_interleaved(block, channels);
        self.azimuth.process_interleaved(block, channels);
        self.meters.accumulate(block, channels);
    }
}
