//! The [`TapeModule`] trait and interleaved-buffer helpers.
//!
//! Every stage of the tape chain processes an interleaved multichannel
//! buffer in place (`sample index = frame * channels + channel`).
//!
//! ## Design Decisions
//!
//! - **Allocation only in `prepare`**: per-channel state and delay lines are
//!   sized there. `process_interleaved` never allocates.
//! - **Static dispatch**: the engine owns each module as a concrete field.
//!   The trait is still object-safe for tests and tooling.
//! - **No error channel**: bad input degrades to silence, passthrough, or a
//!   clamped value. Nothing on the audio path returns `Result`.

/// A stage of the tape chain operating on interleaved audio.
///
/// # Example
///
/// ```rust
/// use cassette_core::TapeModule;
///
/// struct Trim {
///     gain: f32,
/// }
///
/// impl TapeModule for Trim {
///     fn prepare(&mut self, _sample_rate: f32, _channels: usize) {}
///
///     fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
///         let len = cassette_core::module::active_len(buffer.len(), channels);
///         for sample in &mut buffer[..len] {
///             *sample *= self.gain;
///         }
///     }
///
///     fn reset(&mut self) {}
///
///     fn is_neutral(&self) -> bool {
///         self.gain == 1.0
///     }
/// }
///
/// let mut trim = Trim { gain: 0.5 };
/// let mut buffer = [1.0, 1.0, 1.0, 1.0, 1.0];
/// trim.process_interleaved(&mut buffer, 2);
/// assert_eq!(buffer, [0.5, 0.5, 0.5, 0.5, 1.0]);
/// ```
pub trait TapeModule {
    /// Sizes all per-channel state for `channels` at `sample_rate`.
    ///
    /// This is the only place a module may allocate. Calling it again with
    /// different arguments re-sizes and clears state.
    fn prepare(&mut self, sample_rate: f32, channels: usize);

    /// Processes `buffer` in place.
    ///
    /// The frame count is `buffer.len() / channels`; a trailing partial
    /// frame is left untouched. `channels == 0` or an empty buffer is a no-op.
    fn process_interleaved(&mut self, buffer: &mut [f32], channels: usize);

    /// Clears history (filter state, delay lines, envelopes) without
    /// touching parameters.
    fn reset(&mut self);

    /// True when the current settings make this stage an identity.
    fn is_neutral(&self) -> bool;
}

/// Sample rate used when `prepare` receives a non-finite or non-positive rate.
pub const FALLBACK_SAMPLE_RATE: f32 = 48000.0;

/// Returns `sample_rate` if usable, otherwise [`FALLBACK_SAMPLE_RATE`].
#[inline]
pub fn checked_sample_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        sample_rate
    } else {
        FALLBACK_SAMPLE_RATE
    }
}

/// Number of complete frames in a buffer of `len` samples.
#[inline]
pub fn frame_count(len: usize, channels: usize) -> usize {
    if channels == 0 { 0 } else { len / channels }
}

/// Number of samples covered by complete frames.
#[inline]
pub fn active_len(len: usize, channels: usize) -> usize {
    frame_count(len, channels) * channels
}
