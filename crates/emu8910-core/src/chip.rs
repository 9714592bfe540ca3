//! AY-3-8910 / YM2149 PSG emulation
//!
//! The chip core runs the tone, noise and envelope generators at a fractional
//! chip clock inside an oversampled inner loop. Every iteration of that loop
//! feeds a cubic interpolator per stereo side; the oversampled block is then
//! decimated by a windowed-sinc filter and passed through a DC blocker to give
//! one output sample.
//!
//! ```text
//! registers -> map() -> generators -> mixer -> interpolator (x M)
//!                                               -> FIR decimator -> DC blocker
//! ```

use crate::clock::{FrameScheduler, Oscillator};
use crate::config::{self, ChipConfig};
use crate::dac::DacTable;
use crate::dsp::{BiasFilter, DecimationFilter, Interpolator};
use crate::envelope::EnvelopeGenerator;
use crate::generators::{NoiseChannel, ToneChannel, NUM_CHANNELS};
use crate::mixer::{self, MixerFlags};
use crate::registers::{RegisterFile, ENV_SHAPE_UNCHANGED};
use crate::Result;

/// Left and right output
const SIDES: usize = 2;

/// Host code run once per frame tick
///
/// The routine receives the register file and typically loads the next row
/// of a register dump into it. Any `FnMut(&mut RegisterFile)` closure works.
pub trait FrameRoutine {
    /// Called from inside [`Psg49::step`] when a frame is due
    fn on_frame(&mut self, registers: &mut RegisterFile);
}

impl<F> FrameRoutine for F
where
    F: FnMut(&mut RegisterFile),
{
    fn on_frame(&mut self, registers: &mut RegisterFile) {
        self(registers)
    }
}

/// PSG emulator with built-in resampler
///
/// # Example
///
/// ```
/// use emu8910::{ChipConfig, Psg49, Register};
///
/// let mut chip = Psg49::new(ChipConfig::default()).unwrap();
///
/// // Channel A: period 200, full volume, tone only
/// chip.registers_mut().write(Register::AFine, 200);
/// chip.registers_mut().write(Register::AVolume, 15);
/// chip.registers_mut().write(Register::Mixer, 0b0011_1110);
///
/// let (left, right) = chip.step();
/// assert!(left.is_finite() && right.is_finite());
/// ```
pub struct Psg49 {
    config: ChipConfig,

    // Register state
    registers: RegisterFile,

    // Generators
    tones: [ToneChannel; NUM_CHANNELS],
    noise: NoiseChannel,
    envelope: EnvelopeGenerator,
    dac: DacTable,

    // Clock domains
    clock: Oscillator,
    frames: FrameScheduler,
    routine: Option<Box<dyn FrameRoutine + Send>>,

    // Resampler, one per side
    interpolators: [Interpolator; SIDES],
    fir: [DecimationFilter; SIDES],
    bias: [BiasFilter; SIDES],
    oversampled: [Box<[f32]>; SIDES],
}

impl Psg49 {
    /// Create a chip from a configuration
    ///
    /// Everything the real-time path needs is allocated here; `step` itself
    /// never allocates.
    pub fn new(config: ChipConfig) -> Result<Self> {
        config.validate()?;

        let kernel = config.fir_design().kernel()?;
        let oversample = config.oversample;
        let fir = DecimationFilter::new(kernel, oversample)?;
        let bias = BiasFilter::new(config.bias_window, config.bias_attenuation)?;

        let mut tones: [ToneChannel; NUM_CHANNELS] = Default::default();
        for (tone, pan) in tones.iter_mut().zip(config.pan) {
            tone.set_pan(pan);
        }

        tracing::debug!(
            clock = config.clock_frequency,
            rate = config.output_sample_rate,
            frame = config.frame_frequency,
            oversample,
            taps = config.fir_taps,
            "PSG core initialized"
        );

        Ok(Self {
            registers: RegisterFile::new(),
            tones,
            noise: NoiseChannel::new(),
            envelope: EnvelopeGenerator::new(),
            dac: DacTable::new(config.dac_decay, config.dac_shift),
            clock: Oscillator::new(config.clock_frequency, config.clock_scale),
            frames: FrameScheduler::new(config.frame_frequency),
            routine: None,
            interpolators: [Interpolator::new(), Interpolator::new()],
            fir: [fir.clone(), fir],
            bias: [bias.clone(), bias],
            oversampled: [
                vec![0.0; oversample].into_boxed_slice(),
                vec![0.0; oversample].into_boxed_slice(),
            ],
            config,
        })
    }

    /// Configuration the chip was built from, with later runtime changes
    pub fn config(&self) -> &ChipConfig {
        &self.config
    }

    /// Register file
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Register file, for direct writes between samples
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Install the frame routine, replacing any previous one
    pub fn set_frame_routine<R>(&mut self, routine: R)
    where
        R: FrameRoutine + Send + 'static,
    {
        self.routine = Some(Box::new(routine));
    }

    /// Remove the frame routine; frames still tick but do nothing
    pub fn clear_frame_routine(&mut self) {
        self.routine = None;
    }

    /// Whether a frame routine is installed
    pub fn has_frame_routine(&self) -> bool {
        self.routine.is_some()
    }

    /// Set the stereo position of a channel (0 = left, 1 = right)
    ///
    /// Out-of-range channels and non-finite values are ignored. The value is
    /// stored as given and clamped to `[0.1, 0.9]` at mix time.
    pub fn set_pan(&mut self, channel: usize, pan: f32) {
        if !pan.is_finite() {
            tracing::warn!(channel, pan, "ignoring non-finite pan");
            return;
        }
        if let Some(tone) = self.tones.get_mut(channel) {
            tone.set_pan(pan);
            self.config.pan[channel] = pan;
        }
    }

    /// Stereo position of a channel
    pub fn pan(&self, channel: usize) -> Option<f32> {
        self.tones.get(channel).map(ToneChannel::pan)
    }

    /// Change the chip clock; takes effect on the next sample
    ///
    /// Rejects the same values construction does, leaving the clock as it was.
    pub fn set_clock_frequency(&mut self, hz: f64) -> Result<()> {
        config::positive("clock_frequency", hz)?;
        self.clock.set_frequency(hz);
        self.config.clock_frequency = hz;
        Ok(())
    }

    /// Change the frame rate; takes effect on the next sample
    pub fn set_frame_frequency(&mut self, hz: f64) -> Result<()> {
        config::frame_rate(hz)?;
        self.frames.set_frequency(hz);
        self.config.frame_frequency = hz;
        Ok(())
    }

    /// Chip clock in Hz
    pub fn clock_frequency(&self) -> f64 {
        self.clock.frequency()
    }

    /// Frame rate in Hz
    pub fn frame_frequency(&self) -> f64 {
        self.frames.frequency()
    }

    /// Output sample rate in Hz
    pub fn output_sample_rate(&self) -> f64 {
        self.config.output_sample_rate
    }

    /// Current envelope level (0-31)
    pub fn envelope_level(&self) -> u8 {
        self.envelope.level()
    }

    /// Envelope generator state
    pub fn envelope(&self) -> &EnvelopeGenerator {
        &self.envelope
    }

    /// Effective tone periods of channels A, B, C
    pub fn channel_periods(&self) -> [u32; NUM_CHANNELS] {
        std::array::from_fn(|i| self.tones[i].period())
    }

    /// Tone channel state
    pub fn tones(&self) -> &[ToneChannel; NUM_CHANNELS] {
        &self.tones
    }

    /// Noise generator state
    pub fn noise(&self) -> &NoiseChannel {
        &self.noise
    }

    /// Push the register file into the generators
    ///
    /// Masks the registers first, then derives periods, amplitudes, mixer
    /// gates and the envelope class. A one-shot envelope shape is replaced by
    /// the "unchanged" sentinel once latched, so rewriting the same shape
    /// value later restarts the envelope.
    pub fn map(&mut self) {
        self.registers.clamp();

        let flags = MixerFlags::from_register(self.registers.mixer());
        for (i, tone) in self.tones.iter_mut().enumerate() {
            tone.set_period(self.registers.tone_period(i));
            tone.set_amplitude(self.registers.volume(i));
            tone.set_mixer_gates(flags.tone_off(i), flags.noise_off(i));
        }

        // Noise counts at half the tone rate
        self.noise.set_period(self.registers.noise_period() << 1);
        self.envelope.set_period(self.registers.envelope_period());

        let shape = self.registers.envelope_shape();
        if let Some(class) = self.envelope.set_shape(shape) {
            if class.is_one_shot() {
                self.registers.set_envelope_shape(ENV_SHAPE_UNCHANGED);
            }
        }
        if self.envelope.shape_changed(shape) {
            self.envelope.restart();
        }
        self.envelope.store_shape(self.registers.envelope_shape());
    }

    /// Tick every generator once and mix the result
    ///
    /// Returns the raw, unfiltered stereo pair.
    #[inline]
    pub fn step_mixer(&mut self) -> (f32, f32) {
        let step = self.clock.step();
        let noise = self.noise.tick(step);
        let level = self.envelope.tick(step);
        let tone_bits = std::array::from_fn(|i| self.tones[i].tick(step));

        mixer::mix(&self.tones, tone_bits, noise, level, &self.dac)
    }

    /// Produce one stereo output sample
    ///
    /// Runs the installed frame routine when a frame is due.
    pub fn step(&mut self) -> (f32, f32) {
        let mut routine = self.routine.take();
        let sample = self.advance(routine.as_deref_mut().map(|r| r as &mut dyn FrameRoutine));
        self.routine = routine;
        sample
    }

    /// Produce one stereo output sample, using `routine` for this sample's
    /// frame tick instead of the installed one
    pub fn step_with(&mut self, routine: &mut dyn FrameRoutine) -> (f32, f32) {
        self.advance(Some(routine))
    }

    /// Fill an interleaved stereo buffer (`[l, r, l, r, ...]`)
    ///
    /// A trailing odd element is left untouched.
    pub fn render(&mut self, out: &mut [f32]) {
        for frame in out.chunks_exact_mut(SIDES) {
            let (left, right) = self.step();
            frame[0] = left;
            frame[1] = right;
        }
    }

    /// [`Psg49::render`] driven by a borrowed frame routine
    pub fn render_with(&mut self, out: &mut [f32], routine: &mut dyn FrameRoutine) {
        for frame in out.chunks_exact_mut(SIDES) {
            let (left, right) = self.advance(Some(&mut *routine));
            frame[0] = left;
            frame[1] = right;
        }
    }

    fn advance(&mut self, routine: Option<&mut dyn FrameRoutine>) -> (f32, f32) {
        let output_rate = self.config.output_sample_rate;
        let advance = self.clock.prepare(output_rate, self.config.oversample);

        if self.frames.advance(output_rate) {
            if let Some(routine) = routine {
                routine.on_frame(&mut self.registers);
            }
        }

        let phase = self.config.interpolation_phase;
        for i in 0..self.config.oversample {
            if self.clock.advance(advance) {
                self.map();
                let (left, right) = self.step_mixer();
                self.interpolators[0].push(left);
                self.interpolators[1].push(right);
            }
            self.oversampled[0][i] = self.interpolators[0].cubic(phase);
            self.oversampled[1][i] = self.interpolators[1].cubic(phase);
        }

        let left = self.fir[0].process(&self.oversampled[0]);
        let right = self.fir[1].process(&self.oversampled[1]);

        (self.bias[0].step(left), self.bias[1].step(right))
    }
}

impl std::fmt::Debug for Psg49 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Psg49")
            .field("registers", &self.registers)
            .field("tones", &self.tones)
            .field("noise", &self.noise)
            .field("envelope", &self.envelope)
            .field("clock", &self.clock)
            .field("frames", &self.frames)
            .field("has_routine", &self.routine.is_some())
            .finish_non_exhaustive()
    }
}
