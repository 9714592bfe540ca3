//! PSG Envelope Generator
//!
//! The 16 shape codes of R13 collapse into six behavior classes. Each class is
//! a two-state automaton: the `strobe` bit selects one of three step functions
//! (grow, decay, hold) from a fixed table, and every time the level runs past
//! 0 or 31 the strobe flips and the level is reloaded for the new state.
//!
//! ```text
//! class          strobe=0  strobe=1   shapes
//! DecayHold      decay     hold       0-3, 9, 11
//! AttackHold     grow      hold       4-7, 13, 15
//! SawDown        decay     decay      8
//! SawUp          grow      grow       12
//! TriangleDown   decay     grow       10
//! TriangleUp     grow      decay      14
//! ```

use std::fmt;

/// Highest envelope level
pub const ENVELOPE_MAX: i32 = 31;

/// One step of the envelope automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFn {
    /// Level + 1; past 31 the strobe flips
    Grow,
    /// Level - 1; below 0 the strobe flips
    Decay,
    /// Level unchanged
    Hold,
}

/// Normalized envelope behavior class (the "offset" 0-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeClass {
    /// Fall once, then hold (shapes 0-3, 9, 11)
    DecayHold = 0,
    /// Rise once, then hold (shapes 4-7, 13, 15)
    AttackHold = 1,
    /// Repeating falling sawtooth (shape 8)
    SawDown = 2,
    /// Repeating rising sawtooth (shape 12)
    SawUp = 3,
    /// Triangle starting with a fall (shape 10)
    TriangleDown = 4,
    /// Triangle starting with a rise (shape 14)
    TriangleUp = 5,
}

/// Step function per class, indexed by `[class][strobe]`
const DISPATCH: [[StepFn; 2]; 6] = [
    [StepFn::Decay, StepFn::Hold],
    [StepFn::Grow, StepFn::Hold],
    [StepFn::Decay, StepFn::Decay],
    [StepFn::Grow, StepFn::Grow],
    [StepFn::Decay, StepFn::Grow],
    [StepFn::Grow, StepFn::Decay],
];

impl EnvelopeClass {
    /// All classes in offset order
    pub const ALL: [EnvelopeClass; 6] = [
        EnvelopeClass::DecayHold,
        EnvelopeClass::AttackHold,
        EnvelopeClass::SawDown,
        EnvelopeClass::SawUp,
        EnvelopeClass::TriangleDown,
        EnvelopeClass::TriangleUp,
    ];

    /// Classify a 4-bit shape code into its class and transient level
    ///
    /// The transient is the level a class settles on once its strobe is set.
    /// Values above 15 (including the "unchanged" sentinel) have no class.
    pub fn from_shape(shape: u8) -> Option<(Self, i32)> {
        match shape {
            0x0..=0x3 | 0x9 => Some((EnvelopeClass::DecayHold, 0)),
            0xB => Some((EnvelopeClass::DecayHold, ENVELOPE_MAX)),
            0x4..=0x7 | 0xF => Some((EnvelopeClass::AttackHold, 0)),
            0xD => Some((EnvelopeClass::AttackHold, ENVELOPE_MAX)),
            0x8 => Some((EnvelopeClass::SawDown, ENVELOPE_MAX)),
            0xC => Some((EnvelopeClass::SawUp, 0)),
            0xA => Some((EnvelopeClass::TriangleDown, 0)),
            0xE => Some((EnvelopeClass::TriangleUp, ENVELOPE_MAX)),
            _ => None,
        }
    }

    /// Offset index (0-5)
    pub fn offset(&self) -> usize {
        *self as usize
    }

    /// Single-cycle classes end in a hold state
    pub fn is_one_shot(&self) -> bool {
        matches!(self, EnvelopeClass::DecayHold | EnvelopeClass::AttackHold)
    }

    /// Step function for a strobe state
    #[inline]
    pub fn step_fn(&self, strobe: bool) -> StepFn {
        DISPATCH[self.offset()][strobe as usize]
    }
}

impl fmt::Display for EnvelopeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeClass::DecayHold => write!(f, "Decay-Hold"),
            EnvelopeClass::AttackHold => write!(f, "Attack-Hold"),
            EnvelopeClass::SawDown => write!(f, "Sawtooth-Down"),
            EnvelopeClass::SawUp => write!(f, "Sawtooth-Up"),
            EnvelopeClass::TriangleDown => write!(f, "Triangle-Down"),
            EnvelopeClass::TriangleUp => write!(f, "Triangle-Up"),
        }
    }
}

/// Envelope generator
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeGenerator {
    /// Fractional period counter
    counter: f64,
    /// Period from R11/R12 (16-bit)
    period: u32,
    /// Current class
    class: EnvelopeClass,
    /// Automaton state bit
    strobe: bool,
    /// Current level (0-31)
    step: i32,
    /// Level held once the strobe is set
    transient: i32,
    /// Last shape register value seen by the chip
    store: Option<u8>,
}

impl EnvelopeGenerator {
    /// Create a new envelope generator
    pub fn new() -> Self {
        Self {
            counter: 0.0,
            period: 0,
            class: EnvelopeClass::DecayHold,
            strobe: false,
            step: 0,
            transient: 0,
            store: None,
        }
    }

    /// Set the period from registers R11/R12
    #[inline]
    pub fn set_period(&mut self, period: u32) {
        self.period = period;
    }

    /// Get current period
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Current class
    #[inline]
    pub fn class(&self) -> EnvelopeClass {
        self.class
    }

    /// Current strobe bit
    #[inline]
    pub fn strobe(&self) -> bool {
        self.strobe
    }

    /// Current level (0-31)
    #[inline]
    pub fn level(&self) -> u8 {
        self.step as u8
    }

    /// Change class without restarting
    ///
    /// Shape values with no class keep the current one and return `None`.
    pub fn set_shape(&mut self, shape: u8) -> Option<EnvelopeClass> {
        let (class, transient) = EnvelopeClass::from_shape(shape)?;
        self.class = class;
        self.transient = transient;
        Some(class)
    }

    /// Whether `shape` differs from the last stored shape register value
    #[inline]
    pub fn shape_changed(&self, shape: u8) -> bool {
        self.store != Some(shape)
    }

    /// Remember the shape register value for the next comparison
    #[inline]
    pub fn store_shape(&mut self, shape: u8) {
        self.store = Some(shape);
    }

    /// Restart the envelope from strobe 0
    pub fn restart(&mut self) {
        self.strobe = false;
        self.counter = 0.0;
        self.reset();
    }

    /// Reload the level for the current class and strobe
    fn reset(&mut self) {
        self.step = match self.class {
            EnvelopeClass::DecayHold | EnvelopeClass::TriangleDown => {
                if self.strobe {
                    self.transient
                } else {
                    ENVELOPE_MAX
                }
            }
            EnvelopeClass::AttackHold | EnvelopeClass::TriangleUp => {
                if self.strobe {
                    self.transient
                } else {
                    0
                }
            }
            EnvelopeClass::SawDown => ENVELOPE_MAX,
            EnvelopeClass::SawUp => 0,
        };
    }

    /// Apply one automaton step
    pub fn advance(&mut self) {
        match self.class.step_fn(self.strobe) {
            StepFn::Grow => {
                self.step += 1;
                if self.step > ENVELOPE_MAX {
                    self.strobe = !self.strobe;
                    self.reset();
                }
            }
            StepFn::Decay => {
                self.step -= 1;
                if self.step < 0 {
                    self.strobe = !self.strobe;
                    self.reset();
                }
            }
            StepFn::Hold => {}
        }
    }

    /// Advance by `step` chip clocks, returns the current level
    ///
    /// The automaton steps when the counter reaches the period; the level is
    /// returned on every tick.
    #[inline]
    pub fn tick(&mut self, step: f64) -> u8 {
        self.counter += step;
        if self.counter >= self.period as f64 {
            self.advance();
            self.counter = 0.0;
        }
        self.level()
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(shape: u8) -> EnvelopeGenerator {
        let mut env = EnvelopeGenerator::new();
        env.set_shape(shape);
        env.restart();
        env
    }

    /// Ticks until the strobe flips
    fn ticks_to_flip(env: &mut EnvelopeGenerator) -> usize {
        let strobe = env.strobe();
        let mut ticks = 0;
        while env.strobe() == strobe {
            env.advance();
            ticks += 1;
            assert!(ticks <= 64, "strobe never flipped");
        }
        ticks
    }

    #[test]
    fn test_shape_classification() {
        let expected = [
            (0x0, EnvelopeClass::DecayHold, 0),
            (0x3, EnvelopeClass::DecayHold, 0),
            (0x9, EnvelopeClass::DecayHold, 0),
            (0xB, EnvelopeClass::DecayHold, 31),
            (0x4, EnvelopeClass::AttackHold, 0),
            (0x7, EnvelopeClass::AttackHold, 0),
            (0xF, EnvelopeClass::AttackHold, 0),
            (0xD, EnvelopeClass::AttackHold, 31),
            (0x8, EnvelopeClass::SawDown, 31),
            (0xC, EnvelopeClass::SawUp, 0),
            (0xA, EnvelopeClass::TriangleDown, 0),
            (0xE, EnvelopeClass::TriangleUp, 31),
        ];
        for (shape, class, transient) in expected {
            assert_eq!(
                EnvelopeClass::from_shape(shape),
                Some((class, transient)),
                "shape {shape:#x}"
            );
        }
        assert_eq!(EnvelopeClass::from_shape(0xFF), None);
    }

    #[test]
    fn test_restart_levels() {
        assert_eq!(started(0x0).level(), 31);
        assert_eq!(started(0x4).level(), 0);
        assert_eq!(started(0x8).level(), 31);
        assert_eq!(started(0xC).level(), 0);
        assert_eq!(started(0xA).level(), 31);
        assert_eq!(started(0xE).level(), 0);
    }

    #[test]
    fn test_every_class_reaches_boundary_in_32_ticks() {
        for shape in [0x0u8, 0x4, 0x8, 0xC, 0xA, 0xE] {
            let mut env = started(shape);
            assert_eq!(ticks_to_flip(&mut env), 32, "shape {shape:#x}");
        }
    }

    #[test]
    fn test_decay_hold_settles_on_transient() {
        let mut env = started(0x9);
        ticks_to_flip(&mut env);
        assert!(env.strobe());
        assert_eq!(env.level(), 0);
        for _ in 0..100 {
            env.advance();
        }
        assert_eq!(env.level(), 0);

        let mut env = started(0xB);
        ticks_to_flip(&mut env);
        assert_eq!(env.level(), 31);
        env.advance();
        assert_eq!(env.level(), 31);
    }

    #[test]
    fn test_attack_hold_settles_on_transient() {
        let mut env = started(0xF);
        ticks_to_flip(&mut env);
        assert_eq!(env.level(), 0);

        let mut env = started(0xD);
        ticks_to_flip(&mut env);
        assert_eq!(env.level(), 31);
        env.advance();
        assert_eq!(env.level(), 31);
    }

    #[test]
    fn test_sawtooth_repeats() {
        let mut env = started(0x8);
        for _ in 0..4 {
            assert_eq!(env.level(), 31);
            assert_eq!(ticks_to_flip(&mut env), 32);
        }

        let mut env = started(0xC);
        for _ in 0..4 {
            assert_eq!(env.level(), 0);
            assert_eq!(ticks_to_flip(&mut env), 32);
        }
    }

    #[test]
    fn test_triangles_alternate() {
        let mut env = started(0xA);
        assert_eq!(ticks_to_flip(&mut env), 32);
        assert!(env.strobe());
        assert_eq!(env.level(), 0);
        assert_eq!(ticks_to_flip(&mut env), 32);
        assert!(!env.strobe());
        assert_eq!(env.level(), 31);

        let mut env = started(0xE);
        assert_eq!(ticks_to_flip(&mut env), 32);
        assert_eq!(env.level(), 31);
        assert_eq!(ticks_to_flip(&mut env), 32);
        assert_eq!(env.level(), 0);
    }

    #[test]
    fn test_level_always_in_range() {
        for shape in 0..16u8 {
            let mut env = started(shape);
            for _ in 0..200 {
                env.advance();
                assert!(env.level() <= 31);
            }
        }
    }

    #[test]
    fn test_tick_respects_period() {
        let mut env = started(0x8);
        env.set_period(4);
        assert_eq!(env.tick(1.0), 31);
        assert_eq!(env.tick(1.0), 31);
        assert_eq!(env.tick(1.0), 31);
        assert_eq!(env.tick(1.0), 30);
    }
}
