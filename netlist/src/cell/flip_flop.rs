use crate::{Const, ControlBit, SigSpec};

/// An edge-triggered flip-flop with an optional asynchronous clear.
///
/// The output is determined by the following rules:
///
/// - at the beginning of time, the output is set to `init_value`
/// - whenever `clear` is active, the output is set to `clear_value`
/// - whenever `clear` is not active, and an active edge happens on `clock`, the output is set
///   to `data`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlipFlop {
    pub data: SigSpec,
    /// Must have the same width as `data`.
    pub output: SigSpec,
    /// The clock.  The active edge is rising if it is a [`ControlBit::Pos`], and falling if it is
    /// a [`ControlBit::Neg`].
    pub clock: ControlBit,
    /// Asynchronous reset.
    pub clear: ControlBit,

    /// Must have the same width as `data`.
    pub clear_value: Const,
    /// Must have the same width as `data`.
    pub init_value: Const,
}

impl FlipFlop {
    pub fn new(data: impl Into<SigSpec>, output: impl Into<SigSpec>, clock: impl Into<ControlBit>) -> Self {
        let data = data.into();
        let output = output.into();
        assert_eq!(data.len(), output.len());
        let size = data.len();
        FlipFlop {
            data,
            output,
            clock: clock.into(),
            clear: ControlBit::ZERO,
            clear_value: Const::undef(size),
            init_value: Const::undef(size),
        }
    }

    pub fn with_clear_value(self, clear: impl Into<ControlBit>, clear_value: impl Into<Const>) -> Self {
        Self { clear: clear.into(), clear_value: clear_value.into(), ..self }
    }

    pub fn with_init(self, value: impl Into<Const>) -> Self {
        Self { init_value: value.into(), ..self }
    }

    pub fn output_len(&self) -> usize {
        self.data.len()
    }

    pub fn has_clear(&self) -> bool {
        !self.clear.is_always(false)
    }

    pub fn has_init_value(&self) -> bool {
        !self.init_value.is_undef()
    }
}

/// An edge-triggered flip-flop with per-bit asynchronous set and reset, both active high.
/// Reset takes priority over set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetResetFlipFlop {
    pub data: SigSpec,
    pub output: SigSpec,
    pub clock: ControlBit,
    pub set: SigSpec,
    pub reset: SigSpec,
}

/// A level-sensitive latch, transparent while `enable` is active, with optional per-bit
/// asynchronous set and reset (both active high, reset taking priority).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Latch {
    pub data: SigSpec,
    pub output: SigSpec,
    pub enable: ControlBit,
    pub set: SigSpec,
    pub reset: SigSpec,
}

impl Latch {
    pub fn new(data: impl Into<SigSpec>, output: impl Into<SigSpec>, enable: impl Into<ControlBit>) -> Self {
        let data = data.into();
        let size = data.len();
        Latch {
            data,
            output: output.into(),
            enable: enable.into(),
            set: SigSpec::from_const(&Const::zero(size)),
            reset: SigSpec::from_const(&Const::zero(size)),
        }
    }

    pub fn with_set_reset(self, set: impl Into<SigSpec>, reset: impl Into<SigSpec>) -> Self {
        Self { set: set.into(), reset: reset.into(), ..self }
    }

    pub fn has_set_reset(&self) -> bool {
        let inactive = |sig: &SigSpec| sig.as_const().is_some_and(|value| !value.as_bool() && value.is_fully_def());
        !(inactive(&self.set) && inactive(&self.reset))
    }
}
