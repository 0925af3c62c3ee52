use std::fmt::Debug;

use crate::State;

/// Index of a wire within its [`Module`](crate::Module).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(pub(crate) usize);

impl WireId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Debug for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "WireId({})", self.0)
    }
}

/// A single bit: either a constant, or one bit of a wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SigBit {
    Const(State),
    Wire(WireId, usize),
}

impl SigBit {
    pub const ZERO: SigBit = SigBit::Const(State::Zero);
    pub const ONE: SigBit = SigBit::Const(State::One);
    pub const UNDEF: SigBit = SigBit::Const(State::Undef);
    pub const HIZ: SigBit = SigBit::Const(State::HiZ);

    pub fn as_const(self) -> Option<State> {
        match self {
            SigBit::Const(state) => Some(state),
            SigBit::Wire(..) => None,
        }
    }

    pub fn wire(self) -> Option<WireId> {
        match self {
            SigBit::Const(_) => None,
            SigBit::Wire(wire, _) => Some(wire),
        }
    }

    pub fn is_const(self) -> bool {
        matches!(self, SigBit::Const(_))
    }
}

impl From<bool> for SigBit {
    fn from(value: bool) -> Self {
        SigBit::Const(State::from(value))
    }
}

impl From<State> for SigBit {
    fn from(value: State) -> Self {
        SigBit::Const(value)
    }
}

/// A clock or enable input together with its active level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlBit {
    Pos(SigBit),
    Neg(SigBit),
}

impl ControlBit {
    pub const ZERO: ControlBit = ControlBit::Pos(SigBit::ZERO);
    pub const ONE: ControlBit = ControlBit::Pos(SigBit::ONE);

    pub fn new(bit: SigBit, positive: bool) -> Self {
        if positive {
            ControlBit::Pos(bit)
        } else {
            ControlBit::Neg(bit)
        }
    }

    pub fn bit(self) -> SigBit {
        match self {
            Self::Pos(bit) => bit,
            Self::Neg(bit) => bit,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Pos(_))
    }

    /// Returns `Some(true)` if the control is constantly active, `Some(false)` if it is constantly
    /// inactive, and `None` otherwise.
    pub fn is_active(self) -> Option<bool> {
        match self {
            Self::Pos(SigBit::Const(State::One)) | Self::Neg(SigBit::Const(State::Zero)) => Some(true),
            Self::Pos(SigBit::Const(State::Zero)) | Self::Neg(SigBit::Const(State::One)) => Some(false),
            _ => None,
        }
    }

    pub fn is_always(self, active: bool) -> bool {
        self.is_active() == Some(active)
    }

    /// Evaluates the control for a given level of its bit.
    pub fn active_for(self, level: State) -> State {
        match self {
            Self::Pos(_) => level,
            Self::Neg(_) => !level,
        }
    }
}

impl From<SigBit> for ControlBit {
    fn from(bit: SigBit) -> Self {
        ControlBit::Pos(bit)
    }
}
