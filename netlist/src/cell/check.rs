use crate::{SigBit, SigSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckKind {
    Assert,
    Assume,
    Cover,
}

/// A formal constraint.  In every cycle where `enable` is high, `condition` must hold
/// (for assertions and assumptions), or is reported when it holds (for covers).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Check {
    pub kind: CheckKind,
    pub condition: SigBit,
    pub enable: SigBit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnyKind {
    /// An unconstrained value that stays the same for the whole run.
    Const,
    /// An unconstrained value that may change every cycle.
    Seq,
}

/// A free value generator, used to model unconstrained inputs in formal flows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyValue {
    pub kind: AnyKind,
    pub output: SigSpec,
}
