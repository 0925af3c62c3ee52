use crate::{Const, ControlBit, SigSpec};

/// A memory array of `size` words, each of them `width` bits wide.
///
/// The array itself holds no connections; it is accessed through [`MemRead`] and [`MemWrite`]
/// cells, and initialized by [`MemInit`] cells, all of which refer to it by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Memory {
    pub width: usize,
    pub size: usize,
}

/// An asynchronous memory read port.
///
/// Reading an out-of-bounds or undefined address results in an undefined value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemRead {
    pub memory: String,
    pub address: SigSpec,
    /// Must be as wide as the memory.
    pub data: SigSpec,
}

/// A memory write port.
///
/// A clocked port writes on the active edge of `clock`; a port without a clock is written
/// continuously.  `enable` is a per-bit write mask.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemWrite {
    pub memory: String,
    pub clock: Option<ControlBit>,
    /// Must have the same width as `data`.
    pub enable: SigSpec,
    pub address: SigSpec,
    pub data: SigSpec,
    pub priority: usize,
}

/// Initial contents of one memory word.  When several records cover the same word, the one
/// with the highest `priority` wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemInit {
    pub memory: String,
    pub address: usize,
    pub data: Const,
    pub priority: usize,
}
