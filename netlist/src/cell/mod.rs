use std::collections::BTreeMap;

use crate::{ParamValue, SigBit, SigSpec};

mod check;
mod flip_flop;
mod instance;
mod memory;

pub use check::{AnyKind, AnyValue, Check, CheckKind};
pub use flip_flop::{FlipFlop, Latch, SetResetFlipFlop};
pub use instance::Instance;
pub use memory::{MemInit, MemRead, MemWrite, Memory};

/// A single-bit logic gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Gate {
    Buf { a: SigBit, y: SigBit },
    Not { a: SigBit, y: SigBit },
    And { a: SigBit, b: SigBit, y: SigBit },
    Or { a: SigBit, b: SigBit, y: SigBit },
    Xor { a: SigBit, b: SigBit, y: SigBit },
    Xnor { a: SigBit, b: SigBit, y: SigBit },
    /// `y = s ? b : a`
    Mux { a: SigBit, b: SigBit, s: SigBit, y: SigBit },
}

impl Gate {
    pub fn output(&self) -> SigBit {
        match *self {
            Gate::Buf { y, .. }
            | Gate::Not { y, .. }
            | Gate::And { y, .. }
            | Gate::Or { y, .. }
            | Gate::Xor { y, .. }
            | Gate::Xnor { y, .. }
            | Gate::Mux { y, .. } => y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Pos,
    Neg,
    ReduceAnd,
    ReduceOr,
    ReduceXor,
    ReduceXnor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Xnor,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Sshr,
    Lt,
    Le,
    Eq,
    Ne,
}

/// A word-level operation on one operand. Operands are extended to the output width
/// (sign-extended if `signed`) before the operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnaryCell {
    pub op: UnaryOp,
    pub signed: bool,
    pub a: SigSpec,
    pub y: SigSpec,
}

/// A word-level operation on two operands.
///
/// Comparisons produce a single result bit, zero-extended to the output width. Shift amounts
/// are always unsigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryCell {
    pub op: BinaryOp,
    pub signed: bool,
    pub a: SigSpec,
    pub b: SigSpec,
    pub y: SigSpec,
}

/// A word-level multiplexer, `y = s ? b : a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MuxCell {
    pub a: SigSpec,
    pub b: SigSpec,
    pub s: SigBit,
    pub y: SigSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellRepr {
    Gate(Gate),
    Unary(UnaryCell),
    Binary(BinaryCell),
    Mux(MuxCell),

    Dff(FlipFlop),
    Dffsr(SetResetFlipFlop),
    Latch(Latch),

    MemRead(MemRead),
    MemWrite(MemWrite),
    MemInit(MemInit),

    Check(Check),
    AnyValue(AnyValue),

    Instance(Instance),
}

impl CellRepr {
    /// A short name for the kind of this cell, as used in textual dumps.
    pub fn kind_name(&self) -> &str {
        match self {
            CellRepr::Gate(gate) => match gate {
                Gate::Buf { .. } => "$_BUF_",
                Gate::Not { .. } => "$_NOT_",
                Gate::And { .. } => "$_AND_",
                Gate::Or { .. } => "$_OR_",
                Gate::Xor { .. } => "$_XOR_",
                Gate::Xnor { .. } => "$_XNOR_",
                Gate::Mux { .. } => "$_MUX_",
            },
            CellRepr::Unary(cell) => match cell.op {
                UnaryOp::Not => "$not",
                UnaryOp::Pos => "$pos",
                UnaryOp::Neg => "$neg",
                UnaryOp::ReduceAnd => "$reduce_and",
                UnaryOp::ReduceOr => "$reduce_or",
                UnaryOp::ReduceXor => "$reduce_xor",
                UnaryOp::ReduceXnor => "$reduce_xnor",
            },
            CellRepr::Binary(cell) => match cell.op {
                BinaryOp::And => "$and",
                BinaryOp::Or => "$or",
                BinaryOp::Xor => "$xor",
                BinaryOp::Xnor => "$xnor",
                BinaryOp::Add => "$add",
                BinaryOp::Sub => "$sub",
                BinaryOp::Mul => "$mul",
                BinaryOp::Div => "$div",
                BinaryOp::Mod => "$mod",
                BinaryOp::Shl => "$shl",
                BinaryOp::Shr => "$shr",
                BinaryOp::Sshr => "$sshr",
                BinaryOp::Lt => "$lt",
                BinaryOp::Le => "$le",
                BinaryOp::Eq => "$eq",
                BinaryOp::Ne => "$ne",
            },
            CellRepr::Mux(_) => "$mux",
            CellRepr::Dff(flip_flop) => {
                if flip_flop.has_clear() {
                    "$adff"
                } else {
                    "$dff"
                }
            }
            CellRepr::Dffsr(_) => "$dffsr",
            CellRepr::Latch(latch) => {
                if latch.has_set_reset() {
                    "$dlatchsr"
                } else {
                    "$dlatch"
                }
            }
            CellRepr::MemRead(_) => "$memrd",
            CellRepr::MemWrite(_) => "$memwr",
            CellRepr::MemInit(_) => "$meminit",
            CellRepr::Check(check) => match check.kind {
                CheckKind::Assert => "$assert",
                CheckKind::Assume => "$assume",
                CheckKind::Cover => "$cover",
            },
            CellRepr::AnyValue(any) => match any.kind {
                AnyKind::Const => "$anyconst",
                AnyKind::Seq => "$anyseq",
            },
            CellRepr::Instance(instance) => &instance.module,
        }
    }

    /// Bits driven by this cell. Hierarchical instances drive nothing the module can see.
    pub fn output(&self) -> SigSpec {
        match self {
            CellRepr::Gate(gate) => SigSpec::from(gate.output()),
            CellRepr::Unary(cell) => cell.y.clone(),
            CellRepr::Binary(cell) => cell.y.clone(),
            CellRepr::Mux(cell) => cell.y.clone(),
            CellRepr::Dff(flip_flop) => flip_flop.output.clone(),
            CellRepr::Dffsr(flip_flop) => flip_flop.output.clone(),
            CellRepr::Latch(latch) => latch.output.clone(),
            CellRepr::MemRead(port) => port.data.clone(),
            CellRepr::AnyValue(any) => any.output.clone(),
            CellRepr::MemWrite(_) | CellRepr::MemInit(_) | CellRepr::Check(_) | CellRepr::Instance(_) => {
                SigSpec::new()
            }
        }
    }
}

/// A cell placed in a module: its function and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub repr: CellRepr,
    pub attributes: BTreeMap<String, ParamValue>,
}

impl Cell {
    pub fn new(repr: CellRepr) -> Self {
        Cell { repr, attributes: BTreeMap::new() }
    }
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Self {
        Cell::new(repr)
    }
}
