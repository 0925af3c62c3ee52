mod logic;
mod net;
mod value;
mod param;
mod cell;
mod module;
mod design;
mod print;
mod sim;

pub use logic::{Const, State};
pub use net::{ControlBit, SigBit, WireId};
pub use value::{SigMap, SigSpec};
pub use param::ParamValue;
pub use cell::{
    AnyKind, AnyValue, BinaryCell, BinaryOp, Cell, CellRepr, Check, CheckKind, FlipFlop, Gate, Instance, Latch,
    MemInit, MemRead, MemWrite, Memory, MuxCell, SetResetFlipFlop, UnaryCell, UnaryOp,
};
pub use module::{Module, Wire};
pub use design::Design;
pub use sim::Simulator;
