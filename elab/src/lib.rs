//! In-memory model of an elaborated design, as handed over by an HDL elaborator: netlists of
//! single-bit nets, ports and instances of primitives, operators, and other netlists.

mod kind;
mod database;
mod json;

pub use kind::{Direction, PrimitiveKind, Role};
pub use database::{
    Database, IndexRange, Instance, InstanceId, LineFile, Net, NetBus, NetBusId, NetId, Netlist, NetlistId, NetlistKind,
    Port, PortBus, PortBusId, PortId, RamInfo, Terminal,
};
pub use json::{load_json, LoadError, SyntaxError};
