use std::{collections::BTreeMap, fmt::Display};

use crate::{CellRepr, ControlBit, Design, Gate, Module, ParamValue, SigBit, SigSpec};

struct DisplayFn<'a, F: for<'b> Fn(&Module, &mut std::fmt::Formatter<'b>) -> std::fmt::Result>(&'a Module, F);

impl<F: Fn(&Module, &mut std::fmt::Formatter) -> std::fmt::Result> Display for DisplayFn<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.1(self.0, f)
    }
}

fn write_string(f: &mut std::fmt::Formatter, str: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for byte in str.as_bytes() {
        if (byte.is_ascii_graphic() || matches!(byte, b' ')) && *byte != b'"' && *byte != b'\\' {
            write!(f, "{}", *byte as char)?;
        } else {
            write!(f, "\\{:02x}", byte)?;
        }
    }
    write!(f, "\"")
}

fn write_attributes(f: &mut std::fmt::Formatter, indent: &str, attributes: &BTreeMap<String, ParamValue>) -> std::fmt::Result {
    for (name, value) in attributes {
        write!(f, "{indent}attribute ")?;
        write_string(f, name)?;
        writeln!(f, " {value}")?;
    }
    Ok(())
}

impl Module {
    fn write_sig(&self, f: &mut std::fmt::Formatter, sig: &SigSpec) -> std::fmt::Result {
        let chunks = sig.chunks();
        if chunks.len() != 1 {
            write!(f, "{{")?;
        }
        for (index, chunk) in chunks.iter().rev().enumerate() {
            if chunks.len() != 1 && index > 0 {
                write!(f, " ")?;
            }
            match chunk[0] {
                SigBit::Const(_) => {
                    let value = chunk.as_const().unwrap_or_default();
                    write!(f, "{}'{}", value.len(), value)?;
                }
                SigBit::Wire(wire, offset) => {
                    let wire = self.wire(wire);
                    write_string(f, &wire.name)?;
                    let start = wire.start_offset + offset as i64;
                    if chunk.len() == 1 && wire.width > 1 {
                        write!(f, " [{start}]")?;
                    } else if chunk.len() != wire.width {
                        write!(f, " [{}:{}]", start + chunk.len() as i64 - 1, start)?;
                    }
                }
            }
        }
        if chunks.len() != 1 {
            write!(f, "}}")?;
        }
        Ok(())
    }

    /// Formats a signal using the names of this module's wires.
    pub fn display_sig<'a>(&'a self, sig: &'a SigSpec) -> impl Display + 'a {
        DisplayFn(self, move |module: &Module, f: &mut std::fmt::Formatter| module.write_sig(f, sig))
    }

    fn write_control(&self, f: &mut std::fmt::Formatter, name: &str, control: ControlBit) -> std::fmt::Result {
        write!(f, "    connect {name} ")?;
        if !control.is_positive() {
            write!(f, "!")?;
        }
        self.write_sig(f, &SigSpec::from(control.bit()))?;
        writeln!(f)
    }

    fn write_port(&self, f: &mut std::fmt::Formatter, name: &str, sig: impl Into<SigSpec>) -> std::fmt::Result {
        write!(f, "    connect {name} ")?;
        self.write_sig(f, &sig.into())?;
        writeln!(f)
    }

    fn write_cell(&self, f: &mut std::fmt::Formatter, repr: &CellRepr) -> std::fmt::Result {
        match repr {
            CellRepr::Gate(gate) => match *gate {
                Gate::Buf { a, y } | Gate::Not { a, y } => {
                    self.write_port(f, "A", a)?;
                    self.write_port(f, "Y", y)?;
                }
                Gate::And { a, b, y } | Gate::Or { a, b, y } | Gate::Xor { a, b, y } | Gate::Xnor { a, b, y } => {
                    self.write_port(f, "A", a)?;
                    self.write_port(f, "B", b)?;
                    self.write_port(f, "Y", y)?;
                }
                Gate::Mux { a, b, s, y } => {
                    self.write_port(f, "A", a)?;
                    self.write_port(f, "B", b)?;
                    self.write_port(f, "S", s)?;
                    self.write_port(f, "Y", y)?;
                }
            },
            CellRepr::Unary(cell) => {
                writeln!(f, "    parameter SIGNED {}", cell.signed as u8)?;
                self.write_port(f, "A", &cell.a)?;
                self.write_port(f, "Y", &cell.y)?;
            }
            CellRepr::Binary(cell) => {
                writeln!(f, "    parameter SIGNED {}", cell.signed as u8)?;
                self.write_port(f, "A", &cell.a)?;
                self.write_port(f, "B", &cell.b)?;
                self.write_port(f, "Y", &cell.y)?;
            }
            CellRepr::Mux(cell) => {
                self.write_port(f, "A", &cell.a)?;
                self.write_port(f, "B", &cell.b)?;
                self.write_port(f, "S", cell.s)?;
                self.write_port(f, "Y", &cell.y)?;
            }
            CellRepr::Dff(flip_flop) => {
                if flip_flop.has_clear() {
                    writeln!(f, "    parameter ARST_VALUE {}", flip_flop.clear_value)?;
                    self.write_control(f, "ARST", flip_flop.clear)?;
                }
                if flip_flop.has_init_value() {
                    writeln!(f, "    parameter INIT {}", flip_flop.init_value)?;
                }
                self.write_control(f, "CLK", flip_flop.clock)?;
                self.write_port(f, "D", &flip_flop.data)?;
                self.write_port(f, "Q", &flip_flop.output)?;
            }
            CellRepr::Dffsr(flip_flop) => {
                self.write_control(f, "CLK", flip_flop.clock)?;
                self.write_port(f, "SET", &flip_flop.set)?;
                self.write_port(f, "CLR", &flip_flop.reset)?;
                self.write_port(f, "D", &flip_flop.data)?;
                self.write_port(f, "Q", &flip_flop.output)?;
            }
            CellRepr::Latch(latch) => {
                self.write_control(f, "EN", latch.enable)?;
                if latch.has_set_reset() {
                    self.write_port(f, "SET", &latch.set)?;
                    self.write_port(f, "CLR", &latch.reset)?;
                }
                self.write_port(f, "D", &latch.data)?;
                self.write_port(f, "Q", &latch.output)?;
            }
            CellRepr::MemRead(port) => {
                write!(f, "    parameter MEMID ")?;
                write_string(f, &port.memory)?;
                writeln!(f)?;
                self.write_port(f, "ADDR", &port.address)?;
                self.write_port(f, "DATA", &port.data)?;
            }
            CellRepr::MemWrite(port) => {
                write!(f, "    parameter MEMID ")?;
                write_string(f, &port.memory)?;
                writeln!(f)?;
                writeln!(f, "    parameter PRIORITY {}", port.priority)?;
                if let Some(clock) = port.clock {
                    self.write_control(f, "CLK", clock)?;
                }
                self.write_port(f, "EN", &port.enable)?;
                self.write_port(f, "ADDR", &port.address)?;
                self.write_port(f, "DATA", &port.data)?;
            }
            CellRepr::MemInit(init) => {
                write!(f, "    parameter MEMID ")?;
                write_string(f, &init.memory)?;
                writeln!(f)?;
                writeln!(f, "    parameter PRIORITY {}", init.priority)?;
                writeln!(f, "    parameter ADDR {}", init.address)?;
                writeln!(f, "    parameter DATA {}'{}", init.data.len(), init.data)?;
            }
            CellRepr::Check(check) => {
                self.write_port(f, "A", check.condition)?;
                self.write_port(f, "EN", check.enable)?;
            }
            CellRepr::AnyValue(any) => {
                self.write_port(f, "Y", &any.output)?;
            }
            CellRepr::Instance(instance) => {
                for (name, value) in &instance.parameters {
                    write!(f, "    parameter ")?;
                    write_string(f, name)?;
                    writeln!(f, " {value}")?;
                }
                for (name, value) in &instance.connections {
                    write!(f, "    connect ")?;
                    write_string(f, name)?;
                    write!(f, " ")?;
                    self.write_sig(f, value)?;
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write_attributes(f, "", &self.attributes)?;
        write!(f, "module ")?;
        write_string(f, self.name())?;
        writeln!(f)?;
        for (_, wire) in self.wires() {
            write_attributes(f, "  ", &wire.attributes)?;
            write!(f, "  wire width {}", wire.width)?;
            if wire.start_offset != 0 {
                write!(f, " offset {}", wire.start_offset)?;
            }
            match (wire.port_input, wire.port_output) {
                (true, true) => write!(f, " inout {}", wire.port_id)?,
                (true, false) => write!(f, " input {}", wire.port_id)?,
                (false, true) => write!(f, " output {}", wire.port_id)?,
                (false, false) => (),
            }
            write!(f, " ")?;
            write_string(f, &wire.name)?;
            writeln!(f)?;
        }
        for (name, memory) in self.memories() {
            write!(f, "  memory width {} size {} ", memory.width, memory.size)?;
            write_string(f, name)?;
            writeln!(f)?;
        }
        for (name, cell) in self.cells() {
            write_attributes(f, "  ", &cell.attributes)?;
            write!(f, "  cell ")?;
            write_string(f, cell.repr.kind_name())?;
            write!(f, " ")?;
            write_string(f, name)?;
            writeln!(f)?;
            self.write_cell(f, &cell.repr)?;
            writeln!(f, "  end")?;
        }
        for (lhs, rhs) in self.connections() {
            write!(f, "  connect ")?;
            self.write_sig(f, lhs)?;
            write!(f, " ")?;
            self.write_sig(f, rhs)?;
            writeln!(f)?;
        }
        writeln!(f, "end")
    }
}

impl Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (index, module) in self.modules().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{module}")?;
        }
        Ok(())
    }
}
