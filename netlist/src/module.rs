use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{Cell, CellRepr, Const, ControlBit, FlipFlop, Gate, Memory, ParamValue, SigBit, SigSpec, WireId};

/// A named, possibly multi-bit signal in a module, optionally exposed as a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub name: String,
    pub width: usize,
    /// Index of the least significant bit in the source-level numbering.
    pub start_offset: i64,
    /// Position among the module ports, counting from 1; zero if the wire is not a port.
    pub port_id: usize,
    pub port_input: bool,
    pub port_output: bool,
    pub attributes: BTreeMap<String, ParamValue>,
}

impl Wire {
    pub fn is_port(&self) -> bool {
        self.port_input || self.port_output
    }
}

/// A flat namespace of wires, cells, memories, and connections.
///
/// Wires, cells, and memories share one namespace; [`Module::uniquify`] and [`Module::new_id`]
/// produce names that are not yet taken by any of them.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    wires: Vec<Wire>,
    wire_names: BTreeMap<String, WireId>,
    cells: IndexMap<String, Cell>,
    memories: IndexMap<String, Memory>,
    connections: Vec<(SigSpec, SigSpec)>,
    pub attributes: BTreeMap<String, ParamValue>,
    next_auto: usize,
    next_priority: usize,
}

macro_rules! gate_fn {
    () => {};

    ($func:ident( $($arg:ident),+ ) -> $variant:ident; $($rest:tt)*) => {
        pub fn $func(&mut self, $( $arg: SigBit ),+) -> SigBit {
            let y = self.add_auto_wire(1).unwrap_bit();
            let name = self.new_id();
            self.add_cell(name, CellRepr::Gate(Gate::$variant { $( $arg ),+, y }));
            y
        }

        gate_fn!{ $($rest)* }
    };
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            wires: vec![],
            wire_names: BTreeMap::new(),
            cells: IndexMap::new(),
            memories: IndexMap::new(),
            connections: vec![],
            attributes: BTreeMap::new(),
            next_auto: 0,
            next_priority: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.wire_names.contains_key(name) || self.cells.contains_key(name) || self.memories.contains_key(name)
    }

    /// Returns `name` if it is free, or `name` with the smallest numeric suffix that makes it free.
    pub fn uniquify(&self, name: impl Into<String>) -> String {
        let name = name.into();
        if !self.has_name(&name) {
            return name;
        }
        let mut index = 1;
        loop {
            let candidate = format!("{name}_{index}");
            if !self.has_name(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    /// Returns a fresh internal identifier.
    pub fn new_id(&mut self) -> String {
        loop {
            let candidate = format!("$auto${}", self.next_auto);
            self.next_auto += 1;
            if !self.has_name(&candidate) {
                return candidate;
            }
        }
    }

    /// Returns a fresh priority for memory initializers and write ports, increasing in order
    /// of creation.
    pub fn next_priority(&mut self) -> usize {
        self.next_priority += 1;
        self.next_priority
    }

    pub fn add_wire(&mut self, name: impl Into<String>, width: usize) -> WireId {
        let name = name.into();
        assert!(!self.has_name(&name), "name {name:?} is already used in module {:?}", self.name);
        let id = WireId(self.wires.len());
        self.wires.push(Wire {
            name: name.clone(),
            width,
            start_offset: 0,
            port_id: 0,
            port_input: false,
            port_output: false,
            attributes: BTreeMap::new(),
        });
        self.wire_names.insert(name, id);
        id
    }

    /// Adds a wire with an internal name and returns all of its bits.
    pub fn add_auto_wire(&mut self, width: usize) -> SigSpec {
        let name = self.new_id();
        let wire = self.add_wire(name, width);
        SigSpec::wire(wire, width)
    }

    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id.0]
    }

    pub fn wire_mut(&mut self, id: WireId) -> &mut Wire {
        &mut self.wires[id.0]
    }

    pub fn find_wire(&self, name: &str) -> Option<WireId> {
        self.wire_names.get(name).copied()
    }

    pub fn wire_sig(&self, id: WireId) -> SigSpec {
        SigSpec::wire(id, self.wire(id).width)
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> + '_ {
        self.wires.iter().enumerate().map(|(index, wire)| (WireId(index), wire))
    }

    /// Port wires, ordered by port id.
    pub fn ports(&self) -> Vec<WireId> {
        let mut ports: Vec<WireId> = self.wires().filter(|(_, wire)| wire.is_port()).map(|(id, _)| id).collect();
        ports.sort_by_key(|&id| self.wire(id).port_id);
        ports
    }

    /// Renumbers port ids densely from 1.  Wires that already had a port id keep their
    /// relative order and come first; the remaining ports follow in order of name.
    pub fn fixup_ports(&mut self) {
        let mut ports = vec![];
        for (index, wire) in self.wires.iter_mut().enumerate() {
            if wire.is_port() {
                ports.push(index);
            } else {
                wire.port_id = 0;
            }
        }
        ports.sort_by(|&a, &b| {
            let (a, b) = (&self.wires[a], &self.wires[b]);
            match (a.port_id, b.port_id) {
                (0, 0) => a.name.cmp(&b.name),
                (0, _) => std::cmp::Ordering::Greater,
                (_, 0) => std::cmp::Ordering::Less,
                (a_id, b_id) => a_id.cmp(&b_id),
            }
        });
        for (position, index) in ports.into_iter().enumerate() {
            self.wires[index].port_id = position + 1;
        }
    }

    pub fn add_cell(&mut self, name: impl Into<String>, repr: impl Into<Cell>) -> &mut Cell {
        let name = name.into();
        assert!(!self.has_name(&name), "name {name:?} is already used in module {:?}", self.name);
        let cell: Cell = repr.into();
        if cfg!(feature = "trace") {
            eprintln!(">add_cell {} {:?} = {:?}", self.name, name, cell.repr);
        }
        self.cells.entry(name).or_insert(cell)
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    pub fn cell_mut(&mut self, name: &str) -> Option<&mut Cell> {
        self.cells.get_mut(name)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> + '_ {
        self.cells.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn remove_cell(&mut self, name: &str) -> Option<Cell> {
        self.cells.shift_remove(name)
    }

    pub fn add_memory(&mut self, name: impl Into<String>, memory: Memory) {
        let name = name.into();
        assert!(!self.has_name(&name), "name {name:?} is already used in module {:?}", self.name);
        self.memories.insert(name, memory);
    }

    pub fn memory(&self, name: &str) -> Option<&Memory> {
        self.memories.get(name)
    }

    pub fn memories(&self) -> impl Iterator<Item = (&str, &Memory)> + '_ {
        self.memories.iter().map(|(name, memory)| (name.as_str(), memory))
    }

    /// Drives `lhs` from `rhs`.
    pub fn connect(&mut self, lhs: impl Into<SigSpec>, rhs: impl Into<SigSpec>) {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        assert_eq!(lhs.len(), rhs.len(), "connection width mismatch in module {:?}", self.name);
        if cfg!(feature = "trace") {
            eprintln!(">connect {} {:?} <- {:?}", self.name, lhs, rhs);
        }
        self.connections.push((lhs, rhs));
    }

    pub fn connections(&self) -> &[(SigSpec, SigSpec)] {
        &self.connections
    }

    pub fn set_bool_attribute(&mut self, name: impl Into<String>) {
        self.attributes.insert(name.into(), ParamValue::from(true));
    }

    pub fn get_bool_attribute(&self, name: &str) -> bool {
        self.attributes.get(name).and_then(ParamValue::as_const).is_some_and(Const::as_bool)
    }

    gate_fn! {
        not_gate(a) -> Not;
        and_gate(a, b) -> And;
        or_gate(a, b) -> Or;
        xor_gate(a, b) -> Xor;
        mux_gate(a, b, s) -> Mux;
    }

    /// Adds a flip-flop sampling `data` on the given clock edge and returns its output.
    pub fn dff(&mut self, data: impl Into<SigSpec>, clock: ControlBit, init: Option<Const>) -> SigSpec {
        let data = data.into();
        let output = self.add_auto_wire(data.len());
        let mut flip_flop = FlipFlop::new(data, output.clone(), clock);
        if let Some(init) = init {
            flip_flop = flip_flop.with_init(init);
        }
        let name = self.new_id();
        self.add_cell(name, CellRepr::Dff(flip_flop));
        output
    }

    /// Counts cells by kind.
    pub fn statistics(&self) -> BTreeMap<String, usize> {
        let mut result = BTreeMap::new();
        for (_, cell) in self.cells() {
            *result.entry(cell.repr.kind_name().to_owned()).or_default() += 1;
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::Module;
    use crate::{CellRepr, ControlBit, Gate, SigBit};

    #[test]
    fn test_uniquify() {
        let mut module = Module::new("top");
        module.add_wire("a", 1);
        assert_eq!(module.uniquify("a"), "a_1");
        module.add_wire("a_1", 1);
        assert_eq!(module.uniquify("a"), "a_2");
        assert_eq!(module.uniquify("b"), "b");
    }

    #[test]
    fn test_fixup_ports() {
        let mut module = Module::new("top");
        let z = module.add_wire("z", 1);
        module.wire_mut(z).port_input = true;
        let y = module.add_wire("y", 1);
        module.wire_mut(y).port_output = true;
        module.wire_mut(y).port_id = 7;
        let x = module.add_wire("x", 1);
        module.wire_mut(x).port_input = true;
        module.add_wire("internal", 1);
        module.fixup_ports();
        assert_eq!(module.ports(), vec![y, x, z]);
        assert_eq!(module.wire(z).port_id, 3);
    }

    #[test]
    fn test_gate_builders() {
        let mut module = Module::new("top");
        let a = module.add_wire("a", 1);
        let y = module.and_gate(SigBit::Wire(a, 0), SigBit::ONE);
        let q = module.dff(y, ControlBit::Pos(SigBit::Wire(a, 0)), None);
        assert_eq!(q.len(), 1);
        let cells: Vec<_> = module.cells().map(|(_, cell)| cell.repr.clone()).collect();
        assert!(matches!(cells[0], CellRepr::Gate(Gate::And { b: SigBit::ONE, .. })));
        assert!(matches!(cells[1], CellRepr::Dff(_)));
    }
}
