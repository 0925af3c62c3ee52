use std::collections::{BTreeMap, HashMap};

use crate::{
    BinaryCell, BinaryOp, CellRepr, CheckKind, Const, ControlBit, Gate, Module, SigBit, SigSpec, State, UnaryCell,
    UnaryOp,
};

/// Cycle-level simulator for a single module, used to observe the behavior of imported logic.
///
/// Values are four-state, with `Z` treated as `X` by all logic.  Hierarchical instances and free
/// value generators are opaque and drive nothing.  Edge-triggered elements fire when the settled
/// value of their clock input changes from `0` to `1` (or `1` to `0` for negative edges) between
/// two calls to [`Simulator::settle`] or within one call.
pub struct Simulator<'a> {
    module: &'a Module,
    values: HashMap<SigBit, State>,
    state: BTreeMap<String, Const>,
    clocks: BTreeMap<String, State>,
    memories: BTreeMap<String, Vec<Const>>,
}

const MAX_PASSES: usize = 1000;

impl<'a> Simulator<'a> {
    pub fn new(module: &'a Module) -> Self {
        let mut sim = Simulator {
            module,
            values: HashMap::new(),
            state: BTreeMap::new(),
            clocks: BTreeMap::new(),
            memories: BTreeMap::new(),
        };
        for (name, cell) in module.cells() {
            let (output, init) = match &cell.repr {
                CellRepr::Dff(flip_flop) => (&flip_flop.output, flip_flop.init_value.clone()),
                CellRepr::Dffsr(flip_flop) => (&flip_flop.output, Const::undef(flip_flop.output.len())),
                CellRepr::Latch(latch) => (&latch.output, Const::undef(latch.output.len())),
                _ => continue,
            };
            let init = output
                .iter()
                .zip(init.iter())
                .map(|(bit, state)| if state == State::Undef { sim.wire_init(bit) } else { state })
                .collect();
            sim.state.insert(name.to_owned(), init);
        }
        for (name, memory) in module.memories() {
            sim.memories.insert(name.to_owned(), vec![Const::undef(memory.width); memory.size]);
        }
        let mut inits: Vec<_> = module
            .cells()
            .filter_map(|(_, cell)| match &cell.repr {
                CellRepr::MemInit(init) => Some(init),
                _ => None,
            })
            .collect();
        inits.sort_by_key(|init| init.priority);
        for init in inits {
            if let Some(word) = sim.memories.get_mut(&init.memory).and_then(|words| words.get_mut(init.address)) {
                *word = init.data.clone();
            }
        }
        sim
    }

    fn wire_init(&self, bit: SigBit) -> State {
        let SigBit::Wire(wire, offset) = bit else { return State::Undef };
        match self.module.wire(wire).attributes.get("init").and_then(|value| value.as_const()) {
            Some(init) if offset < init.len() => init[offset],
            _ => State::Undef,
        }
    }

    fn bit(&self, bit: SigBit) -> State {
        match bit {
            SigBit::Const(state) => state,
            SigBit::Wire(..) => self.values.get(&bit).copied().unwrap_or(State::Undef),
        }
    }

    pub fn get(&self, sig: &SigSpec) -> Const {
        sig.iter().map(|bit| self.bit(bit)).collect()
    }

    /// Returns the value of the wire called `name`.
    pub fn get_wire(&self, name: &str) -> Const {
        let wire = self.module.find_wire(name).unwrap_or_else(|| panic!("no wire {name:?}"));
        self.get(&self.module.wire_sig(wire))
    }

    /// Drives the wire called `name`, which should be a module input.
    pub fn set(&mut self, name: &str, value: impl Into<Const>) {
        let value = value.into();
        let wire = self.module.find_wire(name).unwrap_or_else(|| panic!("no wire {name:?}"));
        let sig = self.module.wire_sig(wire);
        assert_eq!(sig.len(), value.len(), "width mismatch driving {name:?}");
        self.write(&sig, &value);
    }

    fn write(&mut self, sig: &SigSpec, value: &Const) -> bool {
        let mut changed = false;
        for (bit, state) in sig.iter().zip(value.iter()) {
            if bit.is_const() {
                continue;
            }
            if self.values.insert(bit, state) != Some(state) {
                changed = true;
            }
        }
        changed
    }

    fn control(&self, control: ControlBit) -> State {
        control.active_for(self.bit(control.bit()))
    }

    /// Propagates values through connections and combinational cells, then fires edge-triggered
    /// elements, until nothing changes.
    pub fn settle(&mut self) {
        loop {
            self.propagate();
            if !self.fire_edges() {
                break;
            }
        }
    }

    fn propagate(&mut self) {
        let module = self.module;
        for _ in 0..MAX_PASSES {
            let mut changed = false;
            for (lhs, rhs) in module.connections() {
                let value = self.get(rhs);
                changed |= self.write(lhs, &value);
            }
            for (name, cell) in module.cells() {
                changed |= self.eval_cell(name, &cell.repr);
            }
            if !changed {
                return;
            }
        }
    }

    fn eval_cell(&mut self, name: &str, repr: &CellRepr) -> bool {
        match repr {
            CellRepr::Gate(gate) => {
                let value = match *gate {
                    Gate::Buf { a, .. } => self.bit(a),
                    Gate::Not { a, .. } => !self.bit(a),
                    Gate::And { a, b, .. } => self.bit(a) & self.bit(b),
                    Gate::Or { a, b, .. } => self.bit(a) | self.bit(b),
                    Gate::Xor { a, b, .. } => self.bit(a) ^ self.bit(b),
                    Gate::Xnor { a, b, .. } => !(self.bit(a) ^ self.bit(b)),
                    Gate::Mux { a, b, s, .. } => self.bit(s).mux(self.bit(a), self.bit(b)),
                };
                self.write(&SigSpec::from(gate.output()), &Const::from(value))
            }
            CellRepr::Unary(cell) => {
                let value = eval_unary(cell, &self.get(&cell.a));
                self.write(&cell.y, &value)
            }
            CellRepr::Binary(cell) => {
                let value = eval_binary(cell, &self.get(&cell.a), &self.get(&cell.b));
                self.write(&cell.y, &value)
            }
            CellRepr::Mux(cell) => {
                let s = self.bit(cell.s);
                let (a, b) = (self.get(&cell.a), self.get(&cell.b));
                let value = a.iter().zip(b.iter()).map(|(a, b)| s.mux(a, b)).collect();
                self.write(&cell.y, &value)
            }
            CellRepr::Dff(flip_flop) => {
                if self.control(flip_flop.clear) == State::One {
                    self.state.insert(name.to_owned(), flip_flop.clear_value.clone());
                }
                let value = self.state[name].clone();
                self.write(&flip_flop.output, &value)
            }
            CellRepr::Dffsr(flip_flop) => {
                let (set, reset) = (self.get(&flip_flop.set), self.get(&flip_flop.reset));
                let value = self.apply_set_reset(name, &set, &reset);
                self.write(&flip_flop.output, &value)
            }
            CellRepr::Latch(latch) => {
                if self.control(latch.enable) == State::One {
                    let data = self.get(&latch.data);
                    self.state.insert(name.to_owned(), data);
                }
                let (set, reset) = (self.get(&latch.set), self.get(&latch.reset));
                let value = self.apply_set_reset(name, &set, &reset);
                self.write(&latch.output, &value)
            }
            CellRepr::MemRead(port) => {
                let value = match self.get(&port.address).as_uint() {
                    Some(address) => self.memories[&port.memory]
                        .get(address as usize)
                        .cloned()
                        .unwrap_or_else(|| Const::undef(port.data.len())),
                    None => Const::undef(port.data.len()),
                };
                self.write(&port.data, &value)
            }
            CellRepr::MemWrite(port) if port.clock.is_none() => {
                let (address, data, enable) = (self.get(&port.address), self.get(&port.data), self.get(&port.enable));
                self.write_memory(&port.memory, &address, &data, &enable)
            }
            CellRepr::MemWrite(_)
            | CellRepr::MemInit(_)
            | CellRepr::Check(_)
            | CellRepr::AnyValue(_)
            | CellRepr::Instance(_) => false,
        }
    }

    fn apply_set_reset(&mut self, name: &str, set: &Const, reset: &Const) -> Const {
        let state = self.state.get_mut(name).unwrap();
        for index in 0..state.len() {
            if reset[index] == State::One {
                state[index] = State::Zero;
            } else if set[index] == State::One {
                state[index] = State::One;
            }
        }
        state.clone()
    }

    fn write_memory(&mut self, memory: &str, address: &Const, data: &Const, enable: &Const) -> bool {
        let Some(address) = address.as_uint() else { return false };
        let Some(word) = self.memories.get_mut(memory).and_then(|words| words.get_mut(address as usize)) else {
            return false;
        };
        let mut changed = false;
        for index in 0..word.len() {
            if enable[index] == State::One && word[index] != data[index] {
                word[index] = data[index];
                changed = true;
            }
        }
        changed
    }

    fn edge(&mut self, name: &str, clock: ControlBit) -> bool {
        let level = self.bit(clock.bit());
        let previous = self.clocks.insert(name.to_owned(), level);
        match (previous, clock) {
            (Some(State::Zero), ControlBit::Pos(_)) => level == State::One,
            (Some(State::One), ControlBit::Neg(_)) => level == State::Zero,
            _ => false,
        }
    }

    fn fire_edges(&mut self) -> bool {
        let module = self.module;
        let mut updates = vec![];
        let mut writes = vec![];
        for (name, cell) in module.cells() {
            match &cell.repr {
                CellRepr::Dff(flip_flop) => {
                    if self.edge(name, flip_flop.clock) && self.control(flip_flop.clear) != State::One {
                        updates.push((name, self.get(&flip_flop.data)));
                    }
                }
                CellRepr::Dffsr(flip_flop) => {
                    if self.edge(name, flip_flop.clock) {
                        updates.push((name, self.get(&flip_flop.data)));
                    }
                }
                CellRepr::MemWrite(port) => {
                    if let Some(clock) = port.clock {
                        if self.edge(name, clock) {
                            writes.push((
                                &port.memory,
                                self.get(&port.address),
                                self.get(&port.data),
                                self.get(&port.enable),
                            ));
                        }
                    }
                }
                _ => (),
            }
        }
        let fired = !updates.is_empty() || !writes.is_empty();
        for (name, value) in updates {
            self.state.insert(name.to_owned(), value);
        }
        for (memory, address, data, enable) in writes {
            self.write_memory(memory, &address, &data, &enable);
        }
        fired
    }

    fn checks(&self, kinds: &[CheckKind], fired: impl Fn(State, State) -> bool) -> Vec<&'a str> {
        let module = self.module;
        module
            .cells()
            .filter_map(|(name, cell)| match &cell.repr {
                CellRepr::Check(check) if kinds.contains(&check.kind) => {
                    fired(self.bit(check.condition), self.bit(check.enable)).then_some(name)
                }
                _ => None,
            })
            .collect()
    }

    /// Names of assertions and assumptions that are enabled but do not hold in the current state.
    pub fn failed_checks(&self) -> Vec<&'a str> {
        self.checks(&[CheckKind::Assert, CheckKind::Assume], |condition, enable| {
            enable == State::One && condition != State::One
        })
    }

    /// Names of covers that are enabled and hit in the current state.
    pub fn hit_covers(&self) -> Vec<&'a str> {
        self.checks(&[CheckKind::Cover], |condition, enable| enable == State::One && condition == State::One)
    }
}

fn signed_value(value: &Const, signed: bool) -> Option<i128> {
    if value.len() > 120 {
        return None;
    }
    let uint = value.as_uint()? as i128;
    if signed && value.len() > 0 && value[value.len() - 1] == State::One {
        Some(uint - (1i128 << value.len()))
    } else {
        Some(uint)
    }
}

fn from_signed(value: Option<i128>, width: usize) -> Const {
    match value {
        Some(value) => (0..width).map(|index| State::from((value >> index.min(127)) & 1 != 0)).collect(),
        None => Const::undef(width),
    }
}

fn eval_unary(cell: &UnaryCell, a: &Const) -> Const {
    let width = cell.y.len();
    let a_ext = a.extend(width, cell.signed);
    let reduce = |value: Option<State>| Const::from(value.unwrap_or(State::Undef)).extend(width, false);
    match cell.op {
        UnaryOp::Not => a_ext.iter().map(|state| !state).collect(),
        UnaryOp::Pos => a_ext,
        UnaryOp::Neg => from_signed(signed_value(&a_ext, true).map(|value| -value), width),
        UnaryOp::ReduceAnd => reduce(Some(a.iter().fold(State::One, |acc, state| acc & state))),
        UnaryOp::ReduceOr => reduce(Some(a.iter().fold(State::Zero, |acc, state| acc | state))),
        UnaryOp::ReduceXor => reduce(Some(a.iter().fold(State::Zero, |acc, state| acc ^ state))),
        UnaryOp::ReduceXnor => reduce(Some(!a.iter().fold(State::Zero, |acc, state| acc ^ state))),
    }
}

fn eval_binary(cell: &BinaryCell, a: &Const, b: &Const) -> Const {
    let width = cell.y.len();
    let signed = cell.signed;
    let bitwise = |f: fn(State, State) -> State| -> Const {
        let (a, b) = (a.extend(width, signed), b.extend(width, signed));
        a.iter().zip(b.iter()).map(|(a, b)| f(a, b)).collect()
    };
    let arith = |f: fn(i128, i128) -> Option<i128>| -> Const {
        let value = signed_value(a, signed).zip(signed_value(b, signed)).and_then(|(a, b)| f(a, b));
        from_signed(value, width)
    };
    let compare = |f: fn(i128, i128) -> bool| -> Const {
        let value = signed_value(a, signed).zip(signed_value(b, signed)).map(|(a, b)| State::from(f(a, b)));
        Const::from(value.unwrap_or(State::Undef)).extend(width, false)
    };
    let equal = || -> State {
        let size = a.len().max(b.len());
        let (a, b) = (a.extend(size, signed), b.extend(size, signed));
        let mut result = State::One;
        for (a, b) in a.iter().zip(b.iter()) {
            match (a.as_bool(), b.as_bool()) {
                (Some(a), Some(b)) if a != b => return State::Zero,
                (Some(_), Some(_)) => (),
                _ => result = State::Undef,
            }
        }
        result
    };
    let shift = |left: bool, arithmetic: bool| -> Const {
        let Some(amount) = b.as_uint() else { return Const::undef(width) };
        let size = a.len().max(width);
        let a = a.extend(size, signed);
        let fill = if arithmetic && signed && size > 0 { a[size - 1] } else { State::Zero };
        (0..width)
            .map(|index| {
                let source = if left { (index as u128).checked_sub(amount) } else { (index as u128).checked_add(amount) };
                match source {
                    Some(source) if source < size as u128 => a[source as usize],
                    _ if left => State::Zero,
                    _ => fill,
                }
            })
            .collect()
    };
    match cell.op {
        BinaryOp::And => bitwise(|a, b| a & b),
        BinaryOp::Or => bitwise(|a, b| a | b),
        BinaryOp::Xor => bitwise(|a, b| a ^ b),
        BinaryOp::Xnor => bitwise(|a, b| !(a ^ b)),
        BinaryOp::Add => arith(|a, b| Some(a.wrapping_add(b))),
        BinaryOp::Sub => arith(|a, b| Some(a.wrapping_sub(b))),
        BinaryOp::Mul => arith(|a, b| a.checked_mul(b)),
        BinaryOp::Div => arith(|a, b| a.checked_div(b)),
        BinaryOp::Mod => arith(|a, b| a.checked_rem(b)),
        BinaryOp::Shl => shift(true, false),
        BinaryOp::Shr => shift(false, false),
        BinaryOp::Sshr => shift(false, true),
        BinaryOp::Lt => compare(|a, b| a < b),
        BinaryOp::Le => compare(|a, b| a <= b),
        BinaryOp::Eq => Const::from(equal()).extend(width, false),
        BinaryOp::Ne => Const::from(!equal()).extend(width, false),
    }
}
