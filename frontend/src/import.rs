use std::collections::{BTreeMap, BTreeSet, HashMap};

use rtlbridge_elab::{
    Database, IndexRange, InstanceId, LineFile, NetId, NetlistId, NetlistKind, PrimitiveKind, RamInfo, Role, Terminal,
};
use rtlbridge_netlist::{
    AnyKind, AnyValue, BinaryCell, BinaryOp, CellRepr, Check, CheckKind, Const, ControlBit, FlipFlop, Gate, Instance,
    MemInit, MemRead, MemWrite, Memory, Module, ParamValue, SigBit, SigSpec, State, UnaryCell, UnaryOp,
};

use crate::{bridge::NetMap, coalesce, Error, ImportConfig, Lowering, Warning};

/// Name of the module that a netlist is imported as.
pub fn module_name(db: &Database, netlist: NetlistId) -> String {
    let netlist = db.netlist(netlist);
    match netlist.kind {
        NetlistKind::Primitive(kind) if kind.is_operator() => format!("$operator${}", netlist.name),
        _ => netlist.name.clone(),
    }
}

fn import_attributes(
    target: &mut BTreeMap<String, ParamValue>,
    linefile: &Option<LineFile>,
    attributes: &BTreeMap<String, String>,
) {
    if let Some(linefile) = linefile {
        target.insert("src".into(), ParamValue::from(linefile.to_string()));
    }
    for (name, value) in attributes {
        target.insert(name.clone(), ParamValue::from(value.as_str()));
    }
}

fn state_of(value: char) -> State {
    match value {
        '0' => State::Zero,
        '1' => State::One,
        _ => State::Undef,
    }
}

pub(crate) struct ImportedNetlist {
    pub module: Module,
    pub children: BTreeSet<NetlistId>,
    pub warnings: Vec<Warning>,
}

/// Translates one source netlist into one module.
pub(crate) struct NetlistImporter<'a> {
    pub(crate) db: &'a Database,
    pub(crate) config: &'a ImportConfig,
    pub(crate) netlist: NetlistId,
    pub(crate) module: Module,
    pub(crate) nets: NetMap,
    memories: HashMap<NetId, String>,
    init_nets: BTreeMap<NetId, char>,
    anyconst_nets: BTreeSet<NetId>,
    anyseq_nets: BTreeSet<NetId>,
    properties: Vec<(InstanceId, CheckKind)>,
    pub(crate) past_registers: Vec<String>,
    warnings: Vec<Warning>,
    children: BTreeSet<NetlistId>,
}

impl<'a> NetlistImporter<'a> {
    pub(crate) fn new(db: &'a Database, netlist: NetlistId, config: &'a ImportConfig) -> Self {
        NetlistImporter {
            db,
            config,
            netlist,
            module: Module::new(module_name(db, netlist)),
            nets: NetMap::new(netlist),
            memories: HashMap::new(),
            init_nets: BTreeMap::new(),
            anyconst_nets: BTreeSet::new(),
            anyseq_nets: BTreeSet::new(),
            properties: vec![],
            past_registers: vec![],
            warnings: vec![],
            children: BTreeSet::new(),
        }
    }

    pub(crate) fn warn(&mut self, message: String) {
        let netlist = self.db.netlist(self.netlist).name.clone();
        log::warn!("{netlist}: {message}");
        self.warnings.push(Warning { netlist, message });
    }

    pub(crate) fn unsupported(&self, instance: InstanceId, reason: impl Into<String>) -> Error {
        Error::Unsupported {
            netlist: self.db.netlist(self.netlist).name.clone(),
            instance: self.db.instance(instance).name.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn name_for(&mut self, name: &str, user_declared: bool) -> String {
        if self.config.names || user_declared {
            self.module.uniquify(name)
        } else {
            self.module.new_id()
        }
    }

    /// Single-bit input terminal; unconnected inputs read as `Z`.
    pub(crate) fn input(&self, instance: InstanceId, role: Role) -> Result<SigBit, Error> {
        match self.db.pin(instance, role) {
            Some(net) => self.nets.at(self.db, net),
            None => Ok(SigBit::HIZ),
        }
    }

    /// Multi-bit input terminal, least significant bit first.
    pub(crate) fn input_bits(&self, instance: InstanceId, role: Role) -> Result<SigSpec, Error> {
        self.db
            .pin_bits(instance, role)
            .into_iter()
            .map(|net| match net {
                Some(net) => self.nets.at(self.db, net),
                None => Ok(SigBit::HIZ),
            })
            .collect()
    }

    /// Like [`NetlistImporter::input_bits`], with nets tied to power or ground read as constants.
    pub(crate) fn inport_bits(&self, instance: InstanceId, role: Role) -> Result<SigSpec, Error> {
        self.db
            .pin_bits(instance, role)
            .into_iter()
            .map(|net| match net {
                Some(net) => match self.db.constant_value(net) {
                    Some(value) => Ok(SigBit::from(value)),
                    None => self.nets.at(self.db, net),
                },
                None => Ok(SigBit::HIZ),
            })
            .collect()
    }

    /// Single-bit output terminal; an unconnected output drives a fresh wire.
    pub(crate) fn output(&mut self, instance: InstanceId, role: Role) -> Result<SigBit, Error> {
        match self.db.pin(instance, role) {
            Some(net) => self.nets.at(self.db, net),
            None => Ok(self.module.add_auto_wire(1).unwrap_bit()),
        }
    }

    /// Multi-bit output terminal; each run of unconnected bits drives a fresh wire.
    pub(crate) fn output_bits(&mut self, instance: InstanceId, role: Role) -> Result<SigSpec, Error> {
        let nets = self.db.pin_bits(instance, role);
        let mut result = SigSpec::new();
        let mut index = 0;
        while index < nets.len() {
            match nets[index] {
                Some(net) => {
                    result.push(self.nets.at(self.db, net)?);
                    index += 1;
                }
                None => {
                    let run = nets[index..].iter().take_while(|net| net.is_none()).count();
                    result.append(&self.module.add_auto_wire(run));
                    index += run;
                }
            }
        }
        Ok(result)
    }

    /// Whether a terminal is tied to ground.  Unconnected terminals count as ground.
    pub(crate) fn is_gnd(&self, instance: InstanceId, role: Role) -> bool {
        self.db.pin(instance, role).map_or(true, |net| self.db.is_gnd(net))
    }

    pub(crate) fn add_gate(&mut self, name: String, gate: Gate) {
        self.module.add_cell(name, CellRepr::Gate(gate));
    }

    pub(crate) fn add_unary(&mut self, name: String, op: UnaryOp, signed: bool, a: SigSpec, y: SigSpec) {
        self.module.add_cell(name, CellRepr::Unary(UnaryCell { op, signed, a, y }));
    }

    pub(crate) fn add_binary(&mut self, name: String, op: BinaryOp, signed: bool, a: SigSpec, b: SigSpec, y: SigSpec) {
        self.module.add_cell(name, CellRepr::Binary(BinaryCell { op, signed, a, b, y }));
    }

    fn bind_port_bit(&mut self, net: NetId, bit: SigBit, input: bool) {
        match self.nets.get(net) {
            None => self.nets.insert(net, bit),
            Some(mapped) if input => self.module.connect(mapped, bit),
            Some(mapped) => self.module.connect(bit, mapped),
        }
    }

    fn handle_ports(&mut self) {
        let db = self.db;
        let netlist = db.netlist(self.netlist);
        for (index, &port_id) in netlist.ports.iter().enumerate() {
            let port = db.port(port_id);
            if port.bus.is_some() {
                continue;
            }
            let wire = self.module.add_wire(port.name.clone(), 1);
            let wire_data = self.module.wire_mut(wire);
            wire_data.port_id = index + 1;
            wire_data.port_input = port.direction.is_input();
            wire_data.port_output = port.direction.is_output();
            if let Some(net) = port.net {
                self.bind_port_bit(net, SigBit::Wire(wire, 0), port.direction.is_input());
            }
        }
        for &bus_id in &netlist.port_buses {
            let bus = db.port_bus(bus_id);
            let wire = self.module.add_wire(bus.name.clone(), bus.width());
            let wire_data = self.module.wire_mut(wire);
            wire_data.start_offset = bus.start_offset();
            wire_data.port_input = bus.direction.is_input();
            wire_data.port_output = bus.direction.is_output();
            for (position, &port_id) in bus.ports.iter().enumerate() {
                if let Some(net) = db.port(port_id).net {
                    let offset = (bus.index_at(position) - bus.start_offset()) as usize;
                    self.bind_port_bit(net, SigBit::Wire(wire, offset), bus.direction.is_input());
                }
            }
        }
        self.module.fixup_ports();
    }

    fn handle_ram_net(&mut self, net_id: NetId, ram: &RamInfo) -> Result<(), Error> {
        let db = self.db;
        let net = db.net(net_id);
        let mut width = ram.size;
        for &terminal in &net.terminals {
            let Terminal::Pin(instance, _) = terminal else { continue };
            match db.kind(instance) {
                Some(PrimitiveKind::ReadPort) => width = width.min(db.pin_width(instance, Role::Output)),
                Some(PrimitiveKind::WritePort | PrimitiveKind::ClockedWritePort) => {
                    width = width.min(db.pin_width(instance, Role::Input2))
                }
                _ => {
                    return Err(Error::UnsupportedRamConnection {
                        netlist: db.netlist(self.netlist).name.clone(),
                        memory: net.name.clone(),
                        instance: db.instance(instance).name.clone(),
                    })
                }
            }
        }
        let size = if width == 0 { 0 } else { ram.size / width };
        let name = self.module.uniquify(net.name.as_str());
        if self.config.verbose {
            log::info!("importing memory {} as {} ({} words of {} bits)", net.name, name, size, width);
        }
        self.module.add_memory(name.clone(), Memory { width, size });
        self.memories.insert(net_id, name.clone());
        if let Some(init) = &ram.init {
            self.handle_ram_init(&name, width, size, init, ram.ascending);
        }
        Ok(())
    }

    /// Decodes a sized binary literal into one initializer per word that has any defined bit.
    fn handle_ram_init(&mut self, memory: &str, width: usize, size: usize, init: &str, ascending: bool) {
        let mut chars = init.chars().skip_while(|&chr| chr != '\'').skip(1).peekable();
        if chars.peek().is_some() && chars.next() != Some('b') {
            self.warn(format!("initial value of memory {memory:?} is not a binary literal, ignoring"));
            return;
        }
        for word in 0..size {
            let mut value = Const::undef(width);
            let mut valid = false;
            for bit in (0..width).rev() {
                let Some(chr) = chars.next() else { break };
                if matches!(chr, '0' | '1') {
                    value[bit] = state_of(chr);
                    valid = true;
                }
            }
            if valid {
                let address = if ascending { word } else { size - word - 1 };
                let priority = self.module.next_priority();
                let name = self.module.new_id();
                self.module.add_cell(
                    name,
                    CellRepr::MemInit(MemInit { memory: memory.to_owned(), address, data: value, priority }),
                );
            }
        }
    }

    fn handle_nets(&mut self) -> Result<(), Error> {
        let db = self.db;
        for &net_id in &db.netlist(self.netlist).nets {
            let net = db.net(net_id);
            if let Some(ram) = &net.ram {
                self.handle_ram_net(net_id, ram)?;
                continue;
            }
            if let Some(value) = net.initial_value {
                self.init_nets.insert(net_id, value);
            }
            if net.attributes.get(" rand_const").is_some_and(|value| value == "1") {
                self.anyconst_nets.insert(net_id);
            } else if net.attributes.get(" rand").is_some_and(|value| value == "1") {
                self.anyseq_nets.insert(net_id);
            }
            if self.nets.contains(net_id) || net.bus.is_some() {
                continue;
            }
            let name = self.name_for(&net.name, net.user_declared);
            let wire = self.module.add_wire(name, 1);
            import_attributes(&mut self.module.wire_mut(wire).attributes, &net.linefile, &net.attributes);
            self.nets.insert(net_id, SigBit::Wire(wire, 0));
        }
        Ok(())
    }

    fn handle_net_buses(&mut self) -> Result<(), Error> {
        let db = self.db;
        for &bus_id in &db.netlist(self.netlist).net_buses {
            let bus = db.net_bus(bus_id);
            if bus.nets.iter().flatten().any(|&net| !self.nets.contains(net)) {
                let name = self.name_for(&bus.name, bus.user_declared);
                let wire = self.module.add_wire(name, bus.width());
                let start_offset = bus.start_offset();
                let wire_data = self.module.wire_mut(wire);
                wire_data.start_offset = start_offset;
                import_attributes(&mut wire_data.attributes, &bus.linefile, &bus.attributes);
                let mut init = Const::undef(bus.width());
                let mut init_valid = false;
                for (position, net) in bus.nets.iter().enumerate() {
                    let Some(net) = *net else { continue };
                    let offset = (bus.index_at(position) - start_offset) as usize;
                    if let Some(value) = self.init_nets.remove(&net) {
                        init[offset] = state_of(value);
                        init_valid = true;
                    }
                    match self.nets.get(net) {
                        None => self.nets.insert(net, SigBit::Wire(wire, offset)),
                        Some(mapped) => self.module.connect(SigBit::Wire(wire, offset), mapped),
                    }
                }
                if init_valid {
                    self.module.wire_mut(wire).attributes.insert("init".into(), ParamValue::from(init));
                }
            }
            let mut anyconst = SigSpec::new();
            let mut anyseq = SigSpec::new();
            for &net in bus.nets.iter().rev().flatten() {
                if self.anyconst_nets.remove(&net) {
                    anyconst.push(self.nets.at(db, net)?);
                }
                if self.anyseq_nets.remove(&net) {
                    anyseq.push(self.nets.at(db, net)?);
                }
            }
            self.add_any_value(AnyKind::Const, anyconst);
            self.add_any_value(AnyKind::Seq, anyseq);
        }
        Ok(())
    }

    fn add_any_value(&mut self, kind: AnyKind, sig: SigSpec) {
        if sig.is_empty() {
            return;
        }
        let output = self.module.add_auto_wire(sig.len());
        let name = self.module.new_id();
        self.module.add_cell(name, CellRepr::AnyValue(AnyValue { kind, output: output.clone() }));
        self.module.connect(sig, output);
    }

    fn handle_leftover_nets(&mut self) -> Result<(), Error> {
        for (net, value) in std::mem::take(&mut self.init_nets) {
            let SigBit::Wire(wire, offset) = self.nets.at(self.db, net)? else { continue };
            let width = self.module.wire(wire).width;
            let attributes = &mut self.module.wire_mut(wire).attributes;
            let mut init = attributes.get("init").and_then(ParamValue::as_const).cloned().unwrap_or_default();
            while init.len() < width {
                init.push(State::Undef);
            }
            init[offset] = state_of(value);
            attributes.insert("init".into(), ParamValue::from(init));
        }
        for net in std::mem::take(&mut self.anyconst_nets) {
            let bit = self.nets.at(self.db, net)?;
            self.add_any_value(AnyKind::Const, SigSpec::from(bit));
        }
        for net in std::mem::take(&mut self.anyseq_nets) {
            let bit = self.nets.at(self.db, net)?;
            self.add_any_value(AnyKind::Seq, SigSpec::from(bit));
        }
        Ok(())
    }

    fn memory_of(&self, instance: InstanceId, role: Role) -> Result<(String, usize), Error> {
        let memory = self.db.pin(instance, role).and_then(|net| self.memories.get(&net));
        match memory.and_then(|name| Some((name.clone(), self.module.memory(name)?.width))) {
            Some(memory) => Ok(memory),
            None => Err(self.unsupported(instance, "memory port is not connected to a memory net")),
        }
    }

    fn asymmetric_memory(&self, instance: InstanceId, memory: String) -> Error {
        Error::AsymmetricMemory {
            netlist: self.db.netlist(self.netlist).name.clone(),
            memory,
            instance: self.db.instance(instance).name.clone(),
        }
    }

    /// Imports primitives that map directly onto cells or connections.  Returns `false` if the
    /// instance needs to be handled as a temporal operator or a hierarchical cell.
    fn handle_primitive(&mut self, instance: InstanceId, kind: PrimitiveKind, name: &str) -> Result<bool, Error> {
        let db = self.db;
        let check_kind = match kind {
            PrimitiveKind::SvaImmediateAssert => Some(CheckKind::Assert),
            PrimitiveKind::SvaImmediateAssume => Some(CheckKind::Assume),
            PrimitiveKind::SvaImmediateCover => Some(CheckKind::Cover),
            _ => None,
        };
        if let Some(check_kind) = check_kind {
            let condition = self.input(instance, Role::Input)?;
            self.module.add_cell(
                name,
                CellRepr::Check(Check { kind: check_kind, condition, enable: SigBit::ONE }),
            );
            return Ok(true);
        }

        let constant = match kind {
            PrimitiveKind::Pwr => Some(State::One),
            PrimitiveKind::Gnd => Some(State::Zero),
            PrimitiveKind::X => Some(State::Undef),
            PrimitiveKind::Z => Some(State::HiZ),
            _ => None,
        };
        if let Some(state) = constant {
            if let Some(net) = db.pin(instance, Role::Output) {
                let bit = self.nets.at(db, net)?;
                self.module.connect(bit, SigBit::Const(state));
            }
            return Ok(true);
        }

        match kind {
            PrimitiveKind::Buf => {
                let a = self.input(instance, Role::Input)?;
                let y = self.output(instance, Role::Output)?;
                self.add_gate(name.to_owned(), Gate::Buf { a, y });
                return Ok(true);
            }
            PrimitiveKind::ReadPort => {
                let (memory, width) = self.memory_of(instance, Role::Input)?;
                if db.pin_width(instance, Role::Output) != width {
                    return Err(self.asymmetric_memory(instance, memory));
                }
                let address = self.input_bits(instance, Role::Input1)?;
                let data = self.output_bits(instance, Role::Output)?;
                self.module.add_cell(name, CellRepr::MemRead(MemRead { memory, address, data }));
                return Ok(true);
            }
            PrimitiveKind::WritePort | PrimitiveKind::ClockedWritePort => {
                let (memory, width) = self.memory_of(instance, Role::Output)?;
                if db.pin_width(instance, Role::Input2) != width {
                    return Err(self.asymmetric_memory(instance, memory));
                }
                let clock = match kind {
                    PrimitiveKind::ClockedWritePort => Some(ControlBit::Pos(self.input(instance, Role::Clock)?)),
                    _ => None,
                };
                let enable = SigSpec::from(self.input(instance, Role::Control)?).repeat(width);
                let address = self.input_bits(instance, Role::Input1)?;
                let data = self.input_bits(instance, Role::Input2)?;
                let priority = self.module.next_priority();
                self.module.add_cell(
                    name,
                    CellRepr::MemWrite(MemWrite { memory, clock, enable, address, data, priority }),
                );
                return Ok(true);
            }
            _ => (),
        }

        match self.config.lowering {
            Lowering::Cells => {
                if self.lower_cell(instance, kind, name)? {
                    return Ok(true);
                }
                if kind.is_operator() && !kind.is_temporal() {
                    self.warn(format!(
                        "unsupported operator {} ({}), kept as a black box cell",
                        db.instance(instance).name,
                        db.netlist(db.instance(instance).view).name
                    ));
                }
            }
            Lowering::Gates => {
                if self.lower_gate(instance, kind, name)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn handle_sva_past(&mut self, instance: InstanceId) -> Result<(), Error> {
        let db = self.db;
        let clock_node = db
            .pin_driver(instance, Role::Input2)
            .unwrap_or_else(|| panic!("past-value sampler {:?} has no clocking node", db.instance(instance).name));
        let clock = self.resolve_clock(clock_node)?;
        let data = self.input(instance, Role::Input1)?;
        let output = self.output(instance, Role::Output)?;
        let name = self.module.new_id();
        self.module.add_cell(name.clone(), CellRepr::Dff(FlipFlop::new(data, output, clock)));
        self.past_registers.push(name);
        Ok(())
    }

    /// Returns `false` if the sampler has a constant clock and was not imported.
    fn handle_psl_prev(&mut self, instance: InstanceId) -> Result<bool, Error> {
        let db = self.db;
        let Some(clock_net) = db.pin(instance, Role::Clock).filter(|&net| db.constant_value(net).is_none()) else {
            return Ok(false);
        };
        let clock_node = db
            .driver(clock_net)
            .unwrap_or_else(|| panic!("past-value sampler {:?} has no clocking node", db.instance(instance).name));
        let clock = self.resolve_clock(clock_node)?;
        let data = self.input_bits(instance, Role::Input1)?;
        let output = self.output_bits(instance, Role::Output)?;
        let single_bit = data.len() == 1;
        let name = self.module.new_id();
        self.module.add_cell(name.clone(), CellRepr::Dff(FlipFlop::new(data, output, clock)));
        if single_bit {
            self.past_registers.push(name);
        }
        Ok(true)
    }

    fn handle_hierarchical(&mut self, instance: InstanceId, name: &str) -> Result<(), Error> {
        let db = self.db;
        let inst = db.instance(instance);
        self.children.insert(inst.view);
        let mut cell = Instance::new(module_name(db, inst.view));
        let mut port_bits: BTreeMap<String, Vec<SigBit>> = BTreeMap::new();
        if self.config.verbose {
            log::info!("  ports in source db:");
        }
        for (&port_id, &net) in &inst.connections {
            let port = db.port(port_id);
            if self.config.verbose {
                log::info!("    .{}({})", port.name, db.net(net).name);
            }
            let (port_name, offset) = match port.bus {
                Some((bus, index)) => {
                    let bus = db.port_bus(bus);
                    (bus.name.clone(), (index - bus.start_offset()) as usize)
                }
                None => (port.name.clone(), 0),
            };
            let bits = port_bits.entry(port_name).or_default();
            if bits.len() <= offset {
                let padding = self.module.add_auto_wire(offset + 1 - bits.len());
                bits.extend(padding.iter());
            }
            bits[offset] = self.nets.at(db, net)?;
        }
        if self.config.verbose {
            log::info!("  ports in target db:");
        }
        for (port_name, bits) in port_bits {
            let sig = SigSpec::from(bits);
            if self.config.verbose {
                log::info!("    .{}({})", port_name, self.module.display_sig(&sig));
            }
            cell.connect(port_name, sig);
        }
        let keep = self.config.keep_going && db.kind(instance).is_some_and(|kind| !kind.is_operator());
        let cell = self.module.add_cell(name, CellRepr::Instance(cell));
        if keep {
            cell.attributes.insert("keep".into(), ParamValue::from(true));
        }
        Ok(())
    }

    fn handle_instance(&mut self, instance: InstanceId) -> Result<(), Error> {
        let db = self.db;
        let inst = db.instance(instance);
        let name = self.name_for(&inst.name, inst.user_declared);
        if self.config.verbose {
            log::info!("importing cell {} ({}) as {}", inst.name, db.netlist(inst.view).name, name);
        }

        if let Some(kind) = db.kind(instance) {
            if self.handle_primitive(instance, kind, &name)? {
                self.import_cell_attributes(instance, &name);
                return Ok(());
            }

            let check_kind = match kind {
                PrimitiveKind::SvaAssert | PrimitiveKind::PslAssert => Some(CheckKind::Assert),
                PrimitiveKind::SvaAssume | PrimitiveKind::PslAssume => Some(CheckKind::Assume),
                PrimitiveKind::SvaCover | PrimitiveKind::PslCover => Some(CheckKind::Cover),
                _ => None,
            };
            if let Some(check_kind) = check_kind {
                self.properties.push((instance, check_kind));
            }

            if self.config.sva_enabled() {
                if kind == PrimitiveKind::SvaPast {
                    self.handle_sva_past(instance)?;
                    if !self.config.keep_going {
                        return Ok(());
                    }
                }
                if kind == PrimitiveKind::PslPrev && self.handle_psl_prev(instance)? && !self.config.keep_going {
                    return Ok(());
                }
            }

            if !self.config.keep_going && kind.is_temporal() {
                return Ok(());
            }
            if kind == PrimitiveKind::HdlAssertion {
                return Ok(());
            }
            if !kind.is_operator() {
                if !self.config.keep_going {
                    return Err(self.unsupported(instance, format!("primitive kind {} is not supported", kind.name())));
                }
                if !kind.is_temporal() {
                    self.warn(format!(
                        "unsupported primitive {} of kind {}, kept as a black box cell",
                        inst.name,
                        kind.name()
                    ));
                }
            }
        }

        self.handle_hierarchical(instance, &name)?;
        self.import_cell_attributes(instance, &name);
        Ok(())
    }

    fn import_cell_attributes(&mut self, instance: InstanceId, name: &str) {
        let inst = self.db.instance(instance);
        if let Some(cell) = self.module.cell_mut(name) {
            import_attributes(&mut cell.attributes, &inst.linefile, &inst.attributes);
        }
    }

    fn handle_properties(&mut self) -> Result<(), Error> {
        for (root, kind) in std::mem::take(&mut self.properties) {
            self.import_property(root, kind)?;
        }
        let removed = coalesce::merge_past_registers(&mut self.module, &self.past_registers, self.config.verbose);
        if removed > 0 && self.config.verbose {
            log::info!("merged {removed} past-value registers");
        }
        Ok(())
    }

    pub(crate) fn run(mut self) -> Result<ImportedNetlist, Error> {
        let db = self.db;
        let netlist = db.netlist(self.netlist);
        if netlist.blackbox || matches!(netlist.kind, NetlistKind::Primitive(_)) {
            log::info!("importing blackbox module {}", self.module.name());
            self.module.set_bool_attribute("blackbox");
        } else {
            log::info!("importing module {}", self.module.name());
        }
        import_attributes(&mut self.module.attributes, &netlist.linefile, &netlist.attributes);
        self.handle_ports();
        self.handle_nets()?;
        self.handle_net_buses()?;
        self.handle_leftover_nets()?;
        for &instance in &netlist.instances {
            self.handle_instance(instance)?;
        }
        if self.config.sva_enabled() {
            self.handle_properties()?;
        }
        Ok(ImportedNetlist { module: self.module, children: self.children, warnings: self.warnings })
    }
}
