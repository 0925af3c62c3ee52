use std::collections::BTreeMap;

use crate::{Direction, PrimitiveKind, Role};

macro_rules! handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

handle!(NetlistId);
handle!(NetId);
handle!(InstanceId);
handle!(PortId);
handle!(PortBusId);
handle!(NetBusId);

/// Source location of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFile {
    pub file: String,
    pub line: u32,
}

impl std::fmt::Display for LineFile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetlistKind {
    Module,
    Primitive(PrimitiveKind),
}

/// A net used as the backing store of an inferred memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamInfo {
    /// Total number of bits.
    pub size: usize,
    /// Initial contents as a sized binary literal, e.g. `8'b0101xx10`, most significant word first.
    pub init: Option<String>,
    /// Whether the address range is declared in ascending order.
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    Port(PortId),
    Pin(InstanceId, PortId),
}

#[derive(Debug, Clone)]
pub struct Netlist {
    pub name: String,
    pub kind: NetlistKind,
    pub blackbox: bool,
    pub signed: bool,
    pub attributes: BTreeMap<String, String>,
    pub linefile: Option<LineFile>,
    /// All ports, including members of port buses, in order of declaration.
    pub ports: Vec<PortId>,
    pub port_buses: Vec<PortBusId>,
    pub nets: Vec<NetId>,
    pub net_buses: Vec<NetBusId>,
    pub instances: Vec<InstanceId>,
    /// Instances whose view is this netlist.
    pub references: Vec<InstanceId>,
}

#[derive(Debug, Clone)]
pub struct Net {
    pub name: String,
    pub owner: NetlistId,
    /// The bus this net is an element of, with its index in that bus.
    pub bus: Option<(NetBusId, i64)>,
    pub initial_value: Option<char>,
    pub ram: Option<RamInfo>,
    pub user_declared: bool,
    pub attributes: BTreeMap<String, String>,
    pub linefile: Option<LineFile>,
    pub terminals: Vec<Terminal>,
}

#[derive(Debug, Clone)]
pub struct Port {
    pub name: String,
    pub owner: NetlistId,
    pub direction: Direction,
    pub bus: Option<(PortBusId, i64)>,
    /// The net inside `owner` that this port is connected to.
    pub net: Option<NetId>,
}

/// A range of indices from `left` to `right`, in declaration order.
pub trait IndexRange {
    fn left(&self) -> i64;
    fn right(&self) -> i64;

    fn width(&self) -> usize {
        (self.left() - self.right()).unsigned_abs() as usize + 1
    }

    fn start_offset(&self) -> i64 {
        self.left().min(self.right())
    }

    fn index_at(&self, position: usize) -> i64 {
        if self.left() >= self.right() {
            self.left() - position as i64
        } else {
            self.left() + position as i64
        }
    }

    fn position_of(&self, index: i64) -> Option<usize> {
        let position = if self.left() >= self.right() { self.left() - index } else { index - self.left() };
        (0..self.width() as i64).contains(&position).then_some(position as usize)
    }
}

#[derive(Debug, Clone)]
pub struct PortBus {
    pub name: String,
    pub owner: NetlistId,
    pub direction: Direction,
    pub left: i64,
    pub right: i64,
    /// Member ports, from `left` to `right`.
    pub ports: Vec<PortId>,
}

impl IndexRange for PortBus {
    fn left(&self) -> i64 {
        self.left
    }

    fn right(&self) -> i64 {
        self.right
    }
}

#[derive(Debug, Clone)]
pub struct NetBus {
    pub name: String,
    pub owner: NetlistId,
    pub left: i64,
    pub right: i64,
    /// Element nets, from `left` to `right`.
    pub nets: Vec<Option<NetId>>,
    pub user_declared: bool,
    pub attributes: BTreeMap<String, String>,
    pub linefile: Option<LineFile>,
}

impl IndexRange for NetBus {
    fn left(&self) -> i64 {
        self.left
    }

    fn right(&self) -> i64 {
        self.right
    }
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    pub owner: NetlistId,
    pub view: NetlistId,
    pub connections: BTreeMap<PortId, NetId>,
    pub user_declared: bool,
    pub attributes: BTreeMap<String, String>,
    pub linefile: Option<LineFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct OperatorKey {
    kind: PrimitiveKind,
    signed: bool,
    widths: Vec<(Role, usize)>,
}

/// An elaborated design: netlists of nets, ports and instances, as produced by an elaborator.
///
/// Primitive and operator instances refer to shared view netlists whose ports are named after
/// the [`Role`] of each terminal; operator terminals are port buses indexed from `width - 1`
/// down to `0`.
#[derive(Debug, Clone, Default)]
pub struct Database {
    netlists: Vec<Netlist>,
    nets: Vec<Net>,
    ports: Vec<Port>,
    port_buses: Vec<PortBus>,
    net_buses: Vec<NetBus>,
    instances: Vec<Instance>,
    primitive_views: BTreeMap<PrimitiveKind, NetlistId>,
    operator_views: BTreeMap<OperatorKey, NetlistId>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn netlist(&self, id: NetlistId) -> &Netlist {
        &self.netlists[id.0]
    }

    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.0]
    }

    pub fn port(&self, id: PortId) -> &Port {
        &self.ports[id.0]
    }

    pub fn port_bus(&self, id: PortBusId) -> &PortBus {
        &self.port_buses[id.0]
    }

    pub fn net_bus(&self, id: NetBusId) -> &NetBus {
        &self.net_buses[id.0]
    }

    pub fn instance(&self, id: InstanceId) -> &Instance {
        &self.instances[id.0]
    }

    /// User modules, in order of creation.
    pub fn modules(&self) -> impl Iterator<Item = NetlistId> + '_ {
        (0..self.netlists.len())
            .map(NetlistId)
            .filter(|&id| self.netlist(id).kind == NetlistKind::Module)
    }

    pub fn find_module(&self, name: &str) -> Option<NetlistId> {
        self.modules().find(|&id| self.netlist(id).name == name)
    }

    pub fn find_port(&self, netlist: NetlistId, name: &str) -> Option<PortId> {
        self.netlist(netlist).ports.iter().copied().find(|&port| self.port(port).name == name)
    }

    pub fn find_port_bus(&self, netlist: NetlistId, name: &str) -> Option<PortBusId> {
        self.netlist(netlist).port_buses.iter().copied().find(|&bus| self.port_bus(bus).name == name)
    }

    pub fn find_net(&self, netlist: NetlistId, name: &str) -> Option<NetId> {
        self.netlist(netlist).nets.iter().copied().find(|&net| self.net(net).name == name)
    }

    pub fn find_net_bus(&self, netlist: NetlistId, name: &str) -> Option<NetBusId> {
        self.netlist(netlist).net_buses.iter().copied().find(|&bus| self.net_bus(bus).name == name)
    }

    /// The primitive or operator kind of an instance, or `None` for hierarchical instances.
    pub fn kind(&self, instance: InstanceId) -> Option<PrimitiveKind> {
        match self.netlist(self.instance(instance).view).kind {
            NetlistKind::Primitive(kind) => Some(kind),
            NetlistKind::Module => None,
        }
    }

    pub fn is_operator(&self, instance: InstanceId) -> bool {
        self.kind(instance).is_some_and(PrimitiveKind::is_operator)
    }

    pub fn is_signed(&self, instance: InstanceId) -> bool {
        self.netlist(self.instance(instance).view).signed
    }

    /// Nets connected to the terminal `role` of an instance, least significant bit first.
    /// Returns an empty vector if the view has no such terminal.
    pub fn pin_bits(&self, instance: InstanceId, role: Role) -> Vec<Option<NetId>> {
        let instance = self.instance(instance);
        if let Some(port) = self.find_port(instance.view, role.name()) {
            if self.port(port).bus.is_none() {
                return vec![instance.connections.get(&port).copied()];
            }
        }
        match self.find_port_bus(instance.view, role.name()) {
            Some(bus) => {
                let bus = self.port_bus(bus);
                let mut bits: Vec<_> = bus.ports.iter().map(|port| instance.connections.get(port).copied()).collect();
                if bus.left >= bus.right {
                    bits.reverse();
                }
                bits
            }
            None => vec![],
        }
    }

    /// Net connected to the single-bit terminal `role` of an instance.
    pub fn pin(&self, instance: InstanceId, role: Role) -> Option<NetId> {
        let bits = self.pin_bits(instance, role);
        match bits.as_slice() {
            [] => None,
            [bit] => *bit,
            _ => panic!("terminal {:?} of instance {:?} is not a single bit", role, self.instance(instance).name),
        }
    }

    pub fn pin_width(&self, instance: InstanceId, role: Role) -> usize {
        self.pin_bits(instance, role).len()
    }

    fn pin_drivers(&self, net: NetId) -> impl Iterator<Item = InstanceId> + '_ {
        self.net(net).terminals.iter().filter_map(|&terminal| match terminal {
            Terminal::Pin(instance, port) if self.port(port).direction.is_output() => Some(instance),
            _ => None,
        })
    }

    /// The instance driving a net, or `None` if the net is undriven or multiply driven.
    pub fn driver(&self, net: NetId) -> Option<InstanceId> {
        let mut drivers = self.pin_drivers(net);
        match (drivers.next(), drivers.next()) {
            (Some(driver), None) => Some(driver),
            _ => None,
        }
    }

    pub fn is_multiple_driven(&self, net: NetId) -> bool {
        self.pin_drivers(net).nth(1).is_some()
    }

    /// The driver of the net connected to terminal `role`, if there is exactly one.
    pub fn pin_driver(&self, instance: InstanceId, role: Role) -> Option<InstanceId> {
        self.pin(instance, role).and_then(|net| self.driver(net))
    }

    pub fn is_external_to(&self, net: NetId, netlist: NetlistId) -> bool {
        self.net(net).owner != netlist
    }

    /// The value of a net driven by a constant power or ground primitive.
    pub fn constant_value(&self, net: NetId) -> Option<bool> {
        match self.driver(net).and_then(|driver| self.kind(driver)) {
            Some(PrimitiveKind::Pwr) => Some(true),
            Some(PrimitiveKind::Gnd) => Some(false),
            _ => None,
        }
    }

    pub fn is_gnd(&self, net: NetId) -> bool {
        self.constant_value(net) == Some(false)
    }

    pub fn is_pwr(&self, net: NetId) -> bool {
        self.constant_value(net) == Some(true)
    }

    /// Hierarchical name of a netlist, if it is instantiated along a unique path.
    pub fn full_name(&self, netlist: NetlistId) -> Option<String> {
        let netlist = self.netlist(netlist);
        match netlist.references.as_slice() {
            [] => Some(netlist.name.clone()),
            [instance] => {
                let instance = self.instance(*instance);
                Some(format!("{}.{}", self.full_name(instance.owner)?, instance.name))
            }
            _ => None,
        }
    }

    pub fn add_module(&mut self, name: impl Into<String>) -> NetlistId {
        self.add_netlist(name.into(), NetlistKind::Module, false)
    }

    fn add_netlist(&mut self, name: String, kind: NetlistKind, signed: bool) -> NetlistId {
        let id = NetlistId(self.netlists.len());
        self.netlists.push(Netlist {
            name,
            kind,
            blackbox: kind != NetlistKind::Module,
            signed,
            attributes: BTreeMap::new(),
            linefile: None,
            ports: vec![],
            port_buses: vec![],
            nets: vec![],
            net_buses: vec![],
            instances: vec![],
            references: vec![],
        });
        id
    }

    pub fn set_blackbox(&mut self, netlist: NetlistId, blackbox: bool) {
        self.netlists[netlist.0].blackbox = blackbox;
    }

    pub fn set_netlist_attribute(&mut self, netlist: NetlistId, name: impl Into<String>, value: impl Into<String>) {
        self.netlists[netlist.0].attributes.insert(name.into(), value.into());
    }

    pub fn set_netlist_linefile(&mut self, netlist: NetlistId, linefile: LineFile) {
        self.netlists[netlist.0].linefile = Some(linefile);
    }

    /// Adds a scalar port.  The port is not connected to any net until [`Database::connect_port_net`]
    /// is called.
    pub fn add_port(&mut self, netlist: NetlistId, name: impl Into<String>, direction: Direction) -> PortId {
        let id = PortId(self.ports.len());
        self.ports.push(Port { name: name.into(), owner: netlist, direction, bus: None, net: None });
        self.netlists[netlist.0].ports.push(id);
        id
    }

    /// Adds a port bus, along with member ports named `name[index]`.
    pub fn add_port_bus(
        &mut self,
        netlist: NetlistId,
        name: impl Into<String>,
        direction: Direction,
        left: i64,
        right: i64,
    ) -> PortBusId {
        let name = name.into();
        let id = PortBusId(self.port_buses.len());
        let mut bus = PortBus { name: name.clone(), owner: netlist, direction, left, right, ports: vec![] };
        for position in 0..bus.width() {
            let index = bus.index_at(position);
            let port = self.add_port(netlist, format!("{name}[{index}]"), direction);
            self.ports[port.0].bus = Some((id, index));
            bus.ports.push(port);
        }
        self.port_buses.push(bus);
        self.netlists[netlist.0].port_buses.push(id);
        id
    }

    pub fn add_net(&mut self, netlist: NetlistId, name: impl Into<String>) -> NetId {
        let id = NetId(self.nets.len());
        self.nets.push(Net {
            name: name.into(),
            owner: netlist,
            bus: None,
            initial_value: None,
            ram: None,
            user_declared: false,
            attributes: BTreeMap::new(),
            linefile: None,
            terminals: vec![],
        });
        self.netlists[netlist.0].nets.push(id);
        id
    }

    /// Adds a net bus, along with element nets named `name[index]`.
    pub fn add_net_bus(&mut self, netlist: NetlistId, name: impl Into<String>, left: i64, right: i64) -> NetBusId {
        let name = name.into();
        let id = NetBusId(self.net_buses.len());
        let mut bus = NetBus {
            name: name.clone(),
            owner: netlist,
            left,
            right,
            nets: vec![],
            user_declared: false,
            attributes: BTreeMap::new(),
            linefile: None,
        };
        for position in 0..bus.width() {
            let index = bus.index_at(position);
            let net = self.add_net(netlist, format!("{name}[{index}]"));
            self.nets[net.0].bus = Some((id, index));
            bus.nets.push(Some(net));
        }
        self.net_buses.push(bus);
        self.netlists[netlist.0].net_buses.push(id);
        id
    }

    pub fn set_net_initial_value(&mut self, net: NetId, value: char) {
        self.nets[net.0].initial_value = Some(value);
    }

    pub fn set_net_ram(&mut self, net: NetId, ram: RamInfo) {
        self.nets[net.0].ram = Some(ram);
    }

    pub fn set_net_user_declared(&mut self, net: NetId, user_declared: bool) {
        self.nets[net.0].user_declared = user_declared;
    }

    pub fn set_net_attribute(&mut self, net: NetId, name: impl Into<String>, value: impl Into<String>) {
        self.nets[net.0].attributes.insert(name.into(), value.into());
    }

    pub fn set_net_linefile(&mut self, net: NetId, linefile: LineFile) {
        self.nets[net.0].linefile = Some(linefile);
    }

    pub fn set_net_bus_user_declared(&mut self, bus: NetBusId, user_declared: bool) {
        self.net_buses[bus.0].user_declared = user_declared;
    }

    pub fn set_net_bus_attribute(&mut self, bus: NetBusId, name: impl Into<String>, value: impl Into<String>) {
        self.net_buses[bus.0].attributes.insert(name.into(), value.into());
    }

    pub fn set_net_bus_linefile(&mut self, bus: NetBusId, linefile: LineFile) {
        self.net_buses[bus.0].linefile = Some(linefile);
    }

    /// Connects a port to the net that carries it inside its own netlist.
    pub fn connect_port_net(&mut self, port: PortId, net: NetId) {
        assert_eq!(self.port(port).owner, self.net(net).owner, "port and net belong to different netlists");
        if let Some(previous) = self.ports[port.0].net.replace(net) {
            self.nets[previous.0].terminals.retain(|&terminal| terminal != Terminal::Port(port));
        }
        self.nets[net.0].terminals.push(Terminal::Port(port));
    }

    fn primitive_view(&mut self, kind: PrimitiveKind) -> NetlistId {
        if let Some(&view) = self.primitive_views.get(&kind) {
            return view;
        }
        let view = self.add_netlist(kind.name().to_owned(), NetlistKind::Primitive(kind), false);
        for &role in kind.scalar_roles() {
            self.add_port(view, role.name(), role.direction());
        }
        self.primitive_views.insert(kind, view);
        view
    }

    fn operator_view(&mut self, kind: PrimitiveKind, signed: bool, widths: &[(Role, usize)]) -> NetlistId {
        let mut widths = widths.to_vec();
        widths.sort();
        let key = OperatorKey { kind, signed, widths };
        if let Some(&view) = self.operator_views.get(&key) {
            return view;
        }
        let mut name = kind.name().to_owned();
        for (role, width) in &key.widths {
            name += &format!("_{}{}", role.name(), width);
        }
        if signed {
            name += "_signed";
        }
        let view = self.add_netlist(name, NetlistKind::Primitive(kind), signed);
        for &(role, width) in &key.widths {
            self.add_port_bus(view, role.name(), role.direction(), width as i64 - 1, 0);
        }
        self.operator_views.insert(key, view);
        view
    }

    fn add_instance_of(&mut self, netlist: NetlistId, name: String, view: NetlistId) -> InstanceId {
        let id = InstanceId(self.instances.len());
        self.instances.push(Instance {
            name,
            owner: netlist,
            view,
            connections: BTreeMap::new(),
            user_declared: false,
            attributes: BTreeMap::new(),
            linefile: None,
        });
        self.netlists[netlist.0].instances.push(id);
        self.netlists[view.0].references.push(id);
        id
    }

    /// Adds an instance of another module.
    pub fn add_instance(&mut self, netlist: NetlistId, name: impl Into<String>, module: NetlistId) -> InstanceId {
        self.add_instance_of(netlist, name.into(), module)
    }

    /// Adds a primitive with single-bit terminals.
    pub fn add_primitive(&mut self, netlist: NetlistId, name: impl Into<String>, kind: PrimitiveKind) -> InstanceId {
        assert!(!kind.is_operator(), "{kind:?} is an operator");
        let view = self.primitive_view(kind);
        self.add_instance_of(netlist, name.into(), view)
    }

    /// Adds a word-level operator whose terminals have the given widths.
    pub fn add_operator(
        &mut self,
        netlist: NetlistId,
        name: impl Into<String>,
        kind: PrimitiveKind,
        signed: bool,
        widths: &[(Role, usize)],
    ) -> InstanceId {
        assert!(kind.is_operator(), "{kind:?} is not an operator");
        let view = self.operator_view(kind, signed, widths);
        self.add_instance_of(netlist, name.into(), view)
    }

    pub fn set_instance_user_declared(&mut self, instance: InstanceId, user_declared: bool) {
        self.instances[instance.0].user_declared = user_declared;
    }

    pub fn set_instance_attribute(&mut self, instance: InstanceId, name: impl Into<String>, value: impl Into<String>) {
        self.instances[instance.0].attributes.insert(name.into(), value.into());
    }

    pub fn set_instance_linefile(&mut self, instance: InstanceId, linefile: LineFile) {
        self.instances[instance.0].linefile = Some(linefile);
    }

    /// Connects port `port` of the view of `instance` to `net`, replacing any previous connection.
    pub fn connect(&mut self, instance: InstanceId, port: PortId, net: NetId) {
        assert_eq!(self.port(port).owner, self.instance(instance).view, "port does not belong to the instance view");
        self.disconnect(instance, port);
        self.instances[instance.0].connections.insert(port, net);
        self.nets[net.0].terminals.push(Terminal::Pin(instance, port));
    }

    pub fn disconnect(&mut self, instance: InstanceId, port: PortId) -> Option<NetId> {
        let net = self.instances[instance.0].connections.remove(&port)?;
        self.nets[net.0].terminals.retain(|&terminal| terminal != Terminal::Pin(instance, port));
        Some(net)
    }

    /// Connects the single-bit terminal `role` of a primitive.
    pub fn connect_pin(&mut self, instance: InstanceId, role: Role, net: NetId) {
        self.connect_pin_bits(instance, role, &[Some(net)]);
    }

    /// Connects the terminal `role` of a primitive or operator, least significant bit first.
    pub fn connect_pin_bits(&mut self, instance: InstanceId, role: Role, nets: &[Option<NetId>]) {
        let view = self.instance(instance).view;
        let ports: Vec<PortId> = match self.find_port_bus(view, role.name()) {
            Some(bus) => self.port_bus(bus).ports.iter().rev().copied().collect(),
            None => self.find_port(view, role.name()).into_iter().collect(),
        };
        assert_eq!(ports.len(), nets.len(), "width mismatch connecting terminal {role:?}");
        for (port, net) in ports.into_iter().zip(nets) {
            match net {
                Some(net) => self.connect(instance, port, *net),
                None => {
                    self.disconnect(instance, port);
                }
            }
        }
    }

    /// Adds a binary temporal operator with a fresh output net, and a delay range of exactly
    /// one cycle where the operator has one.
    pub fn add_temporal_binary(
        &mut self,
        netlist: NetlistId,
        kind: PrimitiveKind,
        input1: NetId,
        input2: NetId,
    ) -> (InstanceId, NetId) {
        let index = self.instances.len();
        let instance = self.add_primitive(netlist, format!("{}${index}", kind.name()), kind);
        let output = self.add_net(netlist, format!("{}${index}$o", kind.name()));
        self.connect_pin(instance, Role::Input1, input1);
        self.connect_pin(instance, Role::Input2, input2);
        self.connect_pin(instance, Role::Output, output);
        if kind == PrimitiveKind::SvaSeqConcat {
            self.set_instance_attribute(instance, "sva:low", "1");
            self.set_instance_attribute(instance, "sva:high", "1");
        }
        (instance, output)
    }
}

#[cfg(test)]
mod test {
    use super::{Database, IndexRange};
    use crate::{Direction, PrimitiveKind, Role};

    #[test]
    fn test_driver() {
        let mut db = Database::new();
        let top = db.add_module("top");
        let a = db.add_net(top, "a");
        let y = db.add_net(top, "y");
        assert_eq!(db.driver(y), None);
        let inv = db.add_primitive(top, "inv", PrimitiveKind::Inv);
        db.connect_pin(inv, Role::Input, a);
        db.connect_pin(inv, Role::Output, y);
        assert_eq!(db.driver(y), Some(inv));
        assert_eq!(db.driver(a), None);
        let buf = db.add_primitive(top, "buf", PrimitiveKind::Buf);
        db.connect_pin(buf, Role::Output, y);
        assert_eq!(db.driver(y), None);
        assert!(db.is_multiple_driven(y));
    }

    #[test]
    fn test_operator_pins() {
        let mut db = Database::new();
        let top = db.add_module("top");
        let bus = db.add_net_bus(top, "a", 0, 2);
        let nets: Vec<_> = db.net_bus(bus).nets.clone();
        let add1 = db.add_operator(top, "add1", PrimitiveKind::Adder, false, &[(Role::Input1, 3), (Role::Output, 3)]);
        let add2 = db.add_operator(top, "add2", PrimitiveKind::Adder, false, &[(Role::Output, 3), (Role::Input1, 3)]);
        assert_eq!(db.instance(add1).view, db.instance(add2).view);
        db.connect_pin_bits(add1, Role::Input1, &[nets[2], None, nets[0]]);
        assert_eq!(db.pin_bits(add1, Role::Input1), vec![nets[2], None, nets[0]]);
        assert_eq!(db.pin_width(add1, Role::Output), 3);
        assert_eq!(db.pin_width(add1, Role::Cin), 0);
        assert_eq!(db.net(nets[0].unwrap()).bus, Some((bus, 0)));
        assert_eq!(db.net_bus(bus).start_offset(), 0);
        assert_eq!(db.net_bus(bus).position_of(2), Some(2));
    }

    #[test]
    fn test_full_name() {
        let mut db = Database::new();
        let top = db.add_module("top");
        let sub = db.add_module("sub");
        let leaf = db.add_module("leaf");
        db.add_instance(top, "u_sub", sub);
        db.add_instance(sub, "u_leaf1", leaf);
        assert_eq!(db.full_name(leaf).as_deref(), Some("top.u_sub.u_leaf1"));
        db.add_instance(sub, "u_leaf2", leaf);
        assert_eq!(db.full_name(leaf), None);
        let port = db.add_port(leaf, "p", Direction::Output);
        assert_eq!(db.find_port(leaf, "p"), Some(port));
    }
}
